use std::fmt;

/// Decoded multi-channel audio, immutable once constructed.
///
/// Channels hold per-sample amplitudes in [-1, 1]; every channel has the same
/// frame count and the sample rate is positive, enforced by [`AudioAsset::new`].
#[derive(Debug, Clone)]
pub struct AudioAsset {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    NoChannels,
    NoFrames,
    ChannelLengthMismatch { expected: usize, got: usize },
    BadSampleRate(u32),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChannels => write!(f, "asset has no channels"),
            Self::NoFrames => write!(f, "asset has no sample frames"),
            Self::ChannelLengthMismatch { expected, got } => {
                write!(f, "channel length mismatch: expected {expected}, got {got}")
            }
            Self::BadSampleRate(sr) => write!(f, "sample rate must be positive, got {sr}"),
        }
    }
}

impl std::error::Error for AssetError {}

impl AudioAsset {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, AssetError> {
        let first = channels.first().ok_or(AssetError::NoChannels)?;
        if first.is_empty() {
            return Err(AssetError::NoFrames);
        }
        let expected = first.len();
        for ch in &channels {
            if ch.len() != expected {
                return Err(AssetError::ChannelLengthMismatch {
                    expected,
                    got: ch.len(),
                });
            }
        }
        if sample_rate == 0 {
            return Err(AssetError::BadSampleRate(sample_rate));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Build a mono asset from a single sample sequence.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AssetError> {
        Self::new(vec![samples], sample_rate)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Mean amplitude across channels at one frame.
    pub fn mean_amplitude(&self, frame: usize) -> f32 {
        let mut acc = 0.0f32;
        for ch in &self.channels {
            acc += ch[frame];
        }
        acc / self.channels.len() as f32
    }

    /// Mono mixdown of `out.len()` frames starting at `start`, zero-padded
    /// past the asset end. Used by the spectral analysis pass.
    pub fn mix_block(&self, start: usize, out: &mut [f32]) {
        let frames = self.frame_count();
        for (i, slot) in out.iter_mut().enumerate() {
            let frame = start + i;
            *slot = if frame < frames {
                self.mean_amplitude(frame)
            } else {
                0.0
            };
        }
    }

    /// Interleaved frame read for the playback sink: one sample per output
    /// channel, mapping extra output channels to the last asset channel.
    pub fn frame_sample(&self, frame: usize, channel: usize) -> f32 {
        let ch = channel.min(self.channels.len() - 1);
        self.channels[ch][frame]
    }
}

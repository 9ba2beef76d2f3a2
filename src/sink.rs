use crate::asset::AudioAsset;
use crate::clock::HardwareClock;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Cursor fixed-point scale (32.32): lets the audio callback step through
/// source frames at a fractional rate without locks or floats.
const FP_ONE: u64 = 1 << 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// No audio-capable output device; fatal at construction.
    NoOutputDevice,
    Stream(String),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOutputDevice => write!(f, "no audio output device available"),
            Self::Stream(msg) => write!(f, "audio stream error: {msg}"),
        }
    }
}

impl std::error::Error for SinkError {}

/// Hardware playback: accepts `(asset, start offset)` and exposes the
/// monotonic hardware clock.
pub trait AudioSink: HardwareClock {
    fn start(&mut self, asset: Arc<AudioAsset>, offset_seconds: f64) -> Result<(), SinkError>;
    fn stop(&mut self);
}

struct SinkShared {
    /// Total output frames rendered since construction, silent or not.
    /// This is the monotonic hardware clock; it never pauses.
    frames_rendered: AtomicU64,
    playing: AtomicBool,
    /// Read position in source frames, 32.32 fixed point.
    cursor_fp: AtomicU64,
    /// Source-frame advance per output frame, 32.32 fixed point.
    step_fp: AtomicU64,
    asset: Mutex<Option<Arc<AudioAsset>>>,
}

/// cpal-backed sink. One always-running output stream; start/stop only flip
/// whether the callback pulls asset frames or writes silence.
pub struct CpalSink {
    _stream: cpal::Stream,
    shared: Arc<SinkShared>,
    out_rate: u32,
}

impl CpalSink {
    pub fn new() -> Result<Self, SinkError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(SinkError::NoOutputDevice)?;
        let supported = device
            .default_output_config()
            .map_err(|e| SinkError::Stream(e.to_string()))?;
        let out_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.clone().into();

        let shared = Arc::new(SinkShared {
            frames_rendered: AtomicU64::new(0),
            playing: AtomicBool::new(false),
            cursor_fp: AtomicU64::new(0),
            step_fp: AtomicU64::new(FP_ONE),
            asset: Mutex::new(None),
        });

        let err_fn = |err| eprintln!("audio stream error: {err}");
        let stream = match supported.sample_format() {
            SampleFormat::F32 => {
                let shared = Arc::clone(&shared);
                device.build_output_stream(
                    &config,
                    move |data: &mut [f32], _| render_frames(data, channels, &shared),
                    err_fn,
                    None,
                )
            }
            SampleFormat::I16 => {
                let shared = Arc::clone(&shared);
                device.build_output_stream(
                    &config,
                    move |data: &mut [i16], _| render_frames(data, channels, &shared),
                    err_fn,
                    None,
                )
            }
            SampleFormat::U16 => {
                let shared = Arc::clone(&shared);
                device.build_output_stream(
                    &config,
                    move |data: &mut [u16], _| render_frames(data, channels, &shared),
                    err_fn,
                    None,
                )
            }
            fmt => return Err(SinkError::Stream(format!("unsupported sample format: {fmt:?}"))),
        }
        .map_err(|e| SinkError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| SinkError::Stream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            shared,
            out_rate,
        })
    }
}

impl HardwareClock for CpalSink {
    fn now_seconds(&self) -> f64 {
        self.shared.frames_rendered.load(Ordering::Relaxed) as f64 / self.out_rate as f64
    }
}

impl AudioSink for CpalSink {
    fn start(&mut self, asset: Arc<AudioAsset>, offset_seconds: f64) -> Result<(), SinkError> {
        let step = asset.sample_rate() as f64 / self.out_rate as f64;
        let cursor = offset_seconds.max(0.0) * asset.sample_rate() as f64;

        let mut slot = self
            .shared
            .asset
            .lock()
            .map_err(|_| SinkError::Stream("asset slot poisoned".to_string()))?;
        *slot = Some(asset);
        drop(slot);

        self.shared
            .step_fp
            .store((step * FP_ONE as f64) as u64, Ordering::Relaxed);
        self.shared
            .cursor_fp
            .store((cursor * FP_ONE as f64) as u64, Ordering::Relaxed);
        self.shared.playing.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn stop(&mut self) {
        self.shared.playing.store(false, Ordering::Relaxed);
    }
}

fn render_frames<T: SizedSample + FromSample<f32>>(
    data: &mut [T],
    channels: usize,
    shared: &SinkShared,
) {
    let silence = T::from_sample(0.0f32);
    for frame in data.chunks_mut(channels) {
        // The hardware clock advances for every rendered frame, audible or not.
        shared.frames_rendered.fetch_add(1, Ordering::Relaxed);

        let mut wrote = false;
        if shared.playing.load(Ordering::Relaxed) {
            // try_lock keeps the audio callback from blocking on the control
            // thread; a missed frame degrades to one frame of silence.
            if let Ok(guard) = shared.asset.try_lock() {
                if let Some(asset) = guard.as_deref() {
                    let cursor = shared.cursor_fp.load(Ordering::Relaxed);
                    let index = (cursor >> 32) as usize;
                    if index >= asset.frame_count() {
                        shared.playing.store(false, Ordering::Relaxed);
                    } else {
                        for (c, slot) in frame.iter_mut().enumerate() {
                            *slot = T::from_sample(asset.frame_sample(index, c));
                        }
                        shared.cursor_fp.store(
                            cursor + shared.step_fp.load(Ordering::Relaxed),
                            Ordering::Relaxed,
                        );
                        wrote = true;
                    }
                }
            }
        }

        if !wrote {
            for slot in frame.iter_mut() {
                *slot = silence;
            }
        }
    }
}

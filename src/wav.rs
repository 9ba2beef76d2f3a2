use crate::asset::{AssetError, AudioAsset};
use std::fmt;
use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WavError {
    Io(String),
    Malformed(&'static str),
    Unsupported { what: &'static str, value: u32 },
    Asset(AssetError),
}

impl fmt::Display for WavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Malformed(what) => write!(f, "malformed WAV: {what}"),
            Self::Unsupported { what, value } => write!(f, "unsupported WAV {what}: {value}"),
            Self::Asset(err) => write!(f, "decoded data unusable: {err}"),
        }
    }
}

impl std::error::Error for WavError {}

impl From<std::io::Error> for WavError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Read a RIFF/WAVE file holding PCM16 or IEEE float32 samples.
pub fn read_wav(path: impl AsRef<Path>) -> Result<AudioAsset, WavError> {
    let mut bytes = Vec::new();
    fs::File::open(path.as_ref())?.read_to_end(&mut bytes)?;
    decode_wav(&bytes)
}

pub fn decode_wav(bytes: &[u8]) -> Result<AudioAsset, WavError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(WavError::Malformed("missing RIFF/WAVE header"));
    }

    let mut format: Option<(u16, u16, u32, u16)> = None; // (tag, channels, rate, bits)
    let mut data: Option<&[u8]> = None;

    let mut pos = 12usize;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes(bytes[pos + 4..pos + 8].try_into().unwrap_or_default()) as usize;
        let body_start = pos + 8;
        let body_end = body_start.saturating_add(size).min(bytes.len());
        let body = &bytes[body_start..body_end];

        match id {
            b"fmt " => {
                if body.len() < 16 {
                    return Err(WavError::Malformed("fmt chunk too short"));
                }
                let tag = u16::from_le_bytes([body[0], body[1]]);
                let channels = u16::from_le_bytes([body[2], body[3]]);
                let rate = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
                let bits = u16::from_le_bytes([body[14], body[15]]);
                format = Some((tag, channels, rate, bits));
            }
            b"data" => data = Some(body),
            _ => {}
        }

        // Chunks are word-aligned.
        pos = body_start + size + (size & 1);
    }

    let (tag, channels, rate, bits) = format.ok_or(WavError::Malformed("missing fmt chunk"))?;
    let data = data.ok_or(WavError::Malformed("missing data chunk"))?;
    if channels == 0 {
        return Err(WavError::Malformed("zero channels in fmt chunk"));
    }

    let channels = channels as usize;
    let mut planar: Vec<Vec<f32>> = vec![Vec::new(); channels];

    match (tag, bits) {
        // PCM16
        (1, 16) => {
            let frame_bytes = channels * 2;
            for frame in data.chunks_exact(frame_bytes) {
                for (c, sample) in frame.chunks_exact(2).enumerate() {
                    let v = i16::from_le_bytes([sample[0], sample[1]]);
                    planar[c].push(v as f32 / 32768.0);
                }
            }
        }
        // IEEE float32
        (3, 32) => {
            let frame_bytes = channels * 4;
            for frame in data.chunks_exact(frame_bytes) {
                for (c, sample) in frame.chunks_exact(4).enumerate() {
                    let v = f32::from_le_bytes([sample[0], sample[1], sample[2], sample[3]]);
                    planar[c].push(v.clamp(-1.0, 1.0));
                }
            }
        }
        (1, other) => {
            return Err(WavError::Unsupported {
                what: "PCM bit depth",
                value: other as u32,
            });
        }
        (other, _) => {
            return Err(WavError::Unsupported {
                what: "format tag",
                value: other as u32,
            });
        }
    }

    AudioAsset::new(planar, rate).map_err(WavError::Asset)
}

/// Write planar float samples as a PCM16 WAV file.
pub fn write_wav_i16(
    path: impl AsRef<Path>,
    sample_rate: u32,
    channels: &[Vec<f32>],
) -> Result<(), WavError> {
    let ch_count = channels.len() as u16;
    if ch_count == 0 {
        return Err(WavError::Asset(AssetError::NoChannels));
    }
    let frames = channels[0].len();

    let mut w = BufWriter::new(fs::File::create(path.as_ref())?);

    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * ch_count as u32 * bits_per_sample as u32 / 8;
    let block_align = ch_count * bits_per_sample / 8;
    let data_bytes = (frames * ch_count as usize * 2) as u32;
    let riff_size = 4 + 8 + 16 + 8 + data_bytes;

    w.write_all(b"RIFF")?;
    w.write_all(&riff_size.to_le_bytes())?;
    w.write_all(b"WAVE")?;

    // fmt chunk
    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&1u16.to_le_bytes())?; // PCM
    w.write_all(&ch_count.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&byte_rate.to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&bits_per_sample.to_le_bytes())?;

    // data chunk, interleaved
    w.write_all(b"data")?;
    w.write_all(&data_bytes.to_le_bytes())?;
    for frame in 0..frames {
        for ch in channels {
            let v = ch.get(frame).copied().unwrap_or(0.0).clamp(-1.0, 1.0);
            let s = (v * i16::MAX as f32) as i16;
            w.write_all(&s.to_le_bytes())?;
        }
    }

    w.flush()?;
    Ok(())
}

use crate::asset::AudioAsset;
use crate::color::ColorLookupTable;
use crate::config::FrequencyBy;
use crate::surface::{BakedImage, Compositing, Surface, SurfaceError};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use std::f32::consts::PI;
use std::fmt;

pub const MIN_FFT_SIZE: usize = 512;
pub const MAX_FFT_SIZE: usize = 2048;

/// Analyser byte scale: magnitudes are normalized by the FFT size and mapped
/// from [-100 dB, -30 dB] onto [0, 255], matching the platform analyser the
/// original rendering ran against.
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BakeError {
    BadFftSize(usize),
    Surface(SurfaceError),
}

impl fmt::Display for BakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadFftSize(n) => write!(
                f,
                "fft size must be a power of two in {MIN_FFT_SIZE}..={MAX_FFT_SIZE}, got {n}"
            ),
            Self::Surface(err) => write!(f, "bake draw failed: {err}"),
        }
    }
}

impl std::error::Error for BakeError {}

impl From<SurfaceError> for BakeError {
    fn from(err: SurfaceError) -> Self {
        Self::Surface(err)
    }
}

/// Offline spectral analysis pass that bakes a frequency-derived color into
/// the waveform image. Runs over the whole buffer, faster than real time;
/// the result is the immutable baked snapshot playback overlays restore to.
#[derive(Debug, Clone)]
pub struct SpectralColorBaker {
    fft_size: usize,
    frequency_by: FrequencyBy,
    lut: ColorLookupTable,
}

impl SpectralColorBaker {
    pub fn new(
        fft_size: usize,
        frequency_by: FrequencyBy,
        lut: ColorLookupTable,
    ) -> Result<Self, BakeError> {
        if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
            return Err(BakeError::BadFftSize(fft_size));
        }
        Ok(Self {
            fft_size,
            frequency_by,
            lut,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Analyze the asset block by block and composite the looked-up colors
    /// onto the existing line art. Returns the baked snapshot.
    pub fn bake(&self, asset: &AudioAsset, surface: &mut Surface) -> Result<BakedImage, BakeError> {
        let n = self.fft_size;
        let half = n / 2;
        let ranges = block_ranges(asset.frame_count(), n, surface.width());

        let hann = (0..n)
            .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / (n as f32)).cos())
            .collect::<Vec<_>>();
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n);
        let mut mono = vec![0.0f32; n];
        let mut fft_buf = vec![Complex { re: 0.0, im: 0.0 }; n];

        surface.set_compositing(Compositing::SourceAtop);
        let result: Result<(), BakeError> = (|| {
            for (block, &(x0, x1)) in ranges.iter().enumerate() {
                if x1 <= x0 {
                    continue;
                }
                asset.mix_block(block * n, &mut mono);
                for i in 0..n {
                    fft_buf[i].re = mono[i] * hann[i];
                    fft_buf[i].im = 0.0;
                }
                fft.process(&mut fft_buf);

                let magnitude = match self.frequency_by {
                    FrequencyBy::Average => {
                        let sum: f32 = fft_buf[..half].iter().map(|c| c.norm()).sum();
                        sum / half as f32
                    }
                    FrequencyBy::Max => fft_buf[..half]
                        .iter()
                        .map(|c| c.norm())
                        .fold(0.0f32, f32::max),
                };

                let color = self.lut.color_for(magnitude_byte(magnitude, n));
                surface.fill_rect(x0, 0, x1 - x0, surface.height(), color)?;
            }
            Ok(())
        })();
        surface.set_compositing(Compositing::Normal);
        result?;

        Ok(surface.snapshot())
    }
}

/// Map one block's magnitude statistic to a 0-255 lookup bucket.
pub fn magnitude_byte(magnitude: f32, fft_size: usize) -> u8 {
    let normalized = (magnitude / fft_size as f32).max(1e-12);
    let db = 20.0 * normalized.log10();
    let scaled = (db - MIN_DB) / (MAX_DB - MIN_DB) * 255.0;
    scaled.clamp(0.0, 255.0).round() as u8
}

/// Pixel X-ranges covered by consecutive analysis blocks.
///
/// Ranges are contiguous: each block starts where the previous one ended, the
/// first block is pinned to pixel 0 (a fractional start would leave an
/// unpainted leading gap), and the last block extends to the full width. The
/// union is exactly `[0, width)`. The time scale cancels out of the math, so
/// only the frame count and width matter.
pub fn block_ranges(frames: usize, fft_size: usize, width: u32) -> Vec<(u32, u32)> {
    if frames == 0 || fft_size == 0 || width == 0 {
        return Vec::new();
    }

    let blocks = frames.div_ceil(fft_size);
    let mut ranges = Vec::with_capacity(blocks);
    let mut start = 0u32;
    for block in 0..blocks {
        let end = if block + 1 == blocks {
            width
        } else {
            // x = end_frame * width / frames, clamped so later blocks can
            // still begin on the surface.
            let end_frame = (block + 1) * fft_size;
            let x = (end_frame as f64 * width as f64 / frames as f64).round() as u32;
            x.clamp(start, width)
        };
        ranges.push((start, end));
        start = end;
    }
    ranges
}

use crate::bake::{MAX_FFT_SIZE, MIN_FFT_SIZE};
use crate::color::{ColorLookupTable, Rgba};
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "wavebake",
    version,
    about = "Render a spectrally colored waveform image from a WAV file and play it back with a synchronized highlight overlay"
)]
pub struct Config {
    /// WAV file to render and play (PCM16 or float32).
    pub input: PathBuf,

    /// Waveform image width in pixels.
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Waveform image height in pixels.
    #[arg(long, default_value_t = 240)]
    pub height: u32,

    /// Sample stride for the line plot (1 visits every frame).
    #[arg(long, default_value_t = 4)]
    pub step: usize,

    /// Analysis block size; power of two in 512..=2048.
    #[arg(long, default_value_t = 1024)]
    pub fft_size: usize,

    /// Per-block spectral statistic driving the baked color.
    #[arg(long, value_enum, default_value_t = FrequencyBy::Average)]
    pub frequency_by: FrequencyBy,

    /// Baked color saturation, percent.
    #[arg(long, default_value_t = 50.0)]
    pub saturation: f32,

    /// Baked color lightness, percent.
    #[arg(long, default_value_t = 50.0)]
    pub lightness: f32,

    /// Fraction of the hue wheel covered by the color lookup table.
    #[arg(long, default_value_t = ColorLookupTable::DEFAULT_HUE_SCALE)]
    pub hue_scale: f32,

    /// Overlay repaint interval in milliseconds.
    #[arg(long, default_value_t = 60)]
    pub update_interval: u64,

    /// What a click on the waveform does.
    #[arg(long, value_enum, default_value_t = ClickAction::Seek)]
    pub on_click: ClickAction,

    /// Waveform stroke color (hex: #rgb, #rrggbb or #rrggbbaa).
    #[arg(long, default_value = "#e8e8e8")]
    pub stroke_color: String,

    /// Playback highlight color (hex: #rgb, #rrggbb or #rrggbbaa).
    #[arg(long, default_value = "#ffffff")]
    pub overlay_color: String,

    /// Bake and export a static image instead of interactive playback.
    #[arg(long, default_value_t = false)]
    pub as_image: bool,

    /// Output path for --as-image (binary PPM).
    #[arg(long, default_value = "waveform.ppm")]
    pub out: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FrequencyBy {
    Average,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClickAction {
    /// Click seeks to the clicked position.
    #[value(alias = "jump")]
    Seek,
    /// Click toggles play/pause, ignoring the position.
    #[value(alias = "pause")]
    Toggle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionsError {
    ZeroDimension { field: &'static str },
    ZeroStep,
    BadFftSize(usize),
    PercentOutOfRange { field: &'static str, value: f32 },
    BadHueScale(f32),
    ZeroUpdateInterval,
    BadColor { field: &'static str, value: String },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { field } => write!(f, "{field} must be at least 1"),
            Self::ZeroStep => write!(f, "step must be at least 1"),
            Self::BadFftSize(n) => write!(
                f,
                "fft-size must be a power of two in {MIN_FFT_SIZE}..={MAX_FFT_SIZE}, got {n}"
            ),
            Self::PercentOutOfRange { field, value } => {
                write!(f, "{field} must be in 0..=100, got {value}")
            }
            Self::BadHueScale(v) => write!(f, "hue-scale must be finite and in (0, 2], got {v}"),
            Self::ZeroUpdateInterval => write!(f, "update-interval must be at least 1ms"),
            Self::BadColor { field, value } => write!(f, "invalid {field} color '{value}'"),
        }
    }
}

impl std::error::Error for OptionsError {}

/// Validated, immutable engine configuration. Built once from the raw CLI
/// options; nothing downstream re-checks or mutates these.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub width: u32,
    pub height: u32,
    pub step: usize,
    pub fft_size: usize,
    pub frequency_by: FrequencyBy,
    pub saturation: f32,
    pub lightness: f32,
    pub hue_scale: f32,
    pub update_interval_ms: u64,
    pub on_click: ClickAction,
    pub stroke_color: Rgba,
    pub overlay_color: Rgba,
}

impl EngineOptions {
    pub fn from_config(cfg: &Config) -> Result<Self, OptionsError> {
        if cfg.width == 0 {
            return Err(OptionsError::ZeroDimension { field: "width" });
        }
        if cfg.height == 0 {
            return Err(OptionsError::ZeroDimension { field: "height" });
        }
        if cfg.step == 0 {
            return Err(OptionsError::ZeroStep);
        }
        if !cfg.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&cfg.fft_size)
        {
            return Err(OptionsError::BadFftSize(cfg.fft_size));
        }
        for (field, value) in [("saturation", cfg.saturation), ("lightness", cfg.lightness)] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(OptionsError::PercentOutOfRange { field, value });
            }
        }
        if !cfg.hue_scale.is_finite() || cfg.hue_scale <= 0.0 || cfg.hue_scale > 2.0 {
            return Err(OptionsError::BadHueScale(cfg.hue_scale));
        }
        if cfg.update_interval == 0 {
            return Err(OptionsError::ZeroUpdateInterval);
        }
        let stroke_color = parse_color(&cfg.stroke_color).ok_or_else(|| OptionsError::BadColor {
            field: "stroke",
            value: cfg.stroke_color.clone(),
        })?;
        let overlay_color =
            parse_color(&cfg.overlay_color).ok_or_else(|| OptionsError::BadColor {
                field: "overlay",
                value: cfg.overlay_color.clone(),
            })?;

        Ok(Self {
            width: cfg.width,
            height: cfg.height,
            step: cfg.step,
            fft_size: cfg.fft_size,
            frequency_by: cfg.frequency_by,
            saturation: cfg.saturation,
            lightness: cfg.lightness,
            hue_scale: cfg.hue_scale,
            update_interval_ms: cfg.update_interval,
            on_click: cfg.on_click,
            stroke_color,
            overlay_color,
        })
    }

    pub fn lookup_table(&self) -> ColorLookupTable {
        ColorLookupTable::build(self.saturation, self.lightness, self.hue_scale)
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into a color.
pub fn parse_color(s: &str) -> Option<Rgba> {
    let hex = s.trim().strip_prefix('#')?;
    let nibble = |c: u8| (c as char).to_digit(16).map(|d| d as u8);
    let byte = |pair: &[u8]| Some(nibble(pair[0])? * 16 + nibble(pair[1])?);

    let b = hex.as_bytes();
    match b.len() {
        3 => {
            let r = nibble(b[0])?;
            let g = nibble(b[1])?;
            let bl = nibble(b[2])?;
            Some(Rgba::opaque(r * 17, g * 17, bl * 17))
        }
        6 => Some(Rgba::opaque(
            byte(&b[0..2])?,
            byte(&b[2..4])?,
            byte(&b[4..6])?,
        )),
        8 => Some(Rgba {
            r: byte(&b[0..2])?,
            g: byte(&b[2..4])?,
            b: byte(&b[4..6])?,
            a: byte(&b[6..8])?,
        }),
        _ => None,
    }
}

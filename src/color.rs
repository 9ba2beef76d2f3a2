use std::fmt;

/// 8-bit RGBA color. Alpha 0 is "nothing drawn here" on the raster surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Blend this color over an opaque background, discarding alpha.
    pub fn over(self, bg: Rgba) -> (u8, u8, u8) {
        let a = self.a as u16;
        let mix = |fg: u8, bg: u8| (((fg as u16) * a + (bg as u16) * (255 - a)) / 255) as u8;
        (mix(self.r, bg.r), mix(self.g, bg.g), mix(self.b, bg.b))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Convert HSL (hue in degrees, saturation/lightness in [0,1]) to RGB bytes.
pub fn hsl_to_rgb(hue_deg: f32, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let h = hue_deg.rem_euclid(360.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let byte = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
    (byte(r1), byte(g1), byte(b1))
}

/// 256-entry map from a frequency-magnitude bucket to a baked color.
///
/// The hue span is a knob rather than a constant: the historical sources
/// disagreed on the scale, so callers pick one (`hue_scale`, fraction of the
/// full 360-degree wheel covered by buckets 0..=255).
#[derive(Debug, Clone)]
pub struct ColorLookupTable {
    entries: Box<[Rgba; 256]>,
}

impl ColorLookupTable {
    /// Default hue span, matching one of the historical constants (254/360).
    pub const DEFAULT_HUE_SCALE: f32 = 254.0 / 360.0;

    pub fn build(saturation_pct: f32, lightness_pct: f32, hue_scale: f32) -> Self {
        let s = (saturation_pct / 100.0).clamp(0.0, 1.0);
        let l = (lightness_pct / 100.0).clamp(0.0, 1.0);
        let mut entries = Box::new([Rgba::TRANSPARENT; 256]);
        for (bucket, slot) in entries.iter_mut().enumerate() {
            let hue = bucket as f32 / 255.0 * 360.0 * hue_scale;
            let (r, g, b) = hsl_to_rgb(hue, s, l);
            *slot = Rgba::opaque(r, g, b);
        }
        Self { entries }
    }

    pub fn color_for(&self, bucket: u8) -> Rgba {
        self.entries[bucket as usize]
    }
}

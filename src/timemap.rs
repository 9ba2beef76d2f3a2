/// Pure conversion between playback seconds and horizontal pixel offset.
///
/// The scale is fixed once the surface width and asset duration are known;
/// both directions clamp into their valid ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelTimeMap {
    width: u32,
    duration_seconds: f64,
}

impl PixelTimeMap {
    pub fn new(width: u32, duration_seconds: f64) -> Self {
        Self {
            width: width.max(1),
            duration_seconds: duration_seconds.max(f64::EPSILON),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.width as f64 / self.duration_seconds
    }

    pub fn x_for_seconds(&self, seconds: f64) -> f64 {
        (seconds * self.pixels_per_second()).clamp(0.0, self.width as f64)
    }

    pub fn seconds_for_x(&self, x: f64) -> f64 {
        (x / self.pixels_per_second()).clamp(0.0, self.duration_seconds)
    }
}

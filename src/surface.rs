use crate::color::Rgba;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Compositing rule for draw operations.
///
/// `SourceAtop` recolors only pixels that already hold something (alpha > 0),
/// so baked color and the playback overlay tint the stroke instead of
/// flooding the transparent background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compositing {
    Normal,
    SourceAtop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    ZeroSize,
    OutOfBounds { x: u32, y: u32 },
    DimensionMismatch { expected: (u32, u32), got: (u32, u32) },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize => write!(f, "surface dimensions must be positive"),
            Self::OutOfBounds { x, y } => write!(f, "draw origin ({x}, {y}) outside surface"),
            Self::DimensionMismatch { expected, got } => write!(
                f,
                "snapshot is {}x{} but surface is {}x{}",
                got.0, got.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Fixed-size RGBA raster. Starts fully transparent.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    compositing: Compositing,
    data: Vec<u8>,
}

/// Immutable snapshot of a surface, copied out after baking and restored
/// before seeks and on stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakedImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::ZeroSize);
        }
        Ok(Self {
            width,
            height,
            compositing: Compositing::Normal,
            data: vec![0u8; width as usize * height as usize * 4],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_compositing(&mut self, mode: Compositing) {
        self.compositing = mode;
    }

    pub fn compositing(&self) -> Compositing {
        self.compositing
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Rgba {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        }
    }

    /// Write one pixel under the current compositing rule. Out-of-range
    /// coordinates are clipped, not errors.
    pub fn put_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        match self.compositing {
            Compositing::Normal => {
                self.data[i] = color.r;
                self.data[i + 1] = color.g;
                self.data[i + 2] = color.b;
                self.data[i + 3] = color.a;
            }
            Compositing::SourceAtop => {
                // Keep destination alpha; recolor only where something exists.
                if self.data[i + 3] == 0 {
                    return;
                }
                self.data[i] = color.r;
                self.data[i + 1] = color.g;
                self.data[i + 2] = color.b;
            }
        }
    }

    /// Stroke a continuous polyline through the given points.
    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], color: Rgba) {
        if points.is_empty() {
            return;
        }
        if points.len() == 1 {
            let (x, y) = points[0];
            self.put_pixel(x.round() as i64, y.round() as i64, color);
            return;
        }
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], color);
        }
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba) {
        let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
        let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put_pixel(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Fill a rectangle. The origin must be on the surface; the extent is
    /// clipped to the right/bottom edges.
    pub fn fill_rect(
        &mut self,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        color: Rgba,
    ) -> Result<(), SurfaceError> {
        if x >= self.width || y >= self.height {
            return Err(SurfaceError::OutOfBounds { x, y });
        }
        let x1 = (x + w).min(self.width);
        let y1 = (y + h).min(self.height);
        for py in y..y1 {
            for px in x..x1 {
                self.put_pixel(px as i64, py as i64, color);
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> BakedImage {
        BakedImage {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
        }
    }

    pub fn restore(&mut self, baked: &BakedImage) -> Result<(), SurfaceError> {
        if baked.width != self.width || baked.height != self.height {
            return Err(SurfaceError::DimensionMismatch {
                expected: (self.width, self.height),
                got: (baked.width, baked.height),
            });
        }
        self.data.copy_from_slice(&baked.data);
        Ok(())
    }
}

impl BakedImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    /// Serialize as binary PPM (P6), alpha-blended over an opaque background.
    pub fn to_ppm(&self, background: Rgba) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() / 4 * 3 + 32);
        let _ = write!(out, "P6\n{} {}\n255\n", self.width, self.height);
        for px in self.data.chunks_exact(4) {
            let fg = Rgba {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            };
            let (r, g, b) = fg.over(background);
            out.extend_from_slice(&[r, g, b]);
        }
        out
    }

    pub fn write_ppm(&self, path: impl AsRef<Path>, background: Rgba) -> std::io::Result<()> {
        fs::write(path, self.to_ppm(background))
    }
}

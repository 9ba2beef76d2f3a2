use crate::color::Rgba;
use crate::surface::{Compositing, Surface};
use crate::timemap::PixelTimeMap;

/// What one overlay tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Painted the highlight from `from_x` up to (not including) `to_x`.
    Painted { from_x: u32, to_x: u32 },
    /// Sub-pixel advance; nothing to repaint.
    Skipped,
    /// Playback reached the asset end, or the surface refused the draw.
    /// Either way the caller stops playback.
    EndOfTrack,
}

/// Paints the playback highlight over the baked waveform, one delta
/// rectangle per tick.
#[derive(Debug, Clone)]
pub struct OverlayPainter {
    map: PixelTimeMap,
    color: Rgba,
    last_x: f64,
}

impl OverlayPainter {
    pub fn new(map: PixelTimeMap, color: Rgba) -> Self {
        Self {
            map,
            color,
            last_x: 0.0,
        }
    }

    pub fn map(&self) -> &PixelTimeMap {
        &self.map
    }

    pub fn last_x(&self) -> f64 {
        self.last_x
    }

    /// Rebuild the cursor after a bake, seek, or stop.
    pub fn rewind(&mut self) {
        self.last_x = 0.0;
    }

    /// Advance the highlight to the given elapsed time.
    pub fn tick(&mut self, elapsed_seconds: f64, surface: &mut Surface) -> TickOutcome {
        if elapsed_seconds >= self.map.duration_seconds() {
            return TickOutcome::EndOfTrack;
        }

        let this_x = elapsed_seconds * self.map.pixels_per_second();
        if this_x - self.last_x < 1.0 {
            return TickOutcome::Skipped;
        }

        // Clamp to the map, not the surface: the map is the authority on
        // width, and a surface that no longer matches it must refuse the
        // draw below rather than silently shrink the painted range.
        let from_x = self.last_x.floor() as u32;
        let to_x = (this_x.floor() as u32).min(self.map.width());
        if to_x <= from_x {
            return TickOutcome::Skipped;
        }

        surface.set_compositing(Compositing::SourceAtop);
        let painted = surface.fill_rect(from_x, 0, to_x - from_x, surface.height(), self.color);
        surface.set_compositing(Compositing::Normal);
        if painted.is_err() {
            // A refused draw means the surface is no longer usable; halt
            // playback instead of diverging silently.
            return TickOutcome::EndOfTrack;
        }

        self.last_x = this_x;
        TickOutcome::Painted { from_x, to_x }
    }
}

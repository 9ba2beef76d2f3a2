use crate::color::Rgba;
use crate::surface::Surface;
use std::io::Write;

/// Backdrop the transparent canvas is blended over in the terminal.
const BACKDROP: Rgba = Rgba::opaque(16, 16, 16);

/// Terminal area the waveform occupies, plus the HUD rows below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLayout {
    pub term_cols: u16,
    pub visual_rows: u16,
    pub hud_rows: u16,
}

impl PreviewLayout {
    pub fn for_size(size: (u16, u16), hud_rows: u16) -> Self {
        let (cols, rows) = size;
        Self {
            term_cols: cols.max(1),
            visual_rows: rows.saturating_sub(hud_rows).max(1),
            hud_rows,
        }
    }

    /// Map a terminal column back to a canvas pixel x, for pointer clicks.
    pub fn pixel_x_for_column(&self, col: u16, surface_width: u32) -> f64 {
        let cols = self.term_cols.max(1) as f64;
        let x = (col.min(self.term_cols.saturating_sub(1)) as f64 + 0.5) * surface_width as f64
            / cols;
        x.clamp(0.0, (surface_width.saturating_sub(1)) as f64)
    }
}

/// Half-block terminal view of the waveform canvas. Each cell shows two
/// vertically stacked pixels via U+2580 with independent fg/bg colors;
/// repeated colors reuse the previous SGR sequence.
pub struct PreviewRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl PreviewRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }

    pub fn render(
        &mut self,
        surface: &Surface,
        layout: PreviewLayout,
        hud: &str,
        out: &mut dyn Write,
    ) -> anyhow::Result<()> {
        let cols = layout.term_cols as usize;
        let visual_rows = layout.visual_rows as usize;
        if cols == 0 || visual_rows == 0 {
            return Ok(());
        }

        // Home, reset. Autowrap (DECAWM) stays off while painting full-width
        // rows; some terminals wrap on the last column otherwise.
        out.write_all(b"\x1b[H\x1b[0m")?;
        out.write_all(b"\x1b[?7l")?;
        self.last_fg = None;
        self.last_bg = None;

        const HALF_BLOCK: char = '\u{2580}';
        let grid_h = visual_rows * 2;

        for row in 0..visual_rows {
            let top_y = row * 2;
            let bot_y = top_y + 1;
            for col in 0..cols {
                let top = sample_cell(surface, col, top_y, cols, grid_h);
                let bot = sample_cell(surface, col, bot_y, cols, grid_h);

                if self.last_fg != Some(top) {
                    write!(out, "\x1b[38;2;{};{};{}m", top.0, top.1, top.2)?;
                    self.last_fg = Some(top);
                }
                if self.last_bg != Some(bot) {
                    write!(out, "\x1b[48;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    self.last_bg = Some(bot);
                }
                write!(out, "{HALF_BLOCK}")?;
            }
            out.write_all(b"\r\n")?;
        }

        let mut hud_lines = hud.lines();
        for i in 0..(layout.hud_rows as usize) {
            write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", visual_rows + i + 1)?;
            if let Some(mut line) = hud_lines.next() {
                if line.len() > cols {
                    line = &line[..cols];
                }
                write!(out, "{line}")?;
            }
        }
        self.last_fg = None;
        self.last_bg = None;

        out.write_all(b"\x1b[?7h")?;
        out.flush()?;
        Ok(())
    }
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest-neighbor sample of the canvas at one cell of a `cols` x `grid_h`
/// terminal pixel grid, blended over the backdrop.
fn sample_cell(surface: &Surface, gx: usize, gy: usize, cols: usize, grid_h: usize) -> (u8, u8, u8) {
    let w = surface.width() as usize;
    let h = surface.height() as usize;
    let sx = (gx * w / cols).min(w - 1) as u32;
    let sy = (gy * h / grid_h).min(h - 1) as u32;
    surface.pixel(sx, sy).over(BACKDROP)
}

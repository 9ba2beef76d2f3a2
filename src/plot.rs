use crate::asset::AudioAsset;
use crate::color::Rgba;
use crate::surface::{Compositing, Surface};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotParams {
    /// Sample stride; 1 visits every frame.
    pub step: usize,
    pub color: Rgba,
}

/// What the plotter actually drew, for callers that assert coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotStats {
    pub points: usize,
    pub segments: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotError {
    ZeroStep,
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroStep => write!(f, "sample stride must be at least 1"),
        }
    }
}

impl std::error::Error for PlotError {}

/// Draw the static line plot of the decoded samples.
///
/// One continuous polyline: start at the left midline, then one vertex per
/// visited frame at `x = i * width/frame_count`,
/// `y = mean_amplitude(i) * height + height/2`. The renderer's own
/// connect-the-dots between strided vertices supplies the visual smoothing;
/// out-of-range y is clipped at rasterization. Fewer than two frames renders
/// a flat midline.
pub fn plot_waveform(
    asset: &AudioAsset,
    surface: &mut Surface,
    params: &PlotParams,
) -> Result<PlotStats, PlotError> {
    if params.step == 0 {
        return Err(PlotError::ZeroStep);
    }

    let width = surface.width() as f32;
    let height = surface.height() as f32;
    let mid_y = height / 2.0;
    let frames = asset.frame_count();

    surface.set_compositing(Compositing::Normal);

    if frames < 2 {
        let points = [(0.0, mid_y), (width - 1.0, mid_y)];
        surface.stroke_polyline(&points, params.color);
        return Ok(PlotStats {
            points: points.len(),
            segments: 1,
        });
    }

    let x_per_frame = width / frames as f32;
    let visited = frames.div_ceil(params.step);

    let mut points = Vec::with_capacity(visited + 1);
    points.push((0.0, mid_y));
    for i in (0..frames).step_by(params.step) {
        let x = i as f32 * x_per_frame;
        let y = asset.mean_amplitude(i) * height + mid_y;
        points.push((x, y));
    }

    surface.stroke_polyline(&points, params.color);
    Ok(PlotStats {
        points: points.len(),
        segments: points.len() - 1,
    })
}

use wavebake::asset::AudioAsset;
use wavebake::color::Rgba;
use wavebake::plot::{plot_waveform, PlotError, PlotParams};
use wavebake::surface::{Compositing, Surface, SurfaceError};
use wavebake::timemap::PixelTimeMap;

const STROKE: Rgba = Rgba::opaque(232, 232, 232);

fn silent_asset(frames: usize) -> AudioAsset {
    AudioAsset::mono(vec![0.0; frames], 44_100).unwrap()
}

fn params(step: usize) -> PlotParams {
    PlotParams {
        step,
        color: STROKE,
    }
}

// ── waveform plotting ───────────────────────────────────────────────────────

#[test]
fn plot_visits_every_strided_frame() {
    let asset = silent_asset(1000);
    let mut surface = Surface::new(200, 50).unwrap();
    let stats = plot_waveform(&asset, &mut surface, &params(4)).unwrap();
    // 250 strided vertices plus the midline start point.
    assert_eq!(stats.points, 251);
    assert_eq!(stats.segments, 250);
}

#[test]
fn plot_step_one_visits_all_frames() {
    let asset = silent_asset(100);
    let mut surface = Surface::new(100, 40).unwrap();
    let stats = plot_waveform(&asset, &mut surface, &params(1)).unwrap();
    assert_eq!(stats.segments, 100);
}

#[test]
fn plot_rejects_zero_step() {
    let asset = silent_asset(100);
    let mut surface = Surface::new(100, 40).unwrap();
    let err = plot_waveform(&asset, &mut surface, &params(0)).unwrap_err();
    assert_eq!(err, PlotError::ZeroStep);
}

#[test]
fn plot_silence_draws_the_midline() {
    let asset = silent_asset(400);
    let mut surface = Surface::new(100, 40).unwrap();
    plot_waveform(&asset, &mut surface, &params(1)).unwrap();

    let mid = surface.pixel(50, 20);
    assert_eq!(mid, STROKE, "midline pixel should carry the stroke");
    let off = surface.pixel(50, 5);
    assert_eq!(off.a, 0, "pixels away from the stroke stay transparent");
}

#[test]
fn plot_single_frame_draws_a_flat_line() {
    let asset = silent_asset(1);
    let mut surface = Surface::new(64, 32).unwrap();
    let stats = plot_waveform(&asset, &mut surface, &params(3)).unwrap();
    assert_eq!(stats.segments, 1);
    assert_eq!(surface.pixel(0, 16), STROKE);
    assert_eq!(surface.pixel(63, 16), STROKE);
}

#[test]
fn plot_clips_out_of_range_amplitude() {
    // Full-scale samples map below the surface; rasterization clips them.
    let asset = AudioAsset::mono(vec![1.0; 256], 44_100).unwrap();
    let mut surface = Surface::new(64, 32).unwrap();
    plot_waveform(&asset, &mut surface, &params(1)).unwrap();
}

// ── pixel/time map ──────────────────────────────────────────────────────────

#[test]
fn map_scale_is_width_over_duration() {
    let map = PixelTimeMap::new(300, 2.0);
    assert_eq!(map.pixels_per_second(), 150.0);
    assert_eq!(map.x_for_seconds(1.0), 150.0);
    assert_eq!(map.seconds_for_x(150.0), 1.0);
}

#[test]
fn map_clamps_both_directions() {
    let map = PixelTimeMap::new(300, 2.0);
    assert_eq!(map.x_for_seconds(-1.0), 0.0);
    assert_eq!(map.x_for_seconds(99.0), 300.0);
    assert_eq!(map.seconds_for_x(-5.0), 0.0);
    assert_eq!(map.seconds_for_x(9999.0), 2.0);
}

#[test]
fn map_survives_degenerate_inputs() {
    let map = PixelTimeMap::new(0, 0.0);
    assert!(map.pixels_per_second().is_finite());
    assert_eq!(map.width(), 1);
}

// ── surface ─────────────────────────────────────────────────────────────────

#[test]
fn surface_rejects_zero_dimensions() {
    assert_eq!(Surface::new(0, 10).unwrap_err(), SurfaceError::ZeroSize);
    assert_eq!(Surface::new(10, 0).unwrap_err(), SurfaceError::ZeroSize);
}

#[test]
fn source_atop_skips_transparent_pixels() {
    let mut surface = Surface::new(4, 4).unwrap();
    surface.put_pixel(1, 1, STROKE);

    surface.set_compositing(Compositing::SourceAtop);
    let red = Rgba::opaque(255, 0, 0);
    surface.put_pixel(1, 1, red);
    surface.put_pixel(2, 2, red);

    assert_eq!(surface.pixel(1, 1), red, "drawn pixel gets recolored");
    assert_eq!(surface.pixel(2, 2).a, 0, "empty pixel stays empty");
}

#[test]
fn fill_rect_requires_origin_on_surface() {
    let mut surface = Surface::new(8, 8).unwrap();
    let err = surface.fill_rect(8, 0, 1, 1, STROKE).unwrap_err();
    assert!(matches!(err, SurfaceError::OutOfBounds { .. }));
    // In-range origin with oversized extent is clipped, not refused.
    surface.fill_rect(6, 6, 10, 10, STROKE).unwrap();
    assert_eq!(surface.pixel(7, 7), STROKE);
}

#[test]
fn snapshot_restore_round_trips() {
    let mut surface = Surface::new(16, 8).unwrap();
    surface.fill_rect(0, 0, 16, 8, STROKE).unwrap();
    let baked = surface.snapshot();

    surface.fill_rect(0, 0, 16, 8, Rgba::opaque(1, 2, 3)).unwrap();
    assert_ne!(surface.as_rgba(), baked.as_rgba());

    surface.restore(&baked).unwrap();
    assert_eq!(surface.as_rgba(), baked.as_rgba());
}

#[test]
fn restore_rejects_mismatched_snapshot() {
    let mut surface = Surface::new(16, 8).unwrap();
    let other = Surface::new(8, 8).unwrap().snapshot();
    assert!(matches!(
        surface.restore(&other),
        Err(SurfaceError::DimensionMismatch { .. })
    ));
}

use crate::color::Rgba;
use crate::config::{Config, EngineOptions};
use crate::engine::Engine;
use crate::events::EngineEvent;
use crate::playback::{PlaybackController, PlaybackState};
use crate::preview::{PreviewLayout, PreviewRenderer};
use crate::sink::CpalSink;
use crate::surface::Surface;
use crate::term::TerminalGuard;
use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use std::io::BufWriter;
use std::time::{Duration, Instant};

const HUD_ROWS: u16 = 2;
const SEEK_STEP_SECONDS: f64 = 5.0;

/// Background for the exported PPM; the live preview blends over its own
/// darker backdrop.
const EXPORT_BACKGROUND: Rgba = Rgba::opaque(0, 0, 0);

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let options = EngineOptions::from_config(&cfg).context("invalid options")?;

    if cfg.as_image {
        return export_image(&cfg, options);
    }
    run_interactive(&cfg, options)
}

/// Non-interactive path: bake on the calling thread, write the PPM, exit.
fn export_image(cfg: &Config, options: EngineOptions) -> anyhow::Result<()> {
    let mut engine = Engine::new(options).context("create engine")?;
    engine
        .load_wav(&cfg.input)
        .with_context(|| format!("load {}", cfg.input.display()))?;
    engine.render().context("plot waveform")?;
    engine.bake_blocking().context("bake spectral colors")?;

    let baked = engine
        .baked_image()
        .context("bake finished without an image")?;
    baked
        .write_ppm(&cfg.out, EXPORT_BACKGROUND)
        .with_context(|| format!("write {}", cfg.out.display()))?;
    eprintln!("wrote {}", cfg.out.display());
    Ok(())
}

fn run_interactive(cfg: &Config, options: EngineOptions) -> anyhow::Result<()> {
    let update_interval = Duration::from_millis(options.update_interval_ms);

    let mut engine = Engine::new(options).context("create engine")?;
    engine
        .load_wav(&cfg.input)
        .with_context(|| format!("load {}", cfg.input.display()))?;
    engine.render().context("plot waveform")?;
    engine.start_bake().context("start spectral bake")?;

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());
    let mut renderer = PreviewRenderer::new();

    // The spectral pass runs on its worker; keep the terminal responsive and
    // let the user bail out early.
    let mut spinner = 0usize;
    while !engine.poll_baked().context("spectral bake")? {
        if poll_quit()? {
            return Ok(());
        }
        let size = crossterm::terminal::size().context("get terminal size")?;
        let layout = PreviewLayout::for_size(size, HUD_ROWS);
        let dots = ".".repeat(spinner % 4);
        let hud = format!("baking spectral colors{dots}\nq quit");
        render_blank(&mut renderer, layout, &hud, &mut out)?;
        spinner += 1;
        std::thread::sleep(Duration::from_millis(100));
    }

    let sink = CpalSink::new().context("open audio output")?;
    let mut controller = engine
        .into_controller(Box::new(sink))
        .context("enable playback")?;

    let mut status = String::from("ready");
    loop {
        let frame_start = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    if handle_key(k.code, k.modifiers, &mut controller)? {
                        return Ok(());
                    }
                }
                Event::Mouse(m) => {
                    if let MouseEventKind::Down(MouseButton::Left) = m.kind {
                        let size = crossterm::terminal::size()?;
                        let layout = PreviewLayout::for_size(size, HUD_ROWS);
                        if m.row < layout.visual_rows {
                            let x = layout
                                .pixel_x_for_column(m.column, controller.surface().width());
                            controller.click(x).context("click")?;
                        }
                    }
                }
                _ => {}
            }
        }

        controller.tick();
        if let Some(event) = last_event(&mut controller) {
            status = event.to_string();
        }

        let size = crossterm::terminal::size().context("get terminal size")?;
        let layout = PreviewLayout::for_size(size, HUD_ROWS);
        let hud = build_hud(&controller, &status);
        renderer.render(controller.surface(), layout, &hud, &mut out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < update_interval {
            std::thread::sleep(update_interval - elapsed);
        }
    }
}

/// Returns `true` when the key asks to quit.
fn handle_key(
    code: KeyCode,
    mods: KeyModifiers,
    controller: &mut PlaybackController,
) -> anyhow::Result<bool> {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return Ok(true);
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        KeyCode::Char(' ') => {
            if controller.state() == PlaybackState::Playing {
                controller.pause();
            } else {
                controller.play().context("start playback")?;
            }
        }
        KeyCode::Char('s') | KeyCode::Char('S') => controller.stop(),
        KeyCode::Left => {
            let target = controller.position_seconds() - SEEK_STEP_SECONDS;
            controller.seek_seconds(target).context("seek")?;
        }
        KeyCode::Right => {
            let target = controller.position_seconds() + SEEK_STEP_SECONDS;
            controller.seek_seconds(target).context("seek")?;
        }
        _ => {}
    }
    Ok(false)
}

fn poll_quit() -> anyhow::Result<bool> {
    while event::poll(Duration::from_millis(0))? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Release {
                continue;
            }
            if matches!(k.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
                || (k.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(k.code, KeyCode::Char('c')))
            {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn last_event(controller: &mut PlaybackController) -> Option<EngineEvent> {
    let mut last = None;
    while let Some(event) = controller.pop_event() {
        last = Some(event);
    }
    last
}

fn build_hud(controller: &PlaybackController, status: &str) -> String {
    let state = match controller.state() {
        PlaybackState::Stopped => "stopped",
        PlaybackState::Playing => "playing",
        PlaybackState::Paused => "paused",
    };
    format!(
        "{} / {} | {} | {}\nspace play/pause | s stop | left/right seek | click waveform | q quit",
        format_clock(controller.position_seconds()),
        format_clock(controller.duration_seconds()),
        state,
        status,
    )
}

fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0);
    let minutes = (total / 60.0) as u64;
    let secs = total - minutes as f64 * 60.0;
    format!("{minutes:02}:{secs:04.1}")
}

/// Clear the visual area and show only the HUD, used while baking.
fn render_blank(
    renderer: &mut PreviewRenderer,
    layout: PreviewLayout,
    hud: &str,
    out: &mut BufWriter<std::io::Stdout>,
) -> anyhow::Result<()> {
    // A 1x2 transparent canvas paints the backdrop across the whole area.
    let blank = Surface::new(1, 2).context("blank surface")?;
    renderer.render(&blank, layout, hud, out)
}

use crate::asset::AudioAsset;
use crate::clock::PlaybackClock;
use crate::color::Rgba;
use crate::config::ClickAction;
use crate::events::{EngineEvent, EventQueue};
use crate::overlay::{OverlayPainter, TickOutcome};
use crate::sink::{AudioSink, SinkError};
use crate::surface::{BakedImage, Surface};
use crate::timemap::PixelTimeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// State machine orchestrating the clock, the overlay painter, and user
/// actions over the baked waveform.
///
/// Constructed only once baking has completed, so every reachable state has a
/// valid snapshot to restore to. The controller is the sole canvas writer
/// from that point on.
pub struct PlaybackController {
    state: PlaybackState,
    clock: PlaybackClock,
    overlay: OverlayPainter,
    surface: Surface,
    baked: BakedImage,
    asset: Arc<AudioAsset>,
    sink: Box<dyn AudioSink>,
    on_click: ClickAction,
    events: EventQueue,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl PlaybackController {
    pub fn new(
        asset: Arc<AudioAsset>,
        surface: Surface,
        baked: BakedImage,
        sink: Box<dyn AudioSink>,
        overlay_color: Rgba,
        on_click: ClickAction,
        events: EventQueue,
    ) -> Self {
        let map = PixelTimeMap::new(surface.width(), asset.duration_seconds());
        Self {
            state: PlaybackState::Stopped,
            clock: PlaybackClock::new(),
            overlay: OverlayPainter::new(map, overlay_color),
            surface,
            baked,
            asset,
            sink,
            on_click,
            events,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn duration_seconds(&self) -> f64 {
        self.asset.duration_seconds()
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.overlay.map().pixels_per_second()
    }

    /// Current logical position: projected while playing, committed otherwise.
    pub fn position_seconds(&self) -> f64 {
        let position = match self.state {
            PlaybackState::Playing => self.clock.elapsed(self.sink.now_seconds()),
            _ => self.clock.position(),
        };
        position.clamp(0.0, self.duration_seconds())
    }

    pub fn overlay_x(&self) -> f64 {
        self.overlay.last_x()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn baked(&self) -> &BakedImage {
        &self.baked
    }

    pub fn pop_event(&mut self) -> Option<EngineEvent> {
        self.events.pop()
    }

    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }

    /// Start or resume playback from the committed position. A no-op while
    /// already playing.
    pub fn play(&mut self) -> Result<(), SinkError> {
        if self.state == PlaybackState::Playing {
            return Ok(());
        }
        let from = self.clock.position().clamp(0.0, self.duration_seconds());
        self.sink.start(Arc::clone(&self.asset), from)?;
        let now = self.sink.now_seconds();
        self.clock.start(from, now);
        self.state = PlaybackState::Playing;
        self.events.push(EngineEvent::Play);
        Ok(())
    }

    /// Halt output and commit the current position. A no-op unless playing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.sink.stop();
        let now = self.sink.now_seconds();
        let committed = self.clock.pause(now).clamp(0.0, self.duration_seconds());
        self.clock.set_position(committed);
        self.state = PlaybackState::Paused;
        self.events.push(EngineEvent::Stop { paused: true });
    }

    /// Halt output, reset the logical position to zero and restore the baked
    /// snapshot, undoing all overlay painting. A no-op while stopped.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        self.sink.stop();
        self.clock.reset();
        self.overlay.rewind();
        // A restore refusal means the surface is gone; playback is already
        // halted, so there is nothing further to unwind.
        let _ = self.surface.restore(&self.baked);
        self.state = PlaybackState::Stopped;
        self.events.push(EngineEvent::Stop { paused: false });
    }

    /// Seek to an absolute position. Restores the baked snapshot first; if
    /// playback was running it resumes anchored at the target, otherwise the
    /// position is committed for the next `play`.
    pub fn seek_seconds(&mut self, seconds: f64) -> Result<(), SinkError> {
        let target = seconds.clamp(0.0, self.duration_seconds());
        let was_playing = self.state == PlaybackState::Playing;

        if was_playing {
            self.sink.stop();
        }
        let _ = self.surface.restore(&self.baked);
        self.overlay.rewind();
        self.clock.reset();
        self.clock.set_position(target);
        self.state = PlaybackState::Paused;

        if was_playing {
            self.play()?;
        }
        Ok(())
    }

    pub fn seek_to_pixel(&mut self, x: f64) -> Result<(), SinkError> {
        let target = self.overlay.map().seconds_for_x(x);
        self.seek_seconds(target)
    }

    /// A pointer click at pixel `x`, interpreted per the configured policy.
    pub fn click(&mut self, x: f64) -> Result<(), SinkError> {
        match self.on_click {
            ClickAction::Seek => self.seek_to_pixel(x),
            ClickAction::Toggle => {
                if self.state == PlaybackState::Playing {
                    self.pause();
                    Ok(())
                } else {
                    self.play()
                }
            }
        }
    }

    /// One cooperative scheduler tick. Paints the overlay delta while
    /// playing; reaching the asset end (or a refused draw) stops playback
    /// synchronously, so no further tick can repaint.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        let elapsed = self.clock.elapsed(self.sink.now_seconds());
        let outcome = self.overlay.tick(elapsed, &mut self.surface);
        if outcome == TickOutcome::EndOfTrack {
            self.stop();
        }
        Some(outcome)
    }
}

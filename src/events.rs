use std::collections::VecDeque;
use std::fmt;

/// Notifications the engine exposes to collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The raster surface exists.
    CanvasLoaded,
    /// The asset decoded successfully.
    SoundLoaded,
    /// The static line plot is drawn.
    Rendered,
    /// The spectral color pass finished; playback may be enabled.
    Baked,
    /// Playback started or resumed.
    Play,
    /// Playback halted. `paused` distinguishes pause from a full stop.
    Stop { paused: bool },
    /// The asset could not be read or decoded. Fired once, never retried.
    LoadFailed { message: String },
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CanvasLoaded => write!(f, "canvas loaded"),
            Self::SoundLoaded => write!(f, "sound loaded"),
            Self::Rendered => write!(f, "rendered"),
            Self::Baked => write!(f, "baked"),
            Self::Play => write!(f, "play"),
            Self::Stop { paused: true } => write!(f, "paused"),
            Self::Stop { paused: false } => write!(f, "stopped"),
            Self::LoadFailed { message } => write!(f, "load failed: {message}"),
        }
    }
}

/// Drainable event delivery; avoids callback re-entrancy into the engine.
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: VecDeque<EngineEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EngineEvent) {
        self.queue.push_back(event);
    }

    pub fn pop(&mut self) -> Option<EngineEvent> {
        self.queue.pop_front()
    }

    pub fn drain(&mut self) -> Vec<EngineEvent> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

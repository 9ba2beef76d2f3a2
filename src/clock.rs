use std::time::Instant;

/// Monotonic, non-pausable time source. The audio output subsystem provides
/// the real one; tests drive a manual implementation.
pub trait HardwareClock {
    fn now_seconds(&self) -> f64;
}

/// Fallback hardware clock for paths without an audio sink (image export).
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareClock for SystemClock {
    fn now_seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Reconciles the monotonic hardware clock with the pausable, seekable
/// logical playback position.
///
/// The hardware clock starts at an arbitrary epoch and can never be paused or
/// rewound, so pause/seek semantics are implemented purely by tracking the
/// offset between hardware time and logical position, re-anchored on every
/// transition. Callers sample the clock and pass the reading in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackClock {
    logical_seconds: f64,
    hardware_at_start: Option<f64>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            logical_seconds: 0.0,
            hardware_at_start: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.hardware_at_start.is_some()
    }

    /// Committed logical position; meaningful while paused or stopped.
    pub fn position(&self) -> f64 {
        self.logical_seconds
    }

    /// Set the committed position while not running (seek while paused or
    /// stopped).
    pub fn set_position(&mut self, seconds: f64) {
        self.logical_seconds = seconds.max(0.0);
    }

    /// Anchor playback at `from` seconds against the current hardware time.
    pub fn start(&mut self, from: f64, hardware_now: f64) {
        self.logical_seconds = from.max(0.0);
        self.hardware_at_start = Some(hardware_now);
    }

    /// Logical position projected through real elapsed time. Only meaningful
    /// while running; returns the committed position otherwise.
    pub fn elapsed(&self, hardware_now: f64) -> f64 {
        match self.hardware_at_start {
            Some(anchor) => self.logical_seconds + (hardware_now - anchor),
            None => self.logical_seconds,
        }
    }

    /// Commit the projected position and detach from the hardware clock.
    /// Returns the committed value.
    pub fn pause(&mut self, hardware_now: f64) -> f64 {
        self.logical_seconds = self.elapsed(hardware_now);
        self.hardware_at_start = None;
        self.logical_seconds
    }

    pub fn reset(&mut self) {
        self.logical_seconds = 0.0;
        self.hardware_at_start = None;
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

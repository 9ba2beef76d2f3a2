use wavebake::clock::{HardwareClock, PlaybackClock, SystemClock};

// ── playback clock ──────────────────────────────────────────────────────────

#[test]
fn starts_at_zero_and_not_running() {
    let clock = PlaybackClock::new();
    assert!(!clock.is_running());
    assert_eq!(clock.position(), 0.0);
    assert_eq!(clock.elapsed(123.0), 0.0);
}

#[test]
fn elapsed_tracks_hardware_delta() {
    let mut clock = PlaybackClock::new();
    clock.start(0.0, 10.0);
    assert!(clock.is_running());
    assert_eq!(clock.elapsed(10.0), 0.0);
    assert_eq!(clock.elapsed(12.5), 2.5);
}

#[test]
fn start_offset_shifts_the_projection() {
    let mut clock = PlaybackClock::new();
    clock.start(5.0, 100.0);
    assert_eq!(clock.elapsed(101.0), 6.0);
}

#[test]
fn hardware_epoch_is_irrelevant() {
    // The hardware clock never starts at zero; only deltas matter.
    let mut a = PlaybackClock::new();
    let mut b = PlaybackClock::new();
    a.start(1.0, 0.0);
    b.start(1.0, 98765.0);
    assert_eq!(a.elapsed(2.0), b.elapsed(98767.0));
}

#[test]
fn pause_commits_and_freezes() {
    let mut clock = PlaybackClock::new();
    clock.start(0.0, 10.0);
    let committed = clock.pause(12.5);
    assert_eq!(committed, 2.5);
    assert!(!clock.is_running());
    // The hardware clock keeps running; the committed position does not.
    assert_eq!(clock.elapsed(99.0), 2.5);
    assert_eq!(clock.position(), 2.5);
}

#[test]
fn resume_continues_from_committed_position() {
    let mut clock = PlaybackClock::new();
    clock.start(0.0, 10.0);
    let committed = clock.pause(10.5);
    clock.start(committed, 20.0);
    assert_eq!(clock.elapsed(21.0), 1.5);
}

#[test]
fn set_position_seeks_while_detached() {
    let mut clock = PlaybackClock::new();
    clock.set_position(7.25);
    assert_eq!(clock.position(), 7.25);
    clock.set_position(-3.0);
    assert_eq!(clock.position(), 0.0, "negative positions clamp to zero");
}

#[test]
fn reset_returns_to_the_initial_state() {
    let mut clock = PlaybackClock::new();
    clock.start(4.0, 50.0);
    clock.reset();
    assert!(!clock.is_running());
    assert_eq!(clock.position(), 0.0);
}

// ── system clock ────────────────────────────────────────────────────────────

#[test]
fn system_clock_is_monotonic() {
    let clock = SystemClock::new();
    let a = clock.now_seconds();
    let b = clock.now_seconds();
    assert!(b >= a);
    assert!(a >= 0.0);
}

//! Spectrally colored waveform rendering with synchronized playback.
//!
//! The pipeline decodes a WAV asset, plots its amplitude envelope, bakes
//! per-block FFT colors into the stroke, and then replays the asset while a
//! highlight overlay sweeps the baked image in lockstep with the audio
//! hardware clock.

pub mod app;
pub mod asset;
pub mod bake;
pub mod clock;
pub mod color;
pub mod config;
pub mod engine;
pub mod events;
pub mod overlay;
pub mod playback;
pub mod plot;
pub mod preview;
pub mod sink;
pub mod surface;
pub mod term;
pub mod timemap;
pub mod wav;

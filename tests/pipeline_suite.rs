use std::sync::Arc;
use wavebake::asset::{AssetError, AudioAsset};
use wavebake::clock::HardwareClock;
use wavebake::color::Rgba;
use wavebake::config::{parse_color, Config, EngineOptions, OptionsError};
use wavebake::engine::{Engine, EngineError};
use wavebake::events::EngineEvent;
use wavebake::sink::{AudioSink, SinkError};
use wavebake::wav::{decode_wav, write_wav_i16, WavError};
use clap::Parser;

fn config(extra: &[&str]) -> Config {
    let mut args = vec!["wavebake", "in.wav"];
    args.extend_from_slice(extra);
    Config::parse_from(args)
}

fn small_options() -> EngineOptions {
    EngineOptions::from_config(&config(&[
        "--width",
        "64",
        "--height",
        "32",
        "--step",
        "1",
        "--fft-size",
        "512",
    ]))
    .unwrap()
}

/// Sink that plays nothing; pipeline tests only exercise state handover.
struct NullSink;

impl HardwareClock for NullSink {
    fn now_seconds(&self) -> f64 {
        0.0
    }
}

impl AudioSink for NullSink {
    fn start(&mut self, _asset: Arc<AudioAsset>, _offset_seconds: f64) -> Result<(), SinkError> {
        Ok(())
    }

    fn stop(&mut self) {}
}

// ── option validation ───────────────────────────────────────────────────────

#[test]
fn defaults_validate() {
    let options = EngineOptions::from_config(&config(&[])).unwrap();
    assert_eq!(options.width, 800);
    assert_eq!(options.height, 240);
    assert_eq!(options.fft_size, 1024);
    assert_eq!(options.update_interval_ms, 60);
}

#[test]
fn rejects_degenerate_dimensions_and_step() {
    let err = EngineOptions::from_config(&config(&["--width", "0"])).unwrap_err();
    assert_eq!(err, OptionsError::ZeroDimension { field: "width" });
    let err = EngineOptions::from_config(&config(&["--height", "0"])).unwrap_err();
    assert_eq!(err, OptionsError::ZeroDimension { field: "height" });
    let err = EngineOptions::from_config(&config(&["--step", "0"])).unwrap_err();
    assert_eq!(err, OptionsError::ZeroStep);
}

#[test]
fn rejects_bad_fft_sizes() {
    for bad in ["100", "256", "4096", "1000"] {
        let err = EngineOptions::from_config(&config(&["--fft-size", bad])).unwrap_err();
        assert!(matches!(err, OptionsError::BadFftSize(_)), "{bad}");
    }
}

#[test]
fn rejects_out_of_range_color_knobs() {
    let err = EngineOptions::from_config(&config(&["--saturation", "150"])).unwrap_err();
    assert!(matches!(err, OptionsError::PercentOutOfRange { field: "saturation", .. }));
    let err = EngineOptions::from_config(&config(&["--lightness=-1"])).unwrap_err();
    assert!(matches!(err, OptionsError::PercentOutOfRange { field: "lightness", .. }));
    let err = EngineOptions::from_config(&config(&["--hue-scale", "0"])).unwrap_err();
    assert!(matches!(err, OptionsError::BadHueScale(_)));
}

#[test]
fn rejects_zero_update_interval_and_bad_colors() {
    let err = EngineOptions::from_config(&config(&["--update-interval", "0"])).unwrap_err();
    assert_eq!(err, OptionsError::ZeroUpdateInterval);
    let err = EngineOptions::from_config(&config(&["--stroke-color", "red"])).unwrap_err();
    assert!(matches!(err, OptionsError::BadColor { field: "stroke", .. }));
}

#[test]
fn parses_hex_colors() {
    assert_eq!(parse_color("#fff"), Some(Rgba::opaque(255, 255, 255)));
    assert_eq!(parse_color("#102030"), Some(Rgba::opaque(16, 32, 48)));
    assert_eq!(
        parse_color("#10203040"),
        Some(Rgba {
            r: 16,
            g: 32,
            b: 48,
            a: 64
        })
    );
    assert_eq!(parse_color("zzz"), None);
    assert_eq!(parse_color("#12345"), None);
}

// ── asset ───────────────────────────────────────────────────────────────────

#[test]
fn asset_construction_enforces_shape() {
    assert_eq!(AudioAsset::new(vec![], 44_100).unwrap_err(), AssetError::NoChannels);
    assert_eq!(
        AudioAsset::new(vec![vec![]], 44_100).unwrap_err(),
        AssetError::NoFrames
    );
    assert_eq!(
        AudioAsset::new(vec![vec![0.0; 4], vec![0.0; 3]], 44_100).unwrap_err(),
        AssetError::ChannelLengthMismatch {
            expected: 4,
            got: 3
        }
    );
    assert_eq!(
        AudioAsset::mono(vec![0.0; 4], 0).unwrap_err(),
        AssetError::BadSampleRate(0)
    );
}

#[test]
fn asset_mixes_channels_and_zero_pads() {
    let asset = AudioAsset::new(vec![vec![1.0, 0.0], vec![0.0, 0.0]], 8000).unwrap();
    assert_eq!(asset.mean_amplitude(0), 0.5);

    let mut block = [9.0f32; 4];
    asset.mix_block(0, &mut block);
    assert_eq!(block, [0.5, 0.0, 0.0, 0.0]);
}

#[test]
fn asset_maps_extra_output_channels_to_the_last_channel() {
    let asset = AudioAsset::new(vec![vec![0.1], vec![0.7]], 8000).unwrap();
    assert_eq!(asset.frame_sample(0, 0), 0.1);
    assert_eq!(asset.frame_sample(0, 1), 0.7);
    assert_eq!(asset.frame_sample(0, 5), 0.7);
}

// ── WAV codec ───────────────────────────────────────────────────────────────

#[test]
fn wav_round_trips_pcm16() {
    let path = std::env::temp_dir().join(format!("wavebake_rt_{}.wav", std::process::id()));
    let left = vec![0.0f32, 0.5, -0.5, 1.0];
    let right = vec![0.25f32, -0.25, 0.75, -1.0];
    write_wav_i16(&path, 8000, &[left.clone(), right.clone()]).unwrap();

    let asset = wavebake::wav::read_wav(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(asset.channel_count(), 2);
    assert_eq!(asset.sample_rate(), 8000);
    assert_eq!(asset.frame_count(), 4);
    for (a, b) in asset.channel(0).iter().zip(&left) {
        assert!((a - b).abs() < 1e-3, "{a} vs {b}");
    }
    for (a, b) in asset.channel(1).iter().zip(&right) {
        assert!((a - b).abs() < 1e-3, "{a} vs {b}");
    }
}

fn wav_bytes(tag: u16, bits: u16, channels: u16, rate: u32, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(4 + 24 + 8 + data.len() as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&rate.to_le_bytes());
    out.extend_from_slice(&(rate * channels as u32 * bits as u32 / 8).to_le_bytes());
    out.extend_from_slice(&(channels * bits / 8).to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    out
}

#[test]
fn decode_rejects_malformed_and_unsupported_wavs() {
    assert!(matches!(
        decode_wav(b"not a wav at all"),
        Err(WavError::Malformed(_))
    ));
    // Valid header, no chunks.
    assert!(matches!(
        decode_wav(b"RIFF\x04\x00\x00\x00WAVE"),
        Err(WavError::Malformed(_))
    ));
    // 8-bit PCM.
    assert!(matches!(
        decode_wav(&wav_bytes(1, 8, 1, 8000, &[0, 0])),
        Err(WavError::Unsupported { .. })
    ));
    // ADPCM format tag.
    assert!(matches!(
        decode_wav(&wav_bytes(2, 16, 1, 8000, &[0, 0])),
        Err(WavError::Unsupported { .. })
    ));
    // Empty data chunk decodes to an asset with no frames.
    assert!(matches!(
        decode_wav(&wav_bytes(1, 16, 1, 8000, &[])),
        Err(WavError::Asset(AssetError::NoFrames))
    ));
}

#[test]
fn decode_reads_float32_wavs() {
    let mut data = Vec::new();
    for v in [0.5f32, -0.5, 0.0] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    let asset = decode_wav(&wav_bytes(3, 32, 1, 44_100, &data)).unwrap();
    assert_eq!(asset.frame_count(), 3);
    assert_eq!(asset.channel(0), &[0.5, -0.5, 0.0]);
}

// ── engine pipeline ─────────────────────────────────────────────────────────

#[test]
fn pipeline_emits_events_in_stage_order() {
    let mut engine = Engine::new(small_options()).unwrap();
    engine.load_asset(AudioAsset::mono(vec![0.0; 2048], 8000).unwrap());
    engine.render().unwrap();
    engine.bake_blocking().unwrap();

    let events = engine.take_events();
    assert_eq!(
        events,
        vec![
            EngineEvent::CanvasLoaded,
            EngineEvent::SoundLoaded,
            EngineEvent::Rendered,
            EngineEvent::Baked,
        ]
    );
}

#[test]
fn stages_refuse_to_run_out_of_order() {
    let mut engine = Engine::new(small_options()).unwrap();
    assert!(matches!(engine.render(), Err(EngineError::NotReady(_))));
    assert!(matches!(engine.start_bake(), Err(EngineError::NotReady(_))));

    engine.load_asset(AudioAsset::mono(vec![0.0; 512], 8000).unwrap());
    assert!(matches!(engine.start_bake(), Err(EngineError::NotReady(_))));

    // Playback is gated on the baked snapshot.
    engine.render().unwrap();
    let err = engine.into_controller(Box::new(NullSink)).unwrap_err();
    assert!(matches!(err, EngineError::NotReady(_)));
}

#[test]
fn background_bake_completes_and_fires_once() {
    let mut engine = Engine::new(small_options()).unwrap();
    engine.load_asset(AudioAsset::mono(vec![0.1; 8192], 8000).unwrap());
    engine.render().unwrap();
    engine.start_bake().unwrap();
    // Idempotent while running.
    engine.start_bake().unwrap();

    let mut waited = 0;
    while !engine.poll_baked().unwrap() {
        std::thread::sleep(std::time::Duration::from_millis(5));
        waited += 1;
        assert!(waited < 2000, "bake worker never finished");
    }
    assert!(engine.is_baked());
    assert!(engine.poll_baked().unwrap());

    let events = engine.take_events();
    assert_eq!(
        events.iter().filter(|e| **e == EngineEvent::Baked).count(),
        1
    );
}

#[test]
fn load_failure_fires_the_load_failed_event() {
    let mut engine = Engine::new(small_options()).unwrap();
    let err = engine
        .load_wav("/nonexistent/wavebake/input.wav")
        .unwrap_err();
    assert!(matches!(err, EngineError::Load(_)));

    let events = engine.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::LoadFailed { .. })));
}

#[test]
fn baked_pipeline_hands_off_to_playback() {
    let mut engine = Engine::new(small_options()).unwrap();
    engine.load_asset(AudioAsset::mono(vec![0.0; 16_000], 8000).unwrap());
    engine.render().unwrap();
    engine.bake_blocking().unwrap();

    let mut controller = engine.into_controller(Box::new(NullSink)).unwrap();
    assert_eq!(controller.duration_seconds(), 2.0);
    assert_eq!(controller.pixels_per_second(), 32.0);
    // The event backlog crosses the handoff.
    assert_eq!(controller.take_events().len(), 4);
}

#[test]
fn baked_image_exports_as_ppm() {
    let mut engine = Engine::new(small_options()).unwrap();
    engine.load_asset(AudioAsset::mono(vec![0.3; 2048], 8000).unwrap());
    engine.render().unwrap();
    engine.bake_blocking().unwrap();

    let ppm = engine
        .baked_image()
        .unwrap()
        .to_ppm(Rgba::opaque(0, 0, 0));
    let header = b"P6\n64 32\n255\n";
    assert!(ppm.starts_with(header));
    assert_eq!(ppm.len(), header.len() + 64 * 32 * 3);
}

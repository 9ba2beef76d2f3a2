use crate::asset::{AssetError, AudioAsset};
use crate::bake::{BakeError, SpectralColorBaker};
use crate::config::EngineOptions;
use crate::events::{EngineEvent, EventQueue};
use crate::plot::{PlotError, PlotParams, PlotStats, plot_waveform};
use crate::playback::PlaybackController;
use crate::sink::AudioSink;
use crate::surface::{BakedImage, Surface, SurfaceError};
use crate::wav::{WavError, read_wav};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

#[derive(Debug)]
pub enum EngineError {
    /// An operation ran before its prerequisite stage completed. A usage
    /// error; never retried.
    NotReady(&'static str),
    Load(WavError),
    Asset(AssetError),
    Plot(PlotError),
    Bake(BakeError),
    Surface(SurfaceError),
    /// The bake worker disappeared without reporting a result.
    WorkerLost,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady(what) => write!(f, "not ready: {what}"),
            Self::Load(err) => write!(f, "load failed: {err}"),
            Self::Asset(err) => write!(f, "invalid asset: {err}"),
            Self::Plot(err) => write!(f, "plot failed: {err}"),
            Self::Bake(err) => write!(f, "bake failed: {err}"),
            Self::Surface(err) => write!(f, "surface error: {err}"),
            Self::WorkerLost => write!(f, "bake worker exited without a result"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<WavError> for EngineError {
    fn from(err: WavError) -> Self {
        Self::Load(err)
    }
}

impl From<AssetError> for EngineError {
    fn from(err: AssetError) -> Self {
        Self::Asset(err)
    }
}

impl From<PlotError> for EngineError {
    fn from(err: PlotError) -> Self {
        Self::Plot(err)
    }
}

impl From<BakeError> for EngineError {
    fn from(err: BakeError) -> Self {
        Self::Bake(err)
    }
}

impl From<SurfaceError> for EngineError {
    fn from(err: SurfaceError) -> Self {
        Self::Surface(err)
    }
}

type BakeResult = Result<(Surface, BakedImage), BakeError>;

/// The two-stage rendering pipeline: decode, plot, then the offline spectral
/// bake. Playback is gated on the terminal `Baked` notification;
/// `into_controller` is the only way to reach the playback state machine, and
/// it refuses until the snapshot exists.
pub struct Engine {
    options: EngineOptions,
    events: EventQueue,
    /// Absent while the bake worker owns the canvas.
    surface: Option<Surface>,
    asset: Option<Arc<AudioAsset>>,
    baked: Option<BakedImage>,
    rendered: bool,
    bake_rx: Option<Receiver<BakeResult>>,
    bake_worker: Option<JoinHandle<()>>,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Result<Self, EngineError> {
        let surface = Surface::new(options.width, options.height)?;
        let mut events = EventQueue::new();
        events.push(EngineEvent::CanvasLoaded);
        Ok(Self {
            options,
            events,
            surface: Some(surface),
            asset: None,
            baked: None,
            rendered: false,
            bake_rx: None,
            bake_worker: None,
        })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn asset(&self) -> Option<&Arc<AudioAsset>> {
        self.asset.as_ref()
    }

    pub fn is_baked(&self) -> bool {
        self.baked.is_some()
    }

    pub fn baked_image(&self) -> Option<&BakedImage> {
        self.baked.as_ref()
    }

    pub fn pop_event(&mut self) -> Option<EngineEvent> {
        self.events.pop()
    }

    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }

    /// Decode a WAV file into the engine's asset slot. Failure fires the
    /// `LoadFailed` notification once and is not retried.
    pub fn load_wav(&mut self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        match read_wav(path) {
            Ok(asset) => {
                self.load_asset(asset);
                Ok(())
            }
            Err(err) => {
                self.events.push(EngineEvent::LoadFailed {
                    message: err.to_string(),
                });
                Err(EngineError::Load(err))
            }
        }
    }

    pub fn load_asset(&mut self, asset: AudioAsset) {
        self.asset = Some(Arc::new(asset));
        self.events.push(EngineEvent::SoundLoaded);
    }

    /// Stage one: draw the static line plot.
    pub fn render(&mut self) -> Result<PlotStats, EngineError> {
        let asset = self
            .asset
            .as_ref()
            .ok_or(EngineError::NotReady("no decoded asset to render"))?;
        let surface = self
            .surface
            .as_mut()
            .ok_or(EngineError::NotReady("surface is owned by the bake worker"))?;
        let stats = plot_waveform(
            asset,
            surface,
            &PlotParams {
                step: self.options.step,
                color: self.options.stroke_color,
            },
        )?;
        self.rendered = true;
        self.events.push(EngineEvent::Rendered);
        Ok(stats)
    }

    fn baker(&self) -> Result<SpectralColorBaker, EngineError> {
        Ok(SpectralColorBaker::new(
            self.options.fft_size,
            self.options.frequency_by,
            self.options.lookup_table(),
        )?)
    }

    /// Stage two, offline: hand the canvas to a worker thread for the
    /// spectral color pass. Completion arrives through [`Engine::poll_baked`].
    pub fn start_bake(&mut self) -> Result<(), EngineError> {
        if self.baked.is_some() || self.bake_rx.is_some() {
            return Ok(());
        }
        if !self.rendered {
            return Err(EngineError::NotReady("render before baking"));
        }
        let asset = Arc::clone(
            self.asset
                .as_ref()
                .ok_or(EngineError::NotReady("no decoded asset to analyze"))?,
        );
        let baker = self.baker()?;
        let mut surface = self
            .surface
            .take()
            .ok_or(EngineError::NotReady("surface is owned by the bake worker"))?;

        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            let result = baker.bake(&asset, &mut surface);
            let _ = tx.send(result.map(|baked| (surface, baked)));
        });
        self.bake_rx = Some(rx);
        self.bake_worker = Some(worker);
        Ok(())
    }

    /// Check for bake completion. Returns `true` once the snapshot is
    /// installed (fires `Baked` exactly once).
    pub fn poll_baked(&mut self) -> Result<bool, EngineError> {
        if self.baked.is_some() {
            return Ok(true);
        }
        let rx = self
            .bake_rx
            .as_ref()
            .ok_or(EngineError::NotReady("bake not started"))?;
        match rx.try_recv() {
            Ok(Ok((surface, baked))) => {
                self.finish_bake(surface, baked);
                Ok(true)
            }
            Ok(Err(err)) => {
                self.join_worker();
                Err(EngineError::Bake(err))
            }
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => {
                self.join_worker();
                Err(EngineError::WorkerLost)
            }
        }
    }

    /// Run the spectral pass on the calling thread (image export, tests).
    pub fn bake_blocking(&mut self) -> Result<(), EngineError> {
        if self.baked.is_some() {
            return Ok(());
        }
        if self.bake_rx.is_some() {
            // A worker is already running; wait for its terminal message.
            let rx = self.bake_rx.as_ref().ok_or(EngineError::WorkerLost)?;
            let result = rx.recv().map_err(|_| EngineError::WorkerLost)?;
            let (surface, baked) = result?;
            self.finish_bake(surface, baked);
            return Ok(());
        }
        if !self.rendered {
            return Err(EngineError::NotReady("render before baking"));
        }
        let asset = Arc::clone(
            self.asset
                .as_ref()
                .ok_or(EngineError::NotReady("no decoded asset to analyze"))?,
        );
        let baker = self.baker()?;
        let mut surface = self
            .surface
            .take()
            .ok_or(EngineError::NotReady("surface is owned by the bake worker"))?;
        match baker.bake(&asset, &mut surface) {
            Ok(baked) => {
                self.finish_bake(surface, baked);
                Ok(())
            }
            Err(err) => {
                self.surface = Some(surface);
                Err(EngineError::Bake(err))
            }
        }
    }

    fn finish_bake(&mut self, surface: Surface, baked: BakedImage) {
        self.surface = Some(surface);
        self.baked = Some(baked);
        self.bake_rx = None;
        self.join_worker();
        self.events.push(EngineEvent::Baked);
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.bake_worker.take() {
            let _ = worker.join();
        }
    }

    /// Hand the baked canvas to the playback state machine. Refused until
    /// the pipeline reached its terminal `Baked` stage.
    pub fn into_controller(
        mut self,
        sink: Box<dyn AudioSink>,
    ) -> Result<PlaybackController, EngineError> {
        self.join_worker();
        let (Some(asset), Some(surface), Some(baked)) =
            (self.asset, self.surface, self.baked)
        else {
            return Err(EngineError::NotReady("playback requires a baked waveform"));
        };
        Ok(PlaybackController::new(
            asset,
            surface,
            baked,
            sink,
            self.options.overlay_color,
            self.options.on_click,
            self.events,
        ))
    }
}

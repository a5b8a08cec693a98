//! Spectrogram state for one editor session
//!
//! Owns the mono audio, the analysis configuration and the current frame
//! matrix. Any change to audio, FFT size or overlap triggers a full
//! recompute, either inline or on an [`AnalysisWorker`]. A change that
//! cannot be analysed leaves audio, configuration and matrix untouched.

use std::sync::Arc;

use crate::analysis::{
    AudioBuffer, FrameMatrix, SpectrogramConfig, check_sample_rate, clamp_overlap, compute_frames,
};
use crate::error::SpectrogramResult;
use crate::fft::FftSize;
use crate::worker::{AnalysisRequest, AnalysisResult, AnalysisWorker};

/// Mono audio kept for recomputes
#[derive(Debug, Clone)]
struct Source {
    samples: Arc<Vec<f32>>,
    sample_rate: f32,
}

/// Spectrogram engine
pub struct SpectrogramEngine {
    config: SpectrogramConfig,
    source: Option<Source>,
    matrix: Option<Arc<FrameMatrix>>,
    /// Bumped for every recompute request; tags worker results
    generation: u64,
    /// Generation of the installed matrix
    installed: u64,
    /// Latest generation whose outcome has arrived, success or failure
    settled: u64,
    worker: Option<AnalysisWorker>,
}

impl std::fmt::Debug for SpectrogramEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrogramEngine")
            .field("config", &self.config)
            .field("has_audio", &self.source.is_some())
            .field("frames", &self.matrix.as_ref().map(|m| m.frame_count()))
            .field("generation", &self.generation)
            .field("background", &self.worker.is_some())
            .finish()
    }
}

impl SpectrogramEngine {
    /// Engine that analyses on the calling thread
    pub fn new(config: SpectrogramConfig) -> Self {
        Self {
            config: SpectrogramConfig::new(config.fft_size, config.overlap),
            source: None,
            matrix: None,
            generation: 0,
            installed: 0,
            settled: 0,
            worker: None,
        }
    }

    /// Engine that analyses on a background thread
    pub fn with_worker(config: SpectrogramConfig) -> SpectrogramResult<Self> {
        let mut engine = Self::new(config);
        engine.worker = Some(AnalysisWorker::spawn()?);
        Ok(engine)
    }

    pub fn config(&self) -> &SpectrogramConfig {
        &self.config
    }

    pub fn fft_size(&self) -> FftSize {
        self.config.fft_size
    }

    pub fn overlap(&self) -> f32 {
        self.config.overlap
    }

    /// Current matrix, if analysis has completed
    pub fn matrix(&self) -> Option<&Arc<FrameMatrix>> {
        self.matrix.as_ref()
    }

    /// Generation of the most recent request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_audio(&self) -> bool {
        self.source.is_some()
    }

    /// Generation of the installed matrix; changes whenever the matrix does
    pub fn matrix_generation(&self) -> u64 {
        self.installed
    }

    /// A background recompute has been requested and has not reported back
    pub fn is_pending(&self) -> bool {
        self.settled != self.generation
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Inputs
    // ─────────────────────────────────────────────────────────────────────────────

    /// Replace the audio source and recompute
    pub fn set_audio(&mut self, audio: &AudioBuffer) -> SpectrogramResult<()> {
        let source = Source {
            samples: Arc::new(audio.to_mono()),
            sample_rate: audio.sample_rate,
        };
        self.request(&source, self.config)?;
        self.source = Some(source);
        Ok(())
    }

    /// Change the FFT size. Rejects sizes outside the supported set and
    /// keeps the previous size.
    pub fn set_fft_size(&mut self, size: usize) -> SpectrogramResult<()> {
        let size = FftSize::try_from(size).inspect_err(|e| log::warn!("{}", e))?;
        if size == self.config.fft_size {
            return Ok(());
        }
        self.reconfigure(SpectrogramConfig {
            fft_size: size,
            ..self.config
        })
    }

    /// Change the overlap ratio (clamped to [0, 0.95]) and recompute
    pub fn set_overlap(&mut self, overlap: f32) -> SpectrogramResult<()> {
        let overlap = clamp_overlap(overlap);
        if overlap == self.config.overlap {
            return Ok(());
        }
        self.reconfigure(SpectrogramConfig {
            overlap,
            ..self.config
        })
    }

    /// Drop audio and matrix
    pub fn clear(&mut self) {
        self.source = None;
        self.matrix = None;
        self.generation += 1;
        self.installed = self.generation;
        self.settled = self.generation;
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Analysis
    // ─────────────────────────────────────────────────────────────────────────────

    fn reconfigure(&mut self, config: SpectrogramConfig) -> SpectrogramResult<()> {
        if let Some(source) = self.source.clone() {
            self.request(&source, config)?;
        }
        self.config = config;
        Ok(())
    }

    /// Start a recompute. On error nothing about the engine has changed.
    fn request(&mut self, source: &Source, config: SpectrogramConfig) -> SpectrogramResult<()> {
        let next = self.generation + 1;

        match &self.worker {
            Some(worker) => {
                check_sample_rate(source.sample_rate)?;
                worker.submit(AnalysisRequest {
                    generation: next,
                    samples: Arc::clone(&source.samples),
                    sample_rate: source.sample_rate,
                    config,
                })?;
                self.generation = next;
            }
            None => {
                let matrix = compute_frames(&source.samples, source.sample_rate, &config)?;
                self.matrix = Some(Arc::new(matrix));
                self.generation = next;
                self.installed = next;
                self.settled = next;
            }
        }
        Ok(())
    }

    /// Install a finished background result. Returns true when the matrix
    /// changed.
    pub fn poll(&mut self) -> bool {
        match self.worker.as_ref().and_then(AnalysisWorker::try_recv) {
            Some(outcome) => self.settle(outcome),
            None => false,
        }
    }

    /// Block until the latest background request reports back and install
    /// it. Returns true when the matrix changed.
    pub fn wait(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        match self.worker.as_ref().and_then(AnalysisWorker::wait) {
            Some(outcome) => self.settle(outcome),
            None => {
                log::warn!("Spectrogram worker stopped before reporting");
                self.settled = self.generation;
                false
            }
        }
    }

    fn settle(&mut self, outcome: SpectrogramResult<AnalysisResult>) -> bool {
        match outcome {
            Ok(result) if result.generation == self.generation => {
                self.matrix = Some(result.matrix);
                self.installed = result.generation;
                self.settled = result.generation;
                true
            }
            Ok(_) => false,
            Err(e) => {
                log::warn!("Spectrogram recompute failed, keeping previous matrix: {}", e);
                self.settled = self.generation;
                false
            }
        }
    }
}

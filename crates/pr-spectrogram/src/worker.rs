//! Background analysis
//!
//! A single worker thread runs full recomputes. Requests travel over one
//! crossbeam channel and outcomes come back over another. Only the newest
//! request is ever analysed, and every analysed request reports back,
//! failures included, so a waiting caller always wakes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::analysis::{FrameMatrix, SpectrogramConfig, compute_frames};
use crate::error::{SpectrogramError, SpectrogramResult};

/// One analysis job
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub generation: u64,
    pub samples: Arc<Vec<f32>>,
    pub sample_rate: f32,
    pub config: SpectrogramConfig,
}

/// Finished analysis
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub generation: u64,
    pub matrix: Arc<FrameMatrix>,
}

/// What the worker sends back for an analysed request
struct Completed {
    generation: u64,
    outcome: SpectrogramResult<Arc<FrameMatrix>>,
}

impl Completed {
    fn into_result(self) -> SpectrogramResult<AnalysisResult> {
        let generation = self.generation;
        self.outcome
            .map(|matrix| AnalysisResult { generation, matrix })
    }
}

/// Worker thread handle
pub struct AnalysisWorker {
    requests: Option<Sender<AnalysisRequest>>,
    results: Receiver<Completed>,
    latest: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl AnalysisWorker {
    /// Spawn the worker thread
    pub fn spawn() -> SpectrogramResult<Self> {
        let (request_tx, request_rx) = unbounded::<AnalysisRequest>();
        let (result_tx, result_rx) = unbounded::<Completed>();
        let latest = Arc::new(AtomicU64::new(0));

        let handle = thread::Builder::new()
            .name("spectrogram-analysis".into())
            .spawn({
                let latest = Arc::clone(&latest);
                move || run(request_rx, result_tx, latest)
            })
            .map_err(|_| SpectrogramError::WorkerDisconnected)?;

        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            latest,
            handle: Some(handle),
        })
    }

    /// Queue a recompute. Supersedes anything queued or running.
    pub fn submit(&self, request: AnalysisRequest) -> SpectrogramResult<()> {
        self.latest.fetch_max(request.generation, Ordering::AcqRel);
        self.requests
            .as_ref()
            .ok_or(SpectrogramError::WorkerDisconnected)?
            .send(request)
            .map_err(|_| SpectrogramError::WorkerDisconnected)
    }

    /// Take the outcome of the newest request if it has arrived.
    ///
    /// Outcomes of superseded requests are discarded on the way.
    pub fn try_recv(&self) -> Option<SpectrogramResult<AnalysisResult>> {
        let mut newest = None;
        for completed in self.results.try_iter() {
            if self.is_latest(&completed) {
                newest = Some(completed.into_result());
            }
        }
        newest
    }

    /// Block until the newest request reports back.
    ///
    /// Returns `None` only when the worker thread is gone. Call it only
    /// while a submitted request has not been collected yet.
    pub fn wait(&self) -> Option<SpectrogramResult<AnalysisResult>> {
        loop {
            let completed = self.results.recv().ok()?;
            if self.is_latest(&completed) {
                return Some(completed.into_result());
            }
        }
    }

    fn is_latest(&self, completed: &Completed) -> bool {
        let latest = self.latest.load(Ordering::Acquire);
        if completed.generation != latest {
            log::debug!("Discarding stale spectrogram generation {}", completed.generation);
            return false;
        }
        true
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        // Closing the channel ends the loop
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(requests: Receiver<AnalysisRequest>, results: Sender<Completed>, latest: Arc<AtomicU64>) {
    while let Ok(first) = requests.recv() {
        // Collapse the backlog to its newest entry
        let request = requests.try_iter().last().unwrap_or(first);
        if request.generation < latest.load(Ordering::Acquire) {
            continue;
        }

        let outcome = compute_frames(&request.samples, request.sample_rate, &request.config)
            .map(Arc::new);
        if let Err(e) = &outcome {
            log::warn!("Spectrogram analysis failed: {}", e);
        }

        // The receiver is gone only while the handle is being dropped
        let _ = results.send(Completed {
            generation: request.generation,
            outcome,
        });
    }
    log::debug!("Spectrogram analysis worker stopped");
}

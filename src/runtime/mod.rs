//! Model lifecycle and inference orchestration
//!
//! [`ModelOperations`] owns the whole chain: resolve the descriptor and
//! weight suppliers (each at most once), assemble in-memory artifacts,
//! hand them to the inference engine, and rank the scored output. Loading
//! is lazy; concurrent callers arriving before the first load completes
//! all await the same in-flight load instead of triggering duplicate
//! engine initialization.

use crate::device::{self, Device};
use crate::error::{DetectError, DetectResult};
use crate::model::{self, ModelArtifacts, ModelDescriptor};
use crate::ranker::{self, RankerConfig, ScoredCandidate};
use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use tokio::sync::Mutex;

pub mod inference;

/// Async supplier for the model descriptor, injected by the embedder.
pub type DescriptorLoader =
    Box<dyn Fn() -> BoxFuture<'static, DetectResult<ModelDescriptor>> + Send + Sync>;

/// Async supplier for the raw weight buffer, injected by the embedder.
pub type WeightsLoader = Box<dyn Fn() -> BoxFuture<'static, DetectResult<Bytes>> + Send + Sync>;

/// An inference engine able to turn assembled artifacts into a loaded
/// model. Consumed as a black box; [`inference::OnnxEngine`] is the
/// bundled implementation.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    async fn load(
        &self,
        artifacts: ModelArtifacts,
        device: Device,
    ) -> DetectResult<Box<dyn LoadedModel>>;
}

/// A loaded model handle. Dropping it releases the engine's resources.
#[async_trait]
pub trait LoadedModel: Send + Sync {
    /// Forward pass over a single-element batch of raw text. Returns one
    /// candidate per class the model was trained on, in the engine's raw
    /// output order.
    async fn execute(&mut self, content: &str) -> DetectResult<Vec<ScoredCandidate>>;
}

/// Content preprocessing knobs exposed to embedders.
#[derive(Debug, Clone)]
pub struct DetectOptions {
    /// Inputs shorter than this (in chars) carry too little signal to
    /// classify and yield an empty result.
    pub min_content_size: usize,
    /// Inputs longer than this (in chars) are truncated before scoring;
    /// the engine's computation graph depth scales with input length and
    /// becomes unstable on very large inputs.
    pub max_content_size: usize,
    /// Normalize CRLF to LF before scoring. The model was trained
    /// predominantly on LF text, so mixed line endings skew scores.
    pub normalize_newline: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            min_content_size: 20,
            max_content_size: 100_000,
            normalize_newline: true,
        }
    }
}

#[derive(Default)]
struct ModelState {
    descriptor: Option<ModelDescriptor>,
    weights: Option<Bytes>,
    model: Option<Box<dyn LoadedModel>>,
}

/// Lazy-loading front door for language identification.
///
/// One instance shares a single engine-loaded model across all calls.
/// Suppliers are resolved at most once for the instance's lifetime;
/// [`ModelOperations::dispose`] releases everything, after which the next
/// call performs a full reload (suppliers invoked again).
pub struct ModelOperations {
    descriptor_loader: DescriptorLoader,
    weights_loader: WeightsLoader,
    engine: Box<dyn InferenceEngine>,
    options: DetectOptions,
    ranker_config: RankerConfig,
    state: Mutex<ModelState>,
}

impl ModelOperations {
    /// Create operations backed by the bundled ONNX engine with default
    /// options.
    pub fn new(descriptor_loader: DescriptorLoader, weights_loader: WeightsLoader) -> Self {
        Self::with_engine(
            descriptor_loader,
            weights_loader,
            Box::new(inference::OnnxEngine::new()),
        )
    }

    /// Create operations with an injected engine.
    pub fn with_engine(
        descriptor_loader: DescriptorLoader,
        weights_loader: WeightsLoader,
        engine: Box<dyn InferenceEngine>,
    ) -> Self {
        Self {
            descriptor_loader,
            weights_loader,
            engine,
            options: DetectOptions::default(),
            ranker_config: RankerConfig::default(),
            state: Mutex::new(ModelState::default()),
        }
    }

    /// Override preprocessing options.
    pub fn with_options(mut self, options: DetectOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the disambiguation configuration used by [`detect`].
    ///
    /// [`detect`]: ModelOperations::detect
    pub fn with_ranker_config(mut self, config: RankerConfig) -> Self {
        self.ranker_config = config;
        self
    }

    /// Run the model over `content` and return all candidates sorted
    /// descending by confidence. Inputs below the minimum size yield an
    /// empty list, never an error.
    pub async fn run_model(&self, content: &str) -> DetectResult<Vec<ScoredCandidate>> {
        let Some(prepared) = prepare_content(content, &self.options) else {
            return Ok(Vec::new());
        };

        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;
        let model = state
            .model
            .as_mut()
            .ok_or_else(|| DetectError::load("model vanished after load"))?;

        let mut results = model.execute(&prepared).await?;
        ranker::sort_by_confidence(&mut results);
        Ok(results)
    }

    /// Run the model and apply the disambiguation heuristic, returning
    /// the short list of decided language ids.
    pub async fn detect(&self, content: &str) -> DetectResult<Vec<String>> {
        let results = self.run_model(content).await?;
        Ok(ranker::rank(&results, &self.ranker_config))
    }

    /// Release the loaded model and all cached artifacts. Safe to call
    /// when nothing is loaded. The instance stays usable: the next call
    /// re-invokes both suppliers and reloads the engine.
    ///
    /// Must not race an in-flight inference call; the internal lock makes
    /// this wait for one rather than corrupt it.
    pub async fn dispose(&self) {
        let mut state = self.state.lock().await;
        state.model = None;
        state.descriptor = None;
        state.weights = None;
    }

    /// Idempotent load. Holding the state lock across the whole load is
    /// what makes concurrent first callers await a single initialization.
    async fn ensure_loaded(&self, state: &mut ModelState) -> DetectResult<()> {
        if state.model.is_some() {
            return Ok(());
        }

        // Fixed CPU backend: deterministic, portable, no accelerator
        // initialization in headless environments.
        let device = device::cpu();
        if !device.is_available() {
            return Err(DetectError::backend(format!(
                "device {device} is not available"
            )));
        }

        if state.descriptor.is_none() {
            state.descriptor = Some((self.descriptor_loader)().await?);
        }
        if state.weights.is_none() {
            state.weights = Some((self.weights_loader)().await?);
        }

        let (descriptor, weights) = match (&state.descriptor, &state.weights) {
            (Some(d), Some(w)) => (d, w.clone()),
            _ => return Err(DetectError::load("model suppliers resolved to nothing")),
        };

        let artifacts = model::assemble_artifacts(descriptor, weights)?;
        log::debug!("model artifacts assembled, loading engine on {device}");
        state.model = Some(self.engine.load(artifacts, device).await?);
        Ok(())
    }
}

/// Apply the preprocessing contract: minimum-size gate, newline
/// normalization, character truncation. Returns `None` for low-signal
/// input.
fn prepare_content(content: &str, options: &DetectOptions) -> Option<String> {
    if content.chars().count() < options.min_content_size {
        return None;
    }

    let mut text = if options.normalize_newline {
        content.replace("\r\n", "\n")
    } else {
        content.to_owned()
    };

    if let Some((idx, _)) = text.char_indices().nth(options.max_content_size) {
        text.truncate(idx);
    }

    Some(text)
}

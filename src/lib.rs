//! # langid-onnx — Programming-language identification
//!
//! A thin client library that identifies the most likely programming or
//! markup language of a text snippet. The trained classifier is an opaque
//! artifact supplied by the embedder (a JSON descriptor plus a raw weight
//! buffer, both delivered through injected async suppliers); execution is
//! delegated to ONNX Runtime on a fixed CPU backend. What lives here is
//! the in-memory model adapter, the preprocessing contract, and the
//! confidence-ranking heuristic that collapses near-tied candidates into
//! a short, high-precision answer.
//!
//! ```no_run
//! use langid_onnx::{loaders, ModelOperations};
//!
//! # async fn example() -> langid_onnx::DetectResult<()> {
//! let (descriptor_loader, weights_loader) = loaders::model_dir_loaders("model");
//! let ops = ModelOperations::new(descriptor_loader, weights_loader);
//!
//! let ranked = ops.run_model("fn main() { println!(\"hello\"); }").await?;
//! let decided = ops.detect("fn main() { println!(\"hello\"); }").await?;
//! ops.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod error;
pub mod loaders;
pub mod model;
pub mod ranker;
pub mod runtime;

// Re-exports
pub use device::{cpu, cpu_with_threads, Device};
pub use error::{DetectError, DetectResult};
pub use model::{assemble_artifacts, ModelArtifacts, ModelDescriptor, WeightGroup, WeightSpec};
pub use ranker::{rank, sort_by_confidence, EquivalenceSet, RankerConfig, ScoredCandidate};
pub use runtime::{
    inference::{OnnxEngine, OnnxModel},
    DescriptorLoader, DetectOptions, InferenceEngine, LoadedModel, ModelOperations, WeightsLoader,
};

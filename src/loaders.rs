//! Convenience filesystem suppliers
//!
//! The core never reads from disk itself; descriptor and weights arrive
//! through injected async suppliers. These helpers build the common pair
//! of suppliers for a model published as `model.json` plus a single
//! pre-concatenated weight shard in one directory.

use crate::error::DetectError;
use crate::model::ModelDescriptor;
use crate::runtime::{DescriptorLoader, WeightsLoader};
use bytes::Bytes;
use futures::FutureExt;
use std::path::{Path, PathBuf};

/// Default descriptor filename inside a model directory.
pub const MODEL_JSON: &str = "model.json";

/// Default weight shard filename inside a model directory.
pub const WEIGHTS_BIN: &str = "group1-shard1of1.bin";

/// Build descriptor + weights suppliers reading `model.json` and
/// `group1-shard1of1.bin` from `dir`.
pub fn model_dir_loaders(dir: impl AsRef<Path>) -> (DescriptorLoader, WeightsLoader) {
    let dir = dir.as_ref().to_path_buf();
    (
        descriptor_file_loader(dir.join(MODEL_JSON)),
        weights_file_loader(dir.join(WEIGHTS_BIN)),
    )
}

/// Supplier that reads and parses a descriptor JSON file.
pub fn descriptor_file_loader(path: impl Into<PathBuf>) -> DescriptorLoader {
    let path = path.into();
    Box::new(move || {
        let path = path.clone();
        async move {
            let raw = tokio::fs::read(&path).await.map_err(|e| {
                DetectError::load(format!("failed to read {}: {e}", path.display()))
            })?;
            let descriptor: ModelDescriptor = serde_json::from_slice(&raw).map_err(|e| {
                DetectError::load(format!("failed to parse {}: {e}", path.display()))
            })?;
            Ok(descriptor)
        }
        .boxed()
    })
}

/// Supplier that reads a raw weight blob.
pub fn weights_file_loader(path: impl Into<PathBuf>) -> WeightsLoader {
    let path = path.into();
    Box::new(move || {
        let path = path.clone();
        async move {
            let raw = tokio::fs::read(&path).await.map_err(|e| {
                DetectError::load(format!("failed to read {}: {e}", path.display()))
            })?;
            Ok(Bytes::from(raw))
        }
        .boxed()
    })
}

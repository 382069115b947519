//! Model descriptor and in-memory artifact assembly
//!
//! A trained language-identification model arrives as two pieces: a JSON
//! descriptor (topology, provenance, weight manifest) and a single raw
//! weight buffer with all tensor data pre-concatenated in manifest order.
//! [`assemble_artifacts`] fabricates the artifact shape the engine's
//! manifest-driven loader would have produced, without touching a
//! filesystem or network path.

use crate::error::{DetectError, DetectResult};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

/// Structured description of a model's computation graph and where its
/// weights live. Field names follow the descriptor's camelCase wire format.
///
/// A descriptor missing both `modelTopology` and `weightsManifest` is
/// structurally invalid and is rejected at assembly time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    #[serde(default)]
    pub model_topology: Option<Value>,
    #[serde(default)]
    pub weights_manifest: Option<Vec<WeightGroup>>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub generated_by: Option<String>,
    #[serde(default)]
    pub converted_by: Option<String>,
    #[serde(default)]
    pub training_config: Option<Value>,
    #[serde(default)]
    pub signature: Option<Value>,
    #[serde(default)]
    pub user_defined_metadata: Option<Value>,
    #[serde(default)]
    pub model_initializer: Option<Value>,
}

/// One group of the weight manifest: the shard paths the weights were
/// originally published under, and the tensor specs stored in them.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightGroup {
    #[serde(default)]
    pub paths: Vec<String>,
    pub weights: Vec<WeightSpec>,
}

/// Shape and dtype of a single weight tensor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeightSpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: String,
}

/// Fully assembled in-memory model artifacts, ready for an inference
/// engine to consume. Optional fields absent in the source descriptor stay
/// `None` rather than becoming null placeholders.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub model_topology: Option<Value>,
    pub format: Option<String>,
    pub generated_by: Option<String>,
    pub converted_by: Option<String>,
    pub training_config: Option<Value>,
    pub signature: Option<Value>,
    pub user_defined_metadata: Option<Value>,
    pub model_initializer: Option<Value>,
    /// Manifest weight specs flattened into a single ordered sequence.
    pub weight_specs: Option<Vec<WeightSpec>>,
    /// The raw weight buffer, shared by reference with the engine. Must
    /// not be mutated after hand-off.
    pub weight_data: Option<Bytes>,
}

/// Assemble engine-ready artifacts from a descriptor and its weight buffer.
///
/// Topology, format and provenance metadata are copied over verbatim. When
/// a weight manifest is present, the per-group weight-spec lists are
/// flattened into one ordered sequence and paired with the buffer as-is:
/// the buffer is assumed pre-concatenated in manifest order, so no
/// offset-splitting happens here.
pub fn assemble_artifacts(
    descriptor: &ModelDescriptor,
    weights: Bytes,
) -> DetectResult<ModelArtifacts> {
    if descriptor.model_topology.is_none() && descriptor.weights_manifest.is_none() {
        return Err(DetectError::load(
            "the model contains neither model topology nor a manifest for weights",
        ));
    }

    let mut artifacts = ModelArtifacts {
        model_topology: descriptor.model_topology.clone(),
        format: descriptor.format.clone(),
        generated_by: descriptor.generated_by.clone(),
        converted_by: descriptor.converted_by.clone(),
        training_config: descriptor.training_config.clone(),
        signature: descriptor.signature.clone(),
        user_defined_metadata: descriptor.user_defined_metadata.clone(),
        model_initializer: descriptor.model_initializer.clone(),
        weight_specs: None,
        weight_data: None,
    };

    if let Some(manifest) = &descriptor.weights_manifest {
        let specs: Vec<WeightSpec> = manifest
            .iter()
            .flat_map(|group| group.weights.iter().cloned())
            .collect();
        artifacts.weight_specs = Some(specs);
        artifacts.weight_data = Some(weights);
    }

    Ok(artifacts)
}

impl ModelArtifacts {
    /// Class labels declared by the descriptor, in output-index order.
    ///
    /// The language-identification model reports one probability per class;
    /// the class names ride along in `userDefinedMetadata.languages`.
    pub fn class_labels(&self) -> Option<Vec<String>> {
        let languages = self.user_defined_metadata.as_ref()?.get("languages")?;
        let labels: Vec<String> = languages
            .as_array()?
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect();
        if labels.is_empty() {
            None
        } else {
            Some(labels)
        }
    }
}

//! ONNX Runtime engine for language identification
//!
//! Consumes in-memory [`ModelArtifacts`]: the session is built straight
//! from the weight buffer (`commit_from_memory`), so no filesystem or
//! network path is touched inside this component. Class labels come from
//! the descriptor's user metadata; the model emits one probability per
//! class.

use crate::device::Device;
use crate::error::{DetectError, DetectResult};
use crate::model::ModelArtifacts;
use crate::ranker::ScoredCandidate;
use crate::runtime::{InferenceEngine, LoadedModel};
use async_trait::async_trait;
use std::collections::HashMap;

use ndarray::{ArrayD, IxDyn};

use ort::execution_providers::{CPUExecutionProvider, ExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value as OrtValue;

/// Engine factory for the bundled ONNX Runtime backend.
#[derive(Debug, Default)]
pub struct OnnxEngine {
    _private: (),
}

impl OnnxEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InferenceEngine for OnnxEngine {
    async fn load(
        &self,
        artifacts: ModelArtifacts,
        device: Device,
    ) -> DetectResult<Box<dyn LoadedModel>> {
        if !device.is_available() {
            return Err(DetectError::backend(format!(
                "device {device} is not available"
            )));
        }

        let labels = artifacts.class_labels().ok_or_else(|| {
            DetectError::load("descriptor metadata does not declare class labels")
        })?;

        let model_bytes = artifacts
            .weight_data
            .as_ref()
            .ok_or_else(|| DetectError::load("descriptor carries no weight data"))?;

        let mut builder = Session::builder()
            .map_err(|e| DetectError::backend(format!("failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| DetectError::backend(format!("failed to set optimization level: {e}")))?
            .with_intra_threads(device.threads())
            .map_err(|e| DetectError::backend(format!("failed to set thread count: {e}")))?;

        let ep = CPUExecutionProvider::default();
        ep.register(&mut builder)
            .map_err(|e| DetectError::backend(format!("failed to register CPU provider: {e}")))?;

        let session = builder
            .commit_from_memory(model_bytes)
            .map_err(|e| DetectError::load(format!("failed to load model from memory: {e}")))?;

        OnnxModel::from_session(session, labels).map(|m| Box::new(m) as Box<dyn LoadedModel>)
    }
}

/// A loaded ONNX session plus the label vocabulary it scores against.
pub struct OnnxModel {
    session: Session,
    input_name: String,
    output_name: String,
    labels: Vec<String>,
}

impl OnnxModel {
    fn from_session(session: Session, labels: Vec<String>) -> DetectResult<Self> {
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| DetectError::load("model graph declares no inputs"))?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| DetectError::load("model graph declares no outputs"))?;

        log::info!(
            "ONNX session initialized: input='{input_name}', output='{output_name}', {} classes",
            labels.len()
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            labels,
        })
    }

    /// Encode content as a `[1, len]` i64 tensor of UTF-8 byte values,
    /// the single-element batch shape the classifier expects.
    fn content_tensor(
        &self,
        content: &str,
    ) -> DetectResult<ort::value::Value<ort::value::DynValueTypeMarker>> {
        let bytes: Vec<i64> = content.bytes().map(i64::from).collect();
        let len = bytes.len();
        let array = ArrayD::<i64>::from_shape_vec(IxDyn(&[1, len]), bytes)
            .map_err(|e| DetectError::inference(format!("failed to shape input tensor: {e}")))?;

        Ok(OrtValue::from_array(array)
            .map_err(|e| DetectError::inference(format!("failed to create input value: {e}")))?
            .into_dyn())
    }
}

#[async_trait]
impl LoadedModel for OnnxModel {
    async fn execute(&mut self, content: &str) -> DetectResult<Vec<ScoredCandidate>> {
        let tensor = self.content_tensor(content)?;

        let mut inputs = HashMap::new();
        inputs.insert(self.input_name.clone(), tensor);

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| DetectError::inference(format!("forward pass failed: {e}")))?;

        let probabilities = outputs
            .get(&self.output_name)
            .ok_or_else(|| {
                DetectError::inference(format!("model produced no '{}' output", self.output_name))
            })?
            .try_extract_tensor::<f32>()
            .map(|(_, data)| data.to_vec())
            .map_err(|e| DetectError::inference(format!("failed to extract scores: {e}")))?;

        if probabilities.len() != self.labels.len() {
            return Err(DetectError::inference(format!(
                "model scored {} classes but descriptor declares {}",
                probabilities.len(),
                self.labels.len()
            )));
        }

        Ok(self
            .labels
            .iter()
            .zip(probabilities)
            .map(|(label, confidence)| ScoredCandidate::new(label.clone(), confidence))
            .collect())
    }
}

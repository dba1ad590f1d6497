// ============================================================
// Layer 5: Inferencer
// ============================================================
// The burn-backed ImageClassifier. Built once from the model
// artifact, then shared by every request through an Arc.
//
// The module sits behind a Mutex: forward passes are serialized,
// while decoding and preprocessing in the callers stay concurrent.

use burn::prelude::*;
use std::sync::Mutex;

use crate::domain::{
    image::ImageTensor,
    traits::{ImageClassifier, InferenceError},
};
use crate::infra::checkpoint::{CheckpointManager, ModelLoadError};
use crate::ml::model::CatDogNet;

type InferBackend = burn::backend::NdArray;
type InferDevice  = burn::backend::ndarray::NdArrayDevice;

pub struct BurnClassifier {
    model:      Mutex<CatDogNet<InferBackend>>,
    image_size: usize,
    device:     InferDevice,
}

impl BurnClassifier {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self, ModelLoadError> {
        let device       = InferDevice::default();
        let (model, cfg) = ckpt_manager.load_model::<InferBackend>(&device)?;
        tracing::info!("Classifier ready ({}x{} input)", cfg.image_size, cfg.image_size);
        Ok(Self::new(model, cfg.image_size))
    }

    pub fn new(model: CatDogNet<InferBackend>, image_size: usize) -> Self {
        Self {
            model: Mutex::new(model),
            image_size,
            device: InferDevice::default(),
        }
    }
}

impl ImageClassifier for BurnClassifier {
    fn dog_probability(&self, image: &ImageTensor) -> Result<f32, InferenceError> {
        let expected = [1, ImageTensor::CHANNELS, self.image_size, self.image_size];
        let actual   = image.shape();
        if actual != expected || image.len() != expected.iter().product::<usize>() {
            return Err(InferenceError::ShapeMismatch { expected, actual });
        }

        let input = Tensor::<InferBackend, 1>::from_floats(image.data.as_slice(), &self.device)
            .reshape(expected);

        let output = {
            let model = self
                .model
                .lock()
                .map_err(|_| InferenceError::Backend("model lock poisoned".to_string()))?;
            model.forward_probability(input)
        };

        let values = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| InferenceError::Backend(format!("{e:?}")))?;
        let p = values
            .first()
            .copied()
            .ok_or_else(|| InferenceError::Backend("empty model output".to_string()))?;

        if !p.is_finite() {
            return Err(InferenceError::InvalidOutput(p));
        }
        Ok(p)
    }

    fn input_size(&self) -> usize {
        self.image_size
    }
}

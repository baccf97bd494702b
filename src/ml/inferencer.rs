// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{anyhow, bail, Result};
use burn::prelude::*;

use crate::domain::digit::{n_in, Prediction};
use crate::domain::traits::DigitClassifier;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{DigitNet, DigitNetConfig};

/// A trained network bound to the device it runs on.
pub struct Classifier<B: Backend> {
    model:  DigitNet<B>,
    device: B::Device,
}

impl<B: Backend> Classifier<B> {
    pub fn new(model: DigitNet<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Rebuild the architecture from the saved config, then load weights
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        let model = DigitNetConfig::mnist(cfg.hidden).init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from '{}'", ckpt_manager.dir().display());
        Ok(Self { model, device })
    }

    pub fn model(&self) -> &DigitNet<B> {
        &self.model
    }

    pub fn predict(&self, pixels: &[f32]) -> Result<Prediction> {
        if pixels.len() != n_in() {
            bail!("Expected {} pixels, got {}", n_in(), pixels.len());
        }

        let input = Tensor::<B, 1>::from_floats(pixels, &self.device).reshape([1, n_in()]);

        let probabilities: Vec<f32> = self
            .model
            .probabilities(input)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read model output: {e:?}"))?;

        let prediction = Prediction::from_probabilities(probabilities)?;
        tracing::debug!(
            "Predicted {} with p={:.4}",
            prediction.digit,
            prediction.confidence()
        );
        Ok(prediction)
    }
}

impl<B: Backend> DigitClassifier for Classifier<B> {
    fn classify(&self, pixels: &[f32]) -> Result<Prediction> {
        self.predict(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn classifier() -> Classifier<NdArray> {
        let device = Default::default();
        let model = DigitNetConfig::mnist(8).init(&device);
        Classifier::new(model, device)
    }

    #[test]
    fn test_prediction_has_ten_probabilities() {
        let p = classifier().classify(&[0.5; 784]).unwrap();
        assert_eq!(p.probabilities.len(), 10);
        assert!(p.digit < 10);
        let sum: f32 = p.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_wrong_input_size_is_rejected() {
        assert!(classifier().classify(&[0.5; 100]).is_err());
    }
}

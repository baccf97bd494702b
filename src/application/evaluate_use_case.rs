// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores a saved checkpoint against the MNIST test split and
// prints the per-class report. Never trains.

use anyhow::Result;
use burn::prelude::*;

use crate::application::train_use_case::TrainConfig;
use crate::data::dataset::MnistDataset;
use crate::domain::{evaluation::Evaluation, traits::ImageSource};
use crate::ml::{evaluator::evaluate, inferencer::Classifier};

pub struct EvaluateUseCase {
    config: TrainConfig,
}

impl EvaluateUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: Backend>(&self, device: B::Device) -> Result<Evaluation> {
        let classifier: Classifier<B> =
            Classifier::from_checkpoint(&self.config.checkpoint(), device.clone())?;

        let images = self.config.store().testing()?.load_all()?;
        tracing::info!("Evaluating on {} test images", images.len());

        let (evaluation, loss) = evaluate(
            classifier.model(),
            MnistDataset::new(images),
            self.config.batch_size,
            &device,
        )?;

        println!("Test loss: {loss:.6}");
        println!("{}", evaluation.stats());
        Ok(evaluation)
    }
}

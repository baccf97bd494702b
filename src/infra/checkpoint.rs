// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the trained network.
//
// What gets saved:
//   1. Model weights (model.mpk.gz) — all learned parameters
//   2. train_config.json            — hyperparameters, including
//                                     the hidden layer size
//
// The config is needed to rebuild a network of the right shape
// before the weights can be loaded into it.
//
// Weights are written by Burn's named MessagePack recorder with
// gzip compression at full precision.
//
// File layout:
//   model/
//     model.mpk.gz
//     train_config.json
//     metrics.csv          ← written by MetricsLogger
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::DigitNet;

type ModelRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

const MODEL_FILE:  &str = "model";
const CONFIG_FILE: &str = "train_config.json";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the weights file, extension included
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(format!("{MODEL_FILE}.mpk.gz"))
    }

    /// True when both the weights and their config are on disk
    pub fn has_model(&self) -> bool {
        self.model_path().is_file() && self.dir.join(CONFIG_FILE).is_file()
    }

    pub fn save_model<B: Backend>(&self, model: &DigitNet<B>) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        // The recorder appends the extension itself
        let path = self.dir.join(MODEL_FILE);
        ModelRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;

        tracing::info!("Saved model to '{}'", self.model_path().display());
        Ok(())
    }

    /// Load weights into `model`, which must have the saved architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  DigitNet<B>,
        device: &B::Device,
    ) -> Result<DigitNet<B>> {
        let path = self.dir.join(MODEL_FILE);

        let record = ModelRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' first.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))
    }
}

// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Download MNIST if missing   (Layer 4 - data)
//   Step 2: Load training/testing PNGs  (Layer 4 - data)
//   Step 3: Build datasets              (Layer 4 - data)
//   Step 4: Save config                 (Layer 6 - infra)
//   Step 5: Run training loop           (Layer 5 - ml)
//   Step 6: Print evaluation stats      (Layer 3 - domain)
//   Step 7: Save model weights          (Layer 6 - infra)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use std::time::Duration;

use anyhow::{bail, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::data::{dataset::MnistDataset, fetcher::MNIST_URL, mnist::MnistStore};
use crate::domain::{evaluation::Evaluation, traits::ImageSource};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{inferencer::Classifier, trainer::run_training};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run, plus where the data and
// the checkpoint live. Saved next to the weights so inference can
// rebuild a network of the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:              String,
    pub model_dir:             String,
    pub dataset_url:           String,
    pub download_timeout_secs: u64,
    pub epochs:                usize,
    pub batch_size:            usize,
    pub lr:                    f64,
    pub momentum:              f64,
    pub l2:                    f64,
    pub hidden:                usize,
    pub seed:                  u64,
    pub log_every:             usize,
    pub num_workers:           usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:              "mnist".to_string(),
            model_dir:             "model".to_string(),
            dataset_url:           MNIST_URL.to_string(),
            download_timeout_secs: 600,
            epochs:                2,
            batch_size:            10,
            lr:                    0.006,
            momentum:              0.9,
            l2:                    1e-4,
            hidden:                1000,
            seed:                  123,
            log_every:             500,
            num_workers:           1,
        }
    }
}

impl TrainConfig {
    /// The dataset location described by this config
    pub fn store(&self) -> MnistStore {
        MnistStore::new(
            &self.data_dir,
            self.dataset_url.clone(),
            Duration::from_secs(self.download_timeout_secs),
        )
    }

    pub fn checkpoint(&self) -> CheckpointManager {
        CheckpointManager::new(&self.model_dir)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train from scratch and overwrite any existing checkpoint.
    pub fn execute<B: AutodiffBackend>(
        &self,
        device: B::Device,
    ) -> Result<(Classifier<B::InnerBackend>, Evaluation)> {
        let cfg   = &self.config;
        let store = cfg.store();

        // ── Steps 1-2: Download if needed, then decode every PNG ─────────────
        tracing::info!("Loading MNIST from '{}'", store.base_dir().display());
        let (train_loader, test_loader) = (store.training()?, store.testing()?);
        tracing::info!(
            "Reading {} PNGs from '{}'",
            train_loader.count()?,
            train_loader.dir().display()
        );
        let train_images = train_loader.load_all()?;
        let test_images  = test_loader.load_all()?;

        if train_images.is_empty() || test_images.is_empty() {
            bail!(
                "No images found under '{}' ({} training, {} testing)",
                store.base_dir().display(),
                train_images.len(),
                test_images.len()
            );
        }
        tracing::info!(
            "Loaded {} training and {} testing images",
            train_images.len(),
            test_images.len()
        );

        // ── Step 3: Build Burn datasets ──────────────────────────────────────
        let train_dataset = MnistDataset::new(train_images);
        let test_dataset  = MnistDataset::new(test_images);

        // ── Step 4: Save config for inference ────────────────────────────────
        let ckpt_manager = cfg.checkpoint();
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(ckpt_manager.dir())?;

        // ── Step 5: Run training loop (Layer 5) ──────────────────────────────
        tracing::info!("Train model....");
        let outcome = run_training::<B>(
            cfg,
            train_dataset,
            test_dataset,
            &metrics,
            device.clone(),
        )?;

        // ── Step 6: Report ───────────────────────────────────────────────────
        println!("{}", outcome.evaluation.stats());

        // ── Step 7: Persist weights ──────────────────────────────────────────
        ckpt_manager.save_model(&outcome.model)?;
        tracing::info!("Model saved to '{}'", ckpt_manager.model_path().display());

        Ok((Classifier::new(outcome.model, device), outcome.evaluation))
    }

    /// Load the saved model, training one first if none exists.
    pub fn ensure_model<B: AutodiffBackend>(
        &self,
        device: B::Device,
    ) -> Result<Classifier<B::InnerBackend>> {
        let ckpt_manager = self.config.checkpoint();

        if ckpt_manager.has_model() {
            tracing::info!("Load model....");
            return Classifier::from_checkpoint(&ckpt_manager, device);
        }

        tracing::info!("No model in '{}'", ckpt_manager.dir().display());
        let (classifier, _) = self.execute::<B>(device)?;
        Ok(classifier)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::preprocessor::tests::digit_png;
    use crate::domain::traits::DigitClassifier;
    use burn::backend::{Autodiff, NdArray};
    use std::{fs, path::Path};

    type TestBackend = Autodiff<NdArray>;

    /// Lay out a miniature extracted archive: `per_digit` images per
    /// digit and split, each digit a different shade.
    pub(crate) fn fake_mnist(data_dir: &Path, per_digit: usize) {
        for split in ["training", "testing"] {
            for digit in 0..10u8 {
                let dir = data_dir.join("mnist_png").join(split).join(digit.to_string());
                fs::create_dir_all(&dir).unwrap();
                for i in 0..per_digit {
                    fs::write(dir.join(format!("{i}.png")), digit_png(digit * 25)).unwrap();
                }
            }
        }
    }

    pub(crate) fn small_config(root: &Path) -> TrainConfig {
        TrainConfig {
            data_dir:    root.join("data").display().to_string(),
            model_dir:   root.join("model").display().to_string(),
            epochs:      1,
            batch_size:  5,
            hidden:      8,
            log_every:   0,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_execute_trains_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        fake_mnist(&dir.path().join("data"), 2);
        let cfg = small_config(dir.path());

        let (classifier, evaluation) = TrainUseCase::new(cfg.clone())
            .execute::<TestBackend>(Default::default())
            .unwrap();

        assert_eq!(evaluation.total(), 20);
        assert!(cfg.checkpoint().has_model());
        assert!(classifier.classify(&[0.0; 784]).unwrap().digit < 10);

        let metrics = fs::read_to_string(Path::new(&cfg.model_dir).join("metrics.csv")).unwrap();
        assert_eq!(metrics.lines().count(), 2);
    }

    #[test]
    fn test_ensure_model_reuses_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        fake_mnist(&dir.path().join("data"), 1);
        let cfg = small_config(dir.path());
        let use_case = TrainUseCase::new(cfg.clone());

        let first = use_case.ensure_model::<TestBackend>(Default::default()).unwrap();

        // Without the dataset, a second call can only succeed by loading
        fs::remove_dir_all(dir.path().join("data")).unwrap();
        let second = TrainUseCase::new(TrainConfig {
            dataset_url: "http://127.0.0.1:9/unreachable.tar.gz".into(),
            download_timeout_secs: 1,
            ..cfg
        })
        .ensure_model::<TestBackend>(Default::default())
        .unwrap();

        let pixels = [0.3; 784];
        assert_eq!(
            first.classify(&pixels).unwrap().digit,
            second.classify(&pixels).unwrap().digit
        );
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fake_mnist(&dir.path().join("data"), 0);
        let cfg = small_config(dir.path());

        let err = TrainUseCase::new(cfg)
            .execute::<TestBackend>(Default::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("No images found"));
    }
}

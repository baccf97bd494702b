// ============================================================
// Layer 2 — ServeUseCase
// ============================================================
// Makes sure a model exists (training one if needed), then
// runs the HTTP server until Ctrl-C.
//
// The rest of the application is synchronous, so the tokio
// runtime is created here and lives only as long as the server.

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;

use crate::application::train_use_case::{TrainConfig, TrainUseCase};
use crate::domain::traits::DigitClassifier;
use crate::server::{AppState, Server};

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub train:        TrainConfig,
    pub host:         String,
    pub port:         u16,
    pub context_root: String,
    /// Train even when a checkpoint already exists
    pub retrain:      bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            train:        TrainConfig::default(),
            host:         "127.0.0.1".to_string(),
            port:         8080,
            context_root: "/mnist".to_string(),
            retrain:      false,
        }
    }
}

pub struct ServeUseCase {
    config: ServeConfig,
}

impl ServeUseCase {
    pub fn new(config: ServeConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: AutodiffBackend>(&self, device: B::Device) -> Result<()> {
        let cfg      = &self.config;
        let trainer  = TrainUseCase::new(cfg.train.clone());

        let classifier = if cfg.retrain {
            trainer.execute::<B>(device)?.0
        } else {
            trainer.ensure_model::<B>(device)?
        };
        let classifier: Box<dyn DigitClassifier> = Box::new(classifier);

        let state  = AppState::new(classifier, cfg.train.store(), &cfg.context_root);
        let server = Server::new(cfg.host.clone(), cfg.port, state);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Cannot start async runtime")?;

        runtime.block_on(server.run())
    }
}

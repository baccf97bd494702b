// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch SGD with Nesterov momentum and L2 weight decay.
//
//   v = μ*v + g + λ*θ          (velocity, λ = l2)
//   θ = θ - lr * (g + μ*v)     (Nesterov look-ahead step)
//
// Training runs on an Autodiff backend; evaluation after each
// epoch uses model.valid(), which lives on the inner backend
// and carries no gradient bookkeeping.
//
// Reference: Burn Book §5, Sutskever et al. (2013) on momentum

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{
        decay::WeightDecayConfig, momentum::MomentumConfig, GradientsParams, Optimizer,
        SgdConfig,
    },
    prelude::*,
    tensor::{backend::AutodiffBackend, ElementConversion},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::MnistBatcher, dataset::MnistDataset};
use crate::domain::evaluation::Evaluation;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::evaluator::evaluate_batches;
use crate::ml::model::{DigitNet, DigitNetConfig};

/// What a finished training run hands back.
pub struct TrainOutcome<B: Backend> {
    /// Trained weights, detached from autodiff
    pub model:      DigitNet<B>,
    /// Test-set evaluation after the last epoch
    pub evaluation: Evaluation,
    pub history:    Vec<EpochMetrics>,
}

pub fn run_training<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    train_dataset: MnistDataset,
    test_dataset:  MnistDataset,
    metrics:      &MetricsLogger,
    device:       B::Device,
) -> Result<TrainOutcome<B::InnerBackend>> {
    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: DigitNet<B> = DigitNetConfig::mnist(cfg.hidden).init(&device);
    tracing::info!(
        "Model ready: {} → {} → 10, {} training / {} test images",
        crate::domain::digit::n_in(),
        cfg.hidden,
        train_dataset.sample_count(),
        test_dataset.sample_count(),
    );

    // ── SGD + Nesterov momentum + L2 ──────────────────────────────────────────
    let optim_cfg = SgdConfig::new()
        .with_momentum(Some(
            MomentumConfig::new()
                .with_momentum(cfg.momentum as _)
                .with_dampening(0.0)
                .with_nesterov(true),
        ))
        // Decays biases too
        .with_weight_decay(Some(WeightDecayConfig::new(cfg.l2 as _)));
    let mut optim = optim_cfg.init();

    let train_loader = DataLoaderBuilder::new(MnistBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers)
        .build(train_dataset);

    let test_loader = DataLoaderBuilder::new(MnistBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(cfg.num_workers)
        .build(test_dataset);

    let mut iteration  = 0usize;
    let mut history    = Vec::with_capacity(cfg.epochs);
    let mut evaluation = Evaluation::default();

    for epoch in 1..=cfg.epochs {
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.images, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;
            iteration      += 1;

            if cfg.log_every > 0 && iteration % cfg.log_every == 0 {
                tracing::info!("Score at iteration {} is {:.6}", iteration, loss_val);
            }

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Test-set evaluation ───────────────────────────────────────────────
        let (epoch_eval, test_loss) = evaluate_batches(&model.valid(), test_loader.iter())?;

        let row = EpochMetrics::new(
            epoch,
            avg_train_loss,
            test_loss,
            epoch_eval.accuracy(),
            epoch_eval.f1(),
        );
        metrics.log(&row)?;

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | test_loss={:.4} | accuracy={:.2}% | f1={:.4}",
            epoch, cfg.epochs, avg_train_loss, test_loss,
            row.accuracy * 100.0, row.f1,
        );

        history.push(row);
        evaluation = epoch_eval;
    }

    tracing::info!("Training complete after {} iterations", iteration);
    Ok(TrainOutcome {
        model: model.valid(),
        evaluation,
        history,
    })
}

// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Runs a model over labelled batches and fills a confusion
// matrix. Used after every training epoch and by `evaluate`.
//
// argmax(1) returns [batch, 1] so it is flattened to [batch]
// before the predicted digits are read back.

use anyhow::{anyhow, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    nn::loss::CrossEntropyLossConfig,
    prelude::*,
    tensor::ElementConversion,
};

use crate::data::{batcher::{MnistBatch, MnistBatcher}, dataset::MnistDataset};
use crate::domain::evaluation::Evaluation;
use crate::ml::model::DigitNet;

/// Evaluation over the batches plus the mean batch loss
/// (NaN when there were no batches).
pub fn evaluate_batches<B: Backend>(
    model:   &DigitNet<B>,
    batches: impl Iterator<Item = MnistBatch<B>>,
) -> Result<(Evaluation, f64)> {
    let mut evaluation = Evaluation::default();
    let mut loss_sum   = 0.0f64;
    let mut n_batches  = 0usize;

    for batch in batches {
        let logits = model.forward(batch.images);

        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        let loss: f64 = ce
            .forward(logits.clone(), batch.targets.clone())
            .into_scalar()
            .elem::<f64>();
        loss_sum  += loss;
        n_batches += 1;

        let predicted = read_ints(logits.argmax(1).flatten::<1>(0, 1))?;
        let actual    = read_ints(batch.targets)?;

        let mut batch_eval = Evaluation::default();
        for (a, p) in actual.iter().zip(&predicted) {
            batch_eval.record(*a as usize, *p as usize);
        }
        evaluation.merge(&batch_eval);
    }

    let mean_loss = if n_batches > 0 { loss_sum / n_batches as f64 } else { f64::NAN };
    Ok((evaluation, mean_loss))
}

/// Evaluate a model on a whole dataset
pub fn evaluate<B: Backend>(
    model:      &DigitNet<B>,
    dataset:    MnistDataset,
    batch_size: usize,
    device:     &B::Device,
) -> Result<(Evaluation, f64)> {
    let loader = DataLoaderBuilder::new(MnistBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .build(dataset);
    evaluate_batches(model, loader.iter())
}

fn read_ints<B: Backend>(tensor: Tensor<B, 1, Int>) -> Result<Vec<i64>> {
    tensor
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| anyhow!("Cannot read tensor data: {e:?}"))
}

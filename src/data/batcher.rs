// ============================================================
// Layer 4 — MNIST Batcher
// ============================================================
// Implements Burn's Batcher trait to stack DigitImages into
// tensors the network can consume.
//
//   Input:  Vec of N DigitImages, 784 pixels each
//   Output: images  [N, 784] float
//           targets [N]      int (the digit labels)
//
// Pixels are flattened into one long Vec and reshaped, the
// same way token ids are handled for sequence models.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::digit::{n_in, DigitImage};

/// A batch of digits ready for the forward pass.
#[derive(Debug, Clone)]
pub struct MnistBatch<B: Backend> {
    /// Scaled pixel rows — shape: [batch_size, 784]
    pub images: Tensor<B, 2>,

    /// Ground truth digits — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors land on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct MnistBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> MnistBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<DigitImage, MnistBatch<B>> for MnistBatcher<B> {
    fn batch(&self, items: Vec<DigitImage>) -> MnistBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|img| img.pixels.iter().copied())
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|img| img.label as i32)
            .collect();

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device)
            .reshape([batch_size, n_in()]);

        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        MnistBatch { images, targets }
    }
}

use burn::{
    nn::{loss::CrossEntropyLossConfig, Initializer, Linear, LinearConfig},
    prelude::*,
    tensor::activation::{relu, softmax},
};

use crate::domain::digit::{n_in, NUM_CLASSES};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct DigitNetConfig {
    pub n_in:   usize,
    pub n_out:  usize,
    #[config(default = 1000)]
    pub hidden: usize,
}

impl DigitNetConfig {
    /// 784 inputs, 10 outcomes, `hidden` units in between
    pub fn mnist(hidden: usize) -> Self {
        Self::new(n_in(), NUM_CLASSES).with_hidden(hidden)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> DigitNet<B> {
        let xavier = Initializer::XavierUniform { gain: 1.0 };
        let hidden = LinearConfig::new(self.n_in, self.hidden)
            .with_initializer(xavier.clone())
            .init(device);
        let output = LinearConfig::new(self.hidden, self.n_out)
            .with_initializer(xavier)
            .init(device);
        DigitNet { hidden, output }
    }
}

/// Dense ReLU layer followed by a softmax output layer.
#[derive(Module, Debug)]
pub struct DigitNet<B: Backend> {
    pub hidden: Linear<B>,
    pub output: Linear<B>,
}

impl<B: Backend> DigitNet<B> {
    /// images: [batch, n_in] → logits: [batch, n_out]
    pub fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden.forward(images));
        self.output.forward(x)
    }

    /// Softmax over the logits, one row per image
    pub fn probabilities(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward(images), 1)
    }

    /// Cross-entropy = softmax + negative log likelihood on the true digit.
    pub fn forward_loss(
        &self,
        images:  Tensor<B, 2>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        let loss = ce.forward(logits.clone(), targets);
        (loss, logits)
    }
}

// ============================================================
// Layer 3 — Digit Domain Types
// ============================================================
// A handwritten digit image and the model's verdict about it.
//
// Images are always 28x28 grayscale, flattened row by row into
// 784 intensities in [0, 1]. 0.0 is background (black) and
// 1.0 is full ink (white), which is how MNIST stores digits.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Image height in pixels
pub const IMG_HEIGHT: usize = 28;

/// Image width in pixels
pub const IMG_WIDTH: usize = 28;

/// Number of possible outcomes (digits 0 to 9)
pub const NUM_CLASSES: usize = 10;

/// Number of network inputs: one per pixel
pub const fn n_in() -> usize {
    IMG_HEIGHT * IMG_WIDTH
}

/// One labelled example, ready to become a tensor row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitImage {
    /// Row-major pixel intensities, length `n_in()`
    pub pixels: Vec<f32>,

    /// The digit drawn in the image (0..10)
    pub label: u8,
}

impl DigitImage {
    pub fn new(pixels: Vec<f32>, label: u8) -> Self {
        Self { pixels, label }
    }
}

/// The model's answer for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Most probable digit
    pub digit: usize,

    /// Softmax output, one probability per digit
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Build a prediction from a probability vector.
    /// The first maximum wins when several outputs tie.
    pub fn from_probabilities(probabilities: Vec<f32>) -> Result<Self> {
        if probabilities.is_empty() {
            bail!("Cannot build a prediction from an empty output");
        }

        let mut digit = 0usize;
        for (i, &p) in probabilities.iter().enumerate() {
            if p > probabilities[digit] {
                digit = i;
            }
        }

        Ok(Self { digit, probabilities })
    }

    /// Probability assigned to the predicted digit
    pub fn confidence(&self) -> f32 {
        self.probabilities[self.digit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_n_in_matches_image_size() {
        assert_eq!(n_in(), 784);
    }

    #[test]
    fn test_argmax_picks_highest_probability() {
        let p = Prediction::from_probabilities(vec![0.1, 0.7, 0.2]).unwrap();
        assert_eq!(p.digit, 1);
        assert!((p.confidence() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_first_maximum_wins_ties() {
        let p = Prediction::from_probabilities(vec![0.4, 0.2, 0.4]).unwrap();
        assert_eq!(p.digit, 0);
    }

    #[test]
    fn test_empty_output_is_rejected() {
        assert!(Prediction::from_probabilities(Vec::new()).is_err());
    }
}

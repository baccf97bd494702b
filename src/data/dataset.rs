use burn::data::dataset::Dataset;

use crate::domain::digit::DigitImage;

/// In-memory MNIST split, indexable by Burn's DataLoader.
pub struct MnistDataset {
    images: Vec<DigitImage>,
}

impl MnistDataset {
    pub fn new(images: Vec<DigitImage>) -> Self { Self { images } }

    pub fn sample_count(&self) -> usize { self.images.len() }
}

impl Dataset<DigitImage> for MnistDataset {
    fn get(&self, index: usize) -> Option<DigitImage> {
        self.images.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_len() {
        let ds = MnistDataset::new(vec![
            DigitImage::new(vec![0.0; 784], 3),
            DigitImage::new(vec![1.0; 784], 8),
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).unwrap().label, 8);
        assert!(ds.get(2).is_none());
    }
}

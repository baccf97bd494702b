// ============================================================
// Layer 4 — PNG Directory Loader
// ============================================================
// Loads one split of the MNIST PNG tree:
//
//   <split>/
//     0/  1.png 21.png ...
//     1/  ...
//     ...
//     9/  ...
//
// The label of every image is the name of its parent folder.
// Each image goes through the Preprocessor, so training sees
// exactly what inference sees.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::data::preprocessor::Preprocessor;
use crate::domain::digit::{DigitImage, NUM_CLASSES};
use crate::domain::traits::ImageSource;

pub struct PngDirLoader {
    dir:          PathBuf,
    preprocessor: Preprocessor,
}

impl PngDirLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir:          dir.into(),
            preprocessor: Preprocessor::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory holding the images of one digit
    pub fn digit_dir(&self, digit: usize) -> PathBuf {
        self.dir.join(digit.to_string())
    }

    /// Number of image files across all digit folders
    pub fn count(&self) -> Result<usize> {
        let mut total = 0;
        for digit in 0..NUM_CLASSES {
            total += list_files(&self.digit_dir(digit))?.len();
        }
        Ok(total)
    }
}

impl ImageSource for PngDirLoader {
    fn load_all(&self) -> Result<Vec<DigitImage>> {
        let mut images  = Vec::new();
        let mut skipped = 0usize;

        for digit in 0..NUM_CLASSES {
            for path in list_files(&self.digit_dir(digit))? {
                match self.preprocessor.pixels_from_path(&path) {
                    Ok(pixels) => images.push(DigitImage::new(pixels, digit as u8)),
                    // One corrupt file should not sink a 60k image load
                    Err(e) => {
                        tracing::warn!("Skipping '{}': {:#}", path.display(), e);
                        skipped += 1;
                    }
                }
            }
        }

        tracing::info!(
            "Loaded {} images from '{}' ({} skipped)",
            images.len(),
            self.dir.display(),
            skipped
        );
        Ok(images)
    }
}

/// Regular files directly inside `dir`, sorted by name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

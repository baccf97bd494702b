// ============================================================
// Layer 4 — MNIST Store
// ============================================================
// Knows where the extracted dataset lives and hands out
// loaders for the training and testing splits. Every access
// first makes sure the data has been downloaded.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Result};
use rand::{seq::SliceRandom, Rng};

use crate::data::{
    fetcher::MnistFetcher,
    loader::{list_files, PngDirLoader},
};
use crate::domain::digit::NUM_CLASSES;

/// Folder name inside the archive
const ARCHIVE_ROOT: &str = "mnist_png";

pub struct MnistStore {
    fetcher:      MnistFetcher,
    training_dir: PathBuf,
    testing_dir:  PathBuf,
}

/// A test image picked at random
#[derive(Debug, Clone)]
pub struct SampleImage {
    pub path:  PathBuf,
    pub label: u8,
}

impl MnistStore {
    pub fn new(base_dir: impl Into<PathBuf>, url: impl Into<String>, timeout: Duration) -> Self {
        let base_dir: PathBuf = base_dir.into();
        let root = base_dir.join(ARCHIVE_ROOT);
        Self {
            training_dir: root.join("training"),
            testing_dir:  root.join("testing"),
            fetcher:      MnistFetcher::new(url, base_dir, timeout),
        }
    }

    pub fn base_dir(&self) -> &Path {
        self.fetcher.base_dir()
    }

    pub fn ensure(&self) -> Result<()> {
        self.fetcher.ensure()
    }

    pub fn training(&self) -> Result<PngDirLoader> {
        self.ensure()?;
        Ok(PngDirLoader::new(&self.training_dir))
    }

    pub fn testing(&self) -> Result<PngDirLoader> {
        self.ensure()?;
        Ok(PngDirLoader::new(&self.testing_dir))
    }

    /// Pick a random digit folder of the test split, then a
    /// random file inside it.
    pub fn select_any<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SampleImage> {
        self.ensure()?;

        let digit = rng.gen_range(0..NUM_CLASSES);
        let dir   = self.testing_dir.join(digit.to_string());
        let files = list_files(&dir)?;

        let Some(path) = files.choose(rng) else {
            bail!("No test images in '{}'", dir.display());
        };

        tracing::info!("selected[{}]", path.display());
        Ok(SampleImage {
            path:  path.clone(),
            label: digit as u8,
        })
    }
}

// ============================================================
// Layer 4 — Dataset Fetcher
// ============================================================
// Downloads the MNIST PNG archive once and unpacks it.
//
// The archive is streamed straight from the HTTP response
// through a gzip decoder into tar extraction, so the .tar.gz
// never touches the disk.
//
// The data directory counts as present when it exists and is
// not empty. A failed download removes the directory again so
// a half-extracted tree is never mistaken for a complete one.

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

/// Where the PNG version of MNIST is published
pub const MNIST_URL: &str = "https://github.com/myleott/mnist_png/raw/master/mnist_png.tar.gz";

#[derive(Debug, Clone)]
pub struct MnistFetcher {
    url:      String,
    base_dir: PathBuf,
    timeout:  Duration,
}

impl MnistFetcher {
    pub fn new(url: impl Into<String>, base_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            url:      url.into(),
            base_dir: base_dir.into(),
            timeout,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// True when the data directory exists and has at least one entry
    pub fn exists(&self) -> bool {
        fs::read_dir(&self.base_dir)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    /// Download the dataset unless it is already on disk
    pub fn ensure(&self) -> Result<()> {
        if self.exists() {
            tracing::debug!("MNIST already present in '{}'", self.base_dir.display());
            return Ok(());
        }
        self.fetch()
    }

    pub fn fetch(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Cannot create data directory '{}'", self.base_dir.display())
        })?;

        tracing::info!("Downloading MNIST from {}", self.url);

        let result = self.download_and_unpack();
        if result.is_err() {
            if let Err(e) = fs::remove_dir_all(&self.base_dir) {
                tracing::warn!(
                    "Could not clean up '{}' after failed download: {}",
                    self.base_dir.display(),
                    e
                );
            }
        }
        result
    }

    fn download_and_unpack(&self) -> Result<()> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Cannot build HTTP client")?;

        let response = client
            .get(&self.url)
            .send()
            .with_context(|| format!("Cannot download '{}'", self.url))?
            .error_for_status()
            .with_context(|| format!("Download of '{}' failed", self.url))?;

        unpack_archive(response, &self.base_dir)?;
        tracing::info!("MNIST extracted to '{}'", self.base_dir.display());
        Ok(())
    }
}

/// Extract a gzip-compressed tar stream into `dest`.
pub fn unpack_archive<R: Read>(reader: R, dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive
        .unpack(dest)
        .with_context(|| format!("Cannot extract archive into '{}'", dest.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};

    fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_unpack_creates_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let archive = tar_gz(&[
            ("mnist_png/training/3/1.png", &b"three"[..]),
            ("mnist_png/testing/7/2.png", &b"seven"[..]),
        ]);

        unpack_archive(archive.as_slice(), dir.path()).unwrap();

        let three = fs::read(dir.path().join("mnist_png/training/3/1.png")).unwrap();
        assert_eq!(three, b"three");
        assert!(dir.path().join("mnist_png/testing/7/2.png").is_file());
    }

    #[test]
    fn test_unpack_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        assert!(unpack_archive(&b"not gzip"[..], dir.path()).is_err());
    }

    #[test]
    fn test_exists_requires_non_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("mnist");
        let fetcher = MnistFetcher::new(MNIST_URL, &base, Duration::from_secs(1));

        assert!(!fetcher.exists());
        fs::create_dir_all(&base).unwrap();
        assert!(!fetcher.exists());
        fs::write(base.join("marker"), b"x").unwrap();
        assert!(fetcher.exists());

        // Present data means ensure() never touches the network
        fetcher.ensure().unwrap();
    }

    /// Serve one `404 Not Found` on a local port and return its URL.
    fn not_found_server() -> (String, std::thread::JoinHandle<()>) {
        use std::io::Write;
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        });

        (format!("http://127.0.0.1:{port}/mnist_png.tar.gz"), handle)
    }

    #[test]
    fn test_failed_download_is_an_error_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("mnist");
        let (url, server) = not_found_server();
        let fetcher = MnistFetcher::new(url, &base, Duration::from_secs(5));

        let err = fetcher.ensure().unwrap_err();
        server.join().unwrap();

        assert!(format!("{err:#}").contains("404"));
        assert!(!base.exists());
    }
}

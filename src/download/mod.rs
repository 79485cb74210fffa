//! Fetching remote files onto disk.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::archive::{digests_match, sha256_hex};
use crate::cleanup::{CleanupGuard, SharedCleanupContext};
use crate::error::InstallError;
use crate::http::HttpClient;
use crate::runtime::Runtime;

/// Streams a URL into a writer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Write the body of `url` into `sink`, returning the byte count.
    async fn fetch(&self, url: &str, sink: Box<dyn Write + Send>) -> Result<u64>;
}

pub struct HttpDownloader {
    http_client: HttpClient,
}

impl HttpDownloader {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch(&self, url: &str, sink: Box<dyn Write + Send>) -> Result<u64> {
        self.http_client.download_file(url, || Ok(sink)).await
    }
}

/// `<dest>.part`, the name a download lives under until it is complete.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name: OsString = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Download `url` to `dest`.
///
/// The body is written to [`partial_path`] and renamed onto `dest` only after
/// the transfer (and the optional SHA-256 check) succeeded, so `dest` either
/// holds a complete file or does not exist. The partial file is registered in
/// `cleanup` while in flight and removed on failure.
#[tracing::instrument(skip(runtime, downloader, cleanup))]
pub async fn download_to_path<R: Runtime, D: Downloader + ?Sized>(
    runtime: &R,
    downloader: &D,
    url: &str,
    dest: &Path,
    expected_sha256: Option<&str>,
    cleanup: SharedCleanupContext,
) -> Result<u64, InstallError> {
    info!("Downloading {} to {}", url, dest.display());

    let part = partial_path(dest);
    let guard = CleanupGuard::new(cleanup, part.clone());

    let result = fetch_and_publish(runtime, downloader, url, &part, dest, expected_sha256).await;

    if result.is_err() && runtime.exists(&part) {
        if let Err(e) = runtime.remove_file(&part) {
            warn!("Failed to remove partial download {}: {}", part.display(), e);
        }
    }
    guard.success();

    result
}

async fn fetch_and_publish<R: Runtime, D: Downloader + ?Sized>(
    runtime: &R,
    downloader: &D,
    url: &str,
    part: &Path,
    dest: &Path,
    expected_sha256: Option<&str>,
) -> Result<u64, InstallError> {
    let sink = runtime
        .create_file(part)
        .map_err(|e| InstallError::filesystem(part, e))?;

    let bytes = downloader
        .fetch(url, sink)
        .await
        .map_err(|e| InstallError::download(url, e))?;

    if let Some(expected) = expected_sha256 {
        let actual = runtime
            .open(part)
            .and_then(sha256_hex)
            .context("Failed to checksum download")
            .map_err(|e| InstallError::filesystem(part, e))?;

        if !digests_match(&actual, expected) {
            return Err(InstallError::ChecksumMismatch {
                url: url.to_string(),
                expected: expected.trim().to_ascii_lowercase(),
                actual,
            });
        }
    }

    runtime
        .rename(part, dest)
        .map_err(|e| InstallError::filesystem(dest, e))?;

    info!("Downloaded {} bytes to {}", bytes, dest.display());
    Ok(bytes)
}

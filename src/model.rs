//! The Whisper model the installed binary loads at run time.

use log::info;
use std::path::PathBuf;

use crate::cleanup::SharedCleanupContext;
use crate::download::{Downloader, download_to_path};
use crate::error::InstallError;
use crate::runtime::Runtime;

/// Where the English base model is published.
pub const DEFAULT_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.en.bin";

/// A single downloadable file with a fixed destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAsset {
    pub url: String,
    pub destination: PathBuf,
    /// Optional hex SHA-256. Nothing is verified when absent.
    pub sha256: Option<String>,
}

impl ModelAsset {
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            sha256: None,
        }
    }

    pub fn with_sha256(mut self, sha256: Option<String>) -> Self {
        self.sha256 = sha256;
        self
    }

    /// The existence check that makes fetching idempotent.
    pub fn is_present<R: Runtime>(&self, runtime: &R) -> bool {
        runtime.exists(&self.destination)
    }
}

/// What [`ensure_model`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFetch {
    /// The destination already existed; the network was not touched.
    AlreadyPresent,
    Downloaded { bytes: u64 },
}

/// Make sure `asset` exists on disk, downloading it at most once.
#[tracing::instrument(skip(runtime, downloader, cleanup))]
pub async fn ensure_model<R: Runtime, D: Downloader + ?Sized>(
    runtime: &R,
    downloader: &D,
    asset: &ModelAsset,
    cleanup: SharedCleanupContext,
) -> Result<ModelFetch, InstallError> {
    if asset.is_present(runtime) {
        info!(
            "Model already present at {}, skipping download",
            asset.destination.display()
        );
        return Ok(ModelFetch::AlreadyPresent);
    }

    println!(
        "==> Downloading Whisper base model to {}...",
        asset.destination.display()
    );
    let bytes = download_to_path(
        runtime,
        downloader,
        &asset.url,
        &asset.destination,
        asset.sha256.as_deref(),
        cleanup,
    )
    .await?;

    Ok(ModelFetch::Downloaded { bytes })
}

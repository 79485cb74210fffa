//! Where the prebuilt `inkoscribe` executable comes from.

use anyhow::anyhow;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::archive::extract_executable;
use crate::cleanup::{CleanupGuard, SharedCleanupContext};
use crate::download::{Downloader, download_to_path};
use crate::error::InstallError;
use crate::layout::PROGRAM_NAME;
use crate::runtime::Runtime;

/// Pinned macOS release tarball.
pub const RELEASE_URL: &str =
    "https://github.com/uohzxela/homebrew-inkoscribe/releases/download/v0.1.0/inkoscribe-mac.tar.gz";

/// SHA-256 of [`RELEASE_URL`].
pub const RELEASE_SHA256: &str = "53080f85bdbd7c2076b6bc10ac642a6b4db9422dec4261117fe64324763c6ff6";

const ARCHIVE_FILE_NAME: &str = "inkoscribe-mac.tar.gz";

static SCRATCH_SEQ: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinarySource {
    /// An executable already on disk.
    Local(PathBuf),
    /// A gzipped tarball containing an `inkoscribe` entry, pinned by digest.
    Release { url: String, sha256: String },
}

impl Default for BinarySource {
    fn default() -> Self {
        BinarySource::Release {
            url: RELEASE_URL.to_string(),
            sha256: RELEASE_SHA256.to_string(),
        }
    }
}

/// An executable ready to be copied into place.
///
/// Release downloads live in a scratch directory that [`FetchedBinary::discard`] removes.
#[derive(Debug)]
pub struct FetchedBinary {
    path: PathBuf,
    scratch: Option<CleanupGuard>,
}

impl FetchedBinary {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove any scratch files. Local sources are left untouched.
    pub fn discard<R: Runtime>(self, runtime: &R) {
        if let Some(guard) = self.scratch {
            if let Err(e) = runtime.remove_dir_all(guard.path()) {
                warn!(
                    "Failed to remove scratch directory {}: {}",
                    guard.path().display(),
                    e
                );
            }
            guard.success();
        }
    }
}

/// Resolve `source` to an executable on the local disk.
#[tracing::instrument(skip(runtime, downloader, cleanup))]
pub async fn fetch_binary<R: Runtime, D: Downloader + ?Sized>(
    runtime: &R,
    downloader: &D,
    source: &BinarySource,
    cleanup: SharedCleanupContext,
) -> Result<FetchedBinary, InstallError> {
    match source {
        BinarySource::Local(path) => {
            if !runtime.exists(path) || runtime.is_dir(path) {
                return Err(InstallError::filesystem(
                    path,
                    anyhow!("{} executable not found", PROGRAM_NAME),
                ));
            }
            Ok(FetchedBinary {
                path: path.clone(),
                scratch: None,
            })
        }
        BinarySource::Release { url, sha256 } => {
            let scratch_dir = scratch_dir(runtime);
            debug!("Using scratch directory {}", scratch_dir.display());
            runtime
                .create_dir_all(&scratch_dir)
                .map_err(|e| InstallError::filesystem(&scratch_dir, e))?;
            let fetched = FetchedBinary {
                path: scratch_dir.join(PROGRAM_NAME),
                scratch: Some(CleanupGuard::new(cleanup.clone(), scratch_dir.clone())),
            };

            let archive = scratch_dir.join(ARCHIVE_FILE_NAME);
            let extracted = async {
                println!("==> Downloading {}", url);
                download_to_path(
                    runtime,
                    downloader,
                    url,
                    &archive,
                    Some(sha256.as_str()),
                    cleanup,
                )
                .await?;
                extract_executable(runtime, &archive, PROGRAM_NAME, &fetched.path).map_err(
                    |source| InstallError::Archive {
                        archive: url.clone(),
                        source,
                    },
                )
            }
            .await;

            match extracted {
                Ok(_) => Ok(fetched),
                Err(e) => {
                    fetched.discard(runtime);
                    Err(e)
                }
            }
        }
    }
}

fn scratch_dir<R: Runtime>(runtime: &R) -> PathBuf {
    runtime.temp_dir().join(format!(
        "inkoscribe-installer-{}-{}",
        std::process::id(),
        SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed)
    ))
}

//! Filesystem layout of an installation.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Name of both the launcher and the private binary.
pub const PROGRAM_NAME: &str = "inkoscribe";

/// File name of the Whisper model the binary expects.
pub const MODEL_FILE_NAME: &str = "ggml-base.en.bin";

/// Every path an install creates, derived from a single prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallTarget {
    pub prefix: PathBuf,
    /// PATH-visible directory holding the launcher.
    pub bin_dir: PathBuf,
    pub launcher_path: PathBuf,
    /// Private directory holding the real binary.
    pub library_dir: PathBuf,
    pub executable_path: PathBuf,
    pub model_dir: PathBuf,
    pub model_path: PathBuf,
}

impl InstallTarget {
    pub fn under(prefix: &Path) -> Self {
        let bin_dir = prefix.join("bin");
        let library_dir = prefix.join("libexec");
        let model_dir = prefix.join("share").join("whisper");

        Self {
            prefix: prefix.to_path_buf(),
            launcher_path: bin_dir.join(PROGRAM_NAME),
            bin_dir,
            executable_path: library_dir.join(PROGRAM_NAME),
            library_dir,
            model_path: model_dir.join(MODEL_FILE_NAME),
            model_dir,
        }
    }
}

/// Pick the prefix: explicit value first, then the default for this user.
#[tracing::instrument(skip(runtime))]
pub fn resolve_prefix<R: Runtime>(runtime: &R, prefix: Option<PathBuf>) -> Result<PathBuf> {
    let prefix = match prefix {
        Some(path) => path,
        None => default_prefix(runtime)?,
    };
    info!("Using install prefix: {}", prefix.display());
    Ok(prefix)
}

/// `/usr/local` for root, `~/.local` for everyone else.
#[tracing::instrument(skip(runtime))]
pub fn default_prefix<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    if runtime.is_privileged() {
        Ok(PathBuf::from("/usr/local"))
    } else {
        let home_dir = runtime
            .home_dir()
            .context("Could not find home directory")?;
        Ok(home_dir.join(".local"))
    }
}

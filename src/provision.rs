//! Install use case - validates the host and stages every artifact.
//!
//! The flow is strictly linear:
//! platform gates, binary staging, launcher, model directory, model download.
//! Gate failures abort before anything is written. A failed model download is
//! reported in the [`InstallReport`] but does not undo the earlier steps; the
//! launcher then fails at run time until the model is fetched by a rerun.

use log::{info, warn};

use crate::cleanup::{CleanupGuard, SharedCleanupContext, new_shared};
use crate::download::Downloader;
use crate::error::InstallError;
use crate::launcher::render_launcher;
use crate::layout::{InstallTarget, PROGRAM_NAME};
use crate::model::{DEFAULT_MODEL_URL, ModelAsset, ModelFetch, ensure_model};
use crate::platform::{CpuArch, PlatformFact, Requirements};
use crate::runtime::Runtime;
use crate::source::{BinarySource, fetch_binary};

use std::path::{Path, PathBuf};

/// Mode of the launcher and the private binary.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Outcome of a completed install.
#[derive(Debug)]
pub struct InstallReport {
    pub target: InstallTarget,
    /// The model step never aborts the install, so its error lives here.
    pub model: Result<ModelFetch, InstallError>,
}

impl InstallReport {
    /// True when the model is on disk and the install is ready to run.
    pub fn is_complete(&self) -> bool {
        self.model.is_ok()
    }
}

pub struct Provisioner<'a, R: Runtime, D: Downloader + ?Sized> {
    runtime: &'a R,
    downloader: &'a D,
    requirements: Requirements,
    binary: BinarySource,
    model_url: String,
    model_sha256: Option<String>,
    cleanup: SharedCleanupContext,
}

impl<'a, R: Runtime, D: Downloader + ?Sized> Provisioner<'a, R, D> {
    pub fn new(runtime: &'a R, downloader: &'a D, binary: BinarySource) -> Self {
        Self {
            runtime,
            downloader,
            requirements: Requirements::default(),
            binary,
            model_url: DEFAULT_MODEL_URL.to_string(),
            model_sha256: None,
            cleanup: new_shared(),
        }
    }

    pub fn with_requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_model_url(mut self, url: impl Into<String>) -> Self {
        self.model_url = url.into();
        self
    }

    pub fn with_model_sha256(mut self, sha256: Option<String>) -> Self {
        self.model_sha256 = sha256;
        self
    }

    /// Share a cleanup context with an interrupt handler.
    pub fn with_cleanup(mut self, cleanup: SharedCleanupContext) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Install into `root`, which becomes the prefix of every [`InstallTarget`] path.
    #[tracing::instrument(skip(self))]
    pub async fn install(
        &self,
        platform: &PlatformFact,
        root: &Path,
    ) -> Result<InstallReport, InstallError> {
        self.requirements.check(platform)?;
        if platform.cpu_arch == CpuArch::Aarch64 {
            println!("==> Detected Apple Silicon processor - proceeding with installation...");
        }

        let target = InstallTarget::under(root);
        info!("Installing into {}", target.prefix.display());

        let fetched = fetch_binary(
            self.runtime,
            self.downloader,
            &self.binary,
            self.cleanup.clone(),
        )
        .await?;
        let staged = self.stage_binary(fetched.path(), &target);
        fetched.discard(self.runtime);
        staged?;

        self.write_launcher(&target)?;

        self.runtime
            .create_dir_all(&target.model_dir)
            .map_err(|e| InstallError::filesystem(&target.model_dir, e))?;

        let asset = ModelAsset::new(self.model_url.clone(), target.model_path.clone())
            .with_sha256(self.model_sha256.clone());
        let model = ensure_model(self.runtime, self.downloader, &asset, self.cleanup.clone()).await;
        if let Err(e) = &model {
            warn!("Model download failed, leaving install incomplete: {}", e);
        }

        Ok(InstallReport { target, model })
    }

    /// Copy the executable into the private library directory.
    ///
    /// The copy lands on [`staging_path`] and is renamed over the destination,
    /// so the installed binary always gets a fresh inode.
    fn stage_binary(&self, source: &Path, target: &InstallTarget) -> Result<(), InstallError> {
        let dest = &target.executable_path;
        info!("Staging {} as {}", source.display(), dest.display());

        self.runtime
            .create_dir_all(&target.library_dir)
            .map_err(|e| InstallError::filesystem(&target.library_dir, e))?;

        let tmp = staging_path(target);
        let guard = CleanupGuard::new(self.cleanup.clone(), tmp.clone());
        let result = self.publish_binary(source, &tmp, dest);

        if result.is_err() && self.runtime.exists(&tmp) {
            if let Err(e) = self.runtime.remove_file(&tmp) {
                warn!("Failed to remove staged copy {}: {}", tmp.display(), e);
            }
        }
        guard.success();

        result
    }

    fn publish_binary(&self, source: &Path, tmp: &Path, dest: &Path) -> Result<(), InstallError> {
        self.runtime
            .copy(source, tmp)
            .map_err(|e| InstallError::filesystem(tmp, e))?;
        self.runtime
            .set_permissions(tmp, EXECUTABLE_MODE)
            .map_err(|e| InstallError::filesystem(tmp, e))?;
        self.runtime
            .rename(tmp, dest)
            .map_err(|e| InstallError::filesystem(dest, e))?;
        Ok(())
    }

    /// Write the PATH-visible wrapper for the staged binary.
    fn write_launcher(&self, target: &InstallTarget) -> Result<(), InstallError> {
        let launcher = &target.launcher_path;
        let script = render_launcher(&target.model_path, &target.executable_path);

        self.runtime
            .create_dir_all(&target.bin_dir)
            .map_err(|e| InstallError::filesystem(&target.bin_dir, e))?;
        self.runtime
            .write(launcher, script.as_bytes())
            .map_err(|e| InstallError::filesystem(launcher, e))?;
        self.runtime
            .set_permissions(launcher, EXECUTABLE_MODE)
            .map_err(|e| InstallError::filesystem(launcher, e))?;
        Ok(())
    }
}

/// Hidden sibling of the private binary that a new copy is written to.
pub fn staging_path(target: &InstallTarget) -> PathBuf {
    target.library_dir.join(format!(".{}.tmp", PROGRAM_NAME))
}

use anyhow::{Result, bail};
use log::debug;
use std::path::PathBuf;

use crate::layout::{InstallTarget, resolve_prefix};
use crate::runtime::Runtime;

/// Text the installed binary prints in its `--help` output.
pub const VERIFY_MARKER: &str = "Live, local, and private transcription";

/// Run the installed launcher with `--help` and check it answers.
#[tracing::instrument(skip(runtime))]
pub fn verify<R: Runtime>(runtime: R, prefix: Option<PathBuf>) -> Result<()> {
    let prefix = resolve_prefix(&runtime, prefix)?;
    let target = InstallTarget::under(&prefix);
    let launcher = &target.launcher_path;

    if !runtime.exists(launcher) {
        bail!(
            "inkoscribe is not installed: {} does not exist",
            launcher.display()
        );
    }

    let output = runtime.run_command(launcher, &["--help".to_string()])?;
    debug!("{} --help exited with {:?}", launcher.display(), output.status);

    if !output.success() {
        bail!(
            "{} --help failed with exit status {:?}: {}",
            launcher.display(),
            output.status,
            output.stderr.trim()
        );
    }
    if !output.stdout.contains(VERIFY_MARKER) && !output.stderr.contains(VERIFY_MARKER) {
        bail!(
            "{} --help did not print the expected banner",
            launcher.display()
        );
    }

    if !runtime.exists(&target.model_path) {
        println!(
            "Warning: the Whisper model is missing at {}",
            target.model_path.display()
        );
    }

    println!("==> {} is working", launcher.display());
    Ok(())
}

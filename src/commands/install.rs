use anyhow::Result;
use log::{debug, info, warn};
use std::error::Error as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    cleanup::new_shared,
    config::Config,
    download::Downloader,
    launcher::MODEL_PATH_ENV,
    platform::{HostDetector, OverrideDetector, PlatformDetector, PlatformOverrides},
    provision::{InstallReport, Provisioner},
    runtime::Runtime,
    source::BinarySource,
};

use super::caveats::CAVEATS;

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub binary: BinarySource,
    pub model_url: Option<String>,
    pub model_sha256: Option<String>,
    pub timeout: Option<Duration>,
    pub overrides: PlatformOverrides,
}

#[tracing::instrument(skip(runtime, prefix, options))]
pub async fn install<R: Runtime + 'static>(
    runtime: R,
    prefix: Option<PathBuf>,
    options: InstallOptions,
) -> Result<()> {
    let config = Config::new(runtime, prefix, options.timeout)?;
    if !options.overrides.is_empty() {
        info!("Using platform overrides: {:?}", options.overrides);
    }
    let detector = OverrideDetector::new(HostDetector, options.overrides.clone());
    run(config, &detector, options).await
}

#[tracing::instrument(skip(config, detector, options))]
pub async fn run<R: Runtime, D: Downloader, P: PlatformDetector>(
    config: Config<R, D>,
    detector: &P,
    options: InstallOptions,
) -> Result<()> {
    let platform = detector.detect();
    info!("Detected platform: {}", platform);

    let cleanup = new_shared();
    let cleanup_clone = Arc::clone(&cleanup);
    let ctrl_c_handler = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, cleaning up...");
            if let Ok(ctx) = cleanup_clone.lock() {
                ctx.cleanup();
            }
            std::process::exit(130);
        }
    });

    let mut provisioner = Provisioner::new(&config.runtime, &config.downloader, options.binary)
        .with_cleanup(cleanup)
        .with_model_sha256(options.model_sha256);
    if let Some(url) = options.model_url {
        provisioner = provisioner.with_model_url(url);
    }

    let result = provisioner.install(&platform, &config.prefix).await;

    ctrl_c_handler.abort();

    if let Err(e) = &result {
        if e.is_platform_gate() {
            debug!("{} rejected before any file was written", platform);
        }
    }
    let report = result?;
    print_summary(&config.runtime, &report);
    Ok(())
}

fn print_summary<R: Runtime>(runtime: &R, report: &InstallReport) {
    let target = &report.target;

    if let Err(e) = &report.model {
        warn!("Model step failed: {:?}", e);
        eprintln!("Warning: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        eprintln!(
            "inkoscribe will not start until {} exists. Run the install again to retry the download.",
            target.model_path.display()
        );
    }

    println!("==> Installed {}", target.launcher_path.display());
    println!("{}", model_location(report));
    println!(
        "You can override this by setting {} environment variable",
        MODEL_PATH_ENV
    );

    let path_var = runtime.env_var("PATH").ok();
    if let Some(hint) = path_hint(path_var.as_deref(), &target.bin_dir) {
        println!("{}", hint);
    }

    println!();
    print!("{}", CAVEATS);
}

fn model_location(report: &InstallReport) -> String {
    let model_path = report.target.model_path.display();
    if report.is_complete() {
        format!("The Whisper model is installed at: {}", model_path)
    } else {
        format!("The Whisper model will be installed at: {}", model_path)
    }
}

/// A note to extend PATH when `bin_dir` is not on it.
fn path_hint(path_var: Option<&str>, bin_dir: &Path) -> Option<String> {
    let on_path = path_var
        .map(|value| std::env::split_paths(value).any(|entry| entry == bin_dir))
        .unwrap_or(false);
    if on_path {
        None
    } else {
        Some(format!(
            "Note: {} is not on your PATH. Add it to run inkoscribe directly.",
            bin_dir.display()
        ))
    }
}

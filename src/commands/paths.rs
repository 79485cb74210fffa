use anyhow::Result;
use std::path::PathBuf;

use crate::layout::{InstallTarget, resolve_prefix};
use crate::runtime::Runtime;

/// Print where an install under `prefix` puts each file. Nothing is touched.
#[tracing::instrument(skip(runtime))]
pub fn paths<R: Runtime>(runtime: R, prefix: Option<PathBuf>, json: bool) -> Result<()> {
    let prefix = resolve_prefix(&runtime, prefix)?;
    print!("{}", render_paths(&InstallTarget::under(&prefix), json)?);
    Ok(())
}

pub fn render_paths(target: &InstallTarget, json: bool) -> Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(target)?;
        out.push('\n');
        return Ok(out);
    }

    let rows = [
        ("prefix", &target.prefix),
        ("launcher", &target.launcher_path),
        ("binary", &target.executable_path),
        ("model", &target.model_path),
    ];
    Ok(rows
        .iter()
        .map(|(label, path)| format!("{:<9}{}\n", label, path.display()))
        .collect())
}

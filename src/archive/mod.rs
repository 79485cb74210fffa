//! Release archive handling: digest verification and pulling one executable
//! out of a `.tar.gz`.

mod checksum;

use anyhow::{Context, Result, anyhow};
use flate2::read::GzDecoder;
use log::debug;
use std::io::Write as _;
use std::path::Path;
use tar::Archive;

use crate::runtime::Runtime;

pub use checksum::{digests_match, sha256_hex};

/// Extract the regular file called `name` (at any depth) from the gzipped
/// tarball at `archive_path` into `dest`.
#[tracing::instrument(skip(runtime))]
pub fn extract_executable<R: Runtime>(
    runtime: &R,
    archive_path: &Path,
    name: &str,
    dest: &Path,
) -> Result<u64> {
    let reader = runtime.open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(reader));

    for entry in archive.entries().context("Failed to read archive entries")? {
        let mut entry = entry.context("Failed to read archive entry")?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let entry_path = entry.path().context("Invalid path in archive")?.into_owned();
        if entry_path.file_name().and_then(|n| n.to_str()) != Some(name) {
            continue;
        }

        debug!(
            "Extracting {} to {}",
            entry_path.display(),
            dest.display()
        );
        let mut writer = runtime.create_file(dest)?;
        let bytes = std::io::copy(&mut entry, &mut writer)
            .with_context(|| format!("Failed to extract {}", entry_path.display()))?;
        writer.flush()?;
        return Ok(bytes);
    }

    Err(anyhow!(
        "No file named '{}' in {}",
        name,
        archive_path.display()
    ))
}

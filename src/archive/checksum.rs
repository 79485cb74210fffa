use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::io::Read;

/// Lowercase hex SHA-256 of everything `reader` yields.
pub fn sha256_hex<R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = reader
            .read(&mut buffer)
            .context("Failed to read data for checksum")?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compare hex digests, ignoring case and surrounding whitespace.
pub fn digests_match(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}

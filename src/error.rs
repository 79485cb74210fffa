//! Errors surfaced by the provisioner.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a CPU architecture was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchRejection {
    /// An Intel (x86-64) Mac: a known, explicitly unsupported architecture.
    Intel,
    /// Anything else, carrying the detected architecture name.
    Unknown(String),
}

impl fmt::Display for ArchRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchRejection::Intel => write!(
                f,
                "This application requires Apple Silicon (M1/M2/M3+) processors. Intel Macs are not supported."
            ),
            ArchRejection::Unknown(arch) => write!(
                f,
                "Unsupported CPU architecture ({}). This application only supports Apple Silicon processors.",
                arch
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("This application requires {required} or later. Current version: {detected}")]
    UnsupportedOsVersion { required: String, detected: String },

    #[error("{0}")]
    UnsupportedArchitecture(ArchRejection),

    #[error("Failed to download {url}")]
    DownloadError {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Failed to extract the inkoscribe binary from {archive}")]
    Archive {
        archive: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Filesystem operation failed on {}", .path.display())]
    FilesystemError {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl InstallError {
    pub fn filesystem(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        InstallError::FilesystemError {
            path: path.into(),
            source,
        }
    }

    pub fn download(url: impl Into<String>, source: anyhow::Error) -> Self {
        InstallError::DownloadError {
            url: url.into(),
            source,
        }
    }

    /// True for the fail-fast compatibility checks that run before any filesystem mutation.
    pub fn is_platform_gate(&self) -> bool {
        matches!(
            self,
            InstallError::UnsupportedOsVersion { .. } | InstallError::UnsupportedArchitecture(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_rejection_messages_differ() {
        let intel = InstallError::UnsupportedArchitecture(ArchRejection::Intel).to_string();
        let unknown =
            InstallError::UnsupportedArchitecture(ArchRejection::Unknown("riscv64".into()))
                .to_string();

        assert!(intel.contains("Intel Macs are not supported"));
        assert!(unknown.contains("Unsupported CPU architecture (riscv64)"));
        assert_ne!(intel, unknown);
    }

    #[test]
    fn test_os_version_message_names_requirement_and_detected() {
        let err = InstallError::UnsupportedOsVersion {
            required: "macOS 13 (Ventura)".into(),
            detected: "macOS 12.6".into(),
        };
        assert_eq!(
            err.to_string(),
            "This application requires macOS 13 (Ventura) or later. Current version: macOS 12.6"
        );
    }

    #[test]
    fn test_is_platform_gate() {
        assert!(InstallError::UnsupportedArchitecture(ArchRejection::Intel).is_platform_gate());
        assert!(
            !InstallError::download("https://example.com/m.bin", anyhow::anyhow!("boom"))
                .is_platform_gate()
        );
    }

    #[test]
    fn test_source_chain_is_preserved() {
        let err = InstallError::filesystem("/opt/x", anyhow::anyhow!("permission denied"));
        let chained = format!("{:#}", anyhow::Error::from(err));
        assert!(chained.contains("/opt/x"));
        assert!(chained.contains("permission denied"));
    }
}

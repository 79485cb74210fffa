//! Fail-fast platform checks, run before anything touches the disk.

use log::info;

use super::{CpuArch, OsKind, OsVersion, PlatformFact, macos_codename};
use crate::error::{ArchRejection, InstallError};

/// Minimum host the staged binary runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirements {
    pub os_kind: OsKind,
    pub min_os_version: OsVersion,
    pub cpu_arch: CpuArch,
}

impl Default for Requirements {
    /// macOS 13 (Ventura) or later on Apple Silicon.
    fn default() -> Self {
        Self {
            os_kind: OsKind::MacOs,
            min_os_version: OsVersion::new(13, 0, 0),
            cpu_arch: CpuArch::Aarch64,
        }
    }
}

impl Requirements {
    /// e.g. `macOS 13 (Ventura)`
    pub fn describe_os(&self) -> String {
        let major = self.min_os_version.major();
        let base = if self.min_os_version == OsVersion::new(major, 0, 0) {
            format!("{} {}", self.os_kind, major)
        } else {
            format!("{} {}", self.os_kind, self.min_os_version)
        };

        match (&self.os_kind, macos_codename(major)) {
            (OsKind::MacOs, Some(name)) => format!("{} ({})", base, name),
            _ => base,
        }
    }

    /// Run the OS/version gate, then the CPU gate.
    pub fn check(&self, platform: &PlatformFact) -> Result<(), InstallError> {
        self.check_os(platform)?;
        self.check_arch(platform)?;
        info!("Platform {} satisfies {}", platform, self.describe_os());
        Ok(())
    }

    pub fn check_os(&self, platform: &PlatformFact) -> Result<(), InstallError> {
        let new_enough = platform
            .os_version
            .as_ref()
            .is_some_and(|version| *version >= self.min_os_version);

        if platform.os_kind == self.os_kind && new_enough {
            return Ok(());
        }

        Err(InstallError::UnsupportedOsVersion {
            required: self.describe_os(),
            detected: platform.describe_os(),
        })
    }

    pub fn check_arch(&self, platform: &PlatformFact) -> Result<(), InstallError> {
        if platform.cpu_arch == self.cpu_arch {
            return Ok(());
        }

        let rejection = match &platform.cpu_arch {
            CpuArch::X86_64 => ArchRejection::Intel,
            other => ArchRejection::Unknown(other.to_string()),
        };
        Err(InstallError::UnsupportedArchitecture(rejection))
    }
}

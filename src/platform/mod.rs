//! Host platform facts and the compatibility gate.
//!
//! The provisioner never queries the host directly. It receives a
//! [`PlatformFact`] produced once by a [`PlatformDetector`], which keeps the
//! gate logic deterministic under test.

mod gate;
mod version;

use anyhow::Result;
use std::fmt;

pub use gate::Requirements;
pub use version::{OsVersion, macos_codename};

/// Operating system family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsKind {
    MacOs,
    Linux,
    Windows,
    Other(String),
}

impl From<&str> for OsKind {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "mac" | "osx" => OsKind::MacOs,
            "linux" => OsKind::Linux,
            "windows" => OsKind::Windows,
            other => OsKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsKind::MacOs => write!(f, "macOS"),
            OsKind::Linux => write!(f, "Linux"),
            OsKind::Windows => write!(f, "Windows"),
            OsKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// CPU architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuArch {
    Aarch64,
    X86_64,
    Other(String),
}

impl From<&str> for CpuArch {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "aarch64" | "arm64" => CpuArch::Aarch64,
            "x86_64" | "amd64" | "x64" | "intel" => CpuArch::X86_64,
            other => CpuArch::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CpuArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuArch::Aarch64 => write!(f, "arm64"),
            CpuArch::X86_64 => write!(f, "x86_64"),
            CpuArch::Other(name) => write!(f, "{}", name),
        }
    }
}

/// What the installer learned about the host. Read once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformFact {
    pub os_kind: OsKind,
    /// `None` when the host would not report a parseable version.
    pub os_version: Option<OsVersion>,
    pub cpu_arch: CpuArch,
}

impl PlatformFact {
    pub fn new(os_kind: OsKind, os_version: Option<OsVersion>, cpu_arch: CpuArch) -> Self {
        Self {
            os_kind,
            os_version,
            cpu_arch,
        }
    }

    /// Human readable OS description, e.g. `macOS 14.2`.
    pub fn describe_os(&self) -> String {
        match &self.os_version {
            Some(version) => format!("{} {}", self.os_kind, version),
            None => format!("{} (unknown version)", self.os_kind),
        }
    }
}

impl fmt::Display for PlatformFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.describe_os(), self.cpu_arch)
    }
}

/// Query the running host.
pub fn detect_platform() -> PlatformFact {
    PlatformFact {
        os_kind: OsKind::from(std::env::consts::OS),
        os_version: sysinfo::System::os_version().and_then(|v| v.parse().ok()),
        cpu_arch: host_cpu_arch(std::env::consts::ARCH, arm64_hardware().as_deref()),
    }
}

/// CPU of the machine rather than of this build.
///
/// An x86_64 build running under Rosetta reports `x86_64` at compile time while
/// `sysctl hw.optional.arm64` still answers `1`.
pub fn host_cpu_arch(compiled_arch: &str, hw_optional_arm64: Option<&str>) -> CpuArch {
    match (CpuArch::from(compiled_arch), hw_optional_arm64.map(str::trim)) {
        (CpuArch::X86_64, Some("1")) => CpuArch::Aarch64,
        (arch, _) => arch,
    }
}

#[cfg(target_os = "macos")]
fn arm64_hardware() -> Option<String> {
    let output = std::process::Command::new("/usr/sbin/sysctl")
        .args(["-n", "hw.optional.arm64"])
        .output()
        .ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(not(target_os = "macos"))]
fn arm64_hardware() -> Option<String> {
    None
}

/// Source of platform facts (swappable in tests).
#[cfg_attr(test, mockall::automock)]
pub trait PlatformDetector: Send + Sync {
    fn detect(&self) -> PlatformFact;
}

/// Detector backed by [`detect_platform`].
pub struct HostDetector;

impl PlatformDetector for HostDetector {
    fn detect(&self) -> PlatformFact {
        detect_platform()
    }
}

/// Explicit facts that replace whatever the host reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformOverrides {
    pub os_kind: Option<OsKind>,
    pub os_version: Option<OsVersion>,
    pub cpu_arch: Option<CpuArch>,
}

impl PlatformOverrides {
    pub fn parse(
        os_kind: Option<&str>,
        os_version: Option<&str>,
        cpu_arch: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            os_kind: os_kind.map(OsKind::from),
            os_version: os_version.map(str::parse).transpose()?,
            cpu_arch: cpu_arch.map(CpuArch::from),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.os_kind.is_none() && self.os_version.is_none() && self.cpu_arch.is_none()
    }
}

/// Wraps another detector and applies [`PlatformOverrides`] on top of it.
pub struct OverrideDetector<D: PlatformDetector> {
    inner: D,
    overrides: PlatformOverrides,
}

impl<D: PlatformDetector> OverrideDetector<D> {
    pub fn new(inner: D, overrides: PlatformOverrides) -> Self {
        Self { inner, overrides }
    }
}

impl<D: PlatformDetector> PlatformDetector for OverrideDetector<D> {
    fn detect(&self) -> PlatformFact {
        let detected = self.inner.detect();
        PlatformFact {
            os_kind: self.overrides.os_kind.clone().unwrap_or(detected.os_kind),
            os_version: self.overrides.os_version.clone().or(detected.os_version),
            cpu_arch: self.overrides.cpu_arch.clone().unwrap_or(detected.cpu_arch),
        }
    }
}

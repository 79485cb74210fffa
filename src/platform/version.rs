//! Operating system version identifiers.

use anyhow::{Result, anyhow};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A dotted numeric version such as `13`, `14.2` or `15.0.1`.
///
/// Ordering is total and ignores trailing zero components, so `13 == 13.0.0`.
/// Display keeps the text the version was parsed from.
#[derive(Debug, Clone)]
pub struct OsVersion {
    components: Vec<u64>,
    raw: String,
}

impl OsVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            components: vec![major, minor, patch],
            raw: format!("{}.{}.{}", major, minor, patch),
        }
    }

    pub fn major(&self) -> u64 {
        self.components.first().copied().unwrap_or(0)
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for OsVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Empty OS version"));
        }

        let components = trimmed
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| anyhow!("Invalid OS version '{}'", trimmed))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            components,
            raw: trimmed.to_string(),
        })
    }
}

impl Ord for OsVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for OsVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OsVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OsVersion {}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Marketing name of a macOS major release.
pub fn macos_codename(major: u64) -> Option<&'static str> {
    match major {
        11 => Some("Big Sur"),
        12 => Some("Monterey"),
        13 => Some("Ventura"),
        14 => Some("Sonoma"),
        15 => Some("Sequoia"),
        26 => Some("Tahoe"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> OsVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(v("14.2.1").to_string(), "14.2.1");
        assert_eq!(v(" 13 ").to_string(), "13");
        assert_eq!(v("13.4").major(), 13);
    }

    #[test]
    fn test_display_keeps_leading_zeros() {
        assert_eq!(v("22.04").to_string(), "22.04");
        assert_eq!(v("13.06").to_string(), "13.06");
        assert_eq!(v("22.04"), v("22.4"));
        assert_eq!(OsVersion::new(13, 0, 0).to_string(), "13.0.0");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<OsVersion>().is_err());
        assert!("13.x".parse::<OsVersion>().is_err());
        assert!("ventura".parse::<OsVersion>().is_err());
        assert!("13..1".parse::<OsVersion>().is_err());
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(v("13"), v("13.0"));
        assert_eq!(v("13"), v("13.0.0"));
        assert_eq!(OsVersion::new(13, 0, 0), v("13"));
    }

    #[test]
    fn test_ordering_is_numeric_not_lexical() {
        assert!(v("12.7.6") < v("13"));
        assert!(v("13.0.1") > v("13"));
        assert!(v("10.15") < v("11.0"));
        assert!(v("13.10") > v("13.9"));
        assert!(v("26.0") > v("15.6"));
    }

    #[test]
    fn test_sorting() {
        let mut versions = vec![v("14.1"), v("12.6"), v("13"), v("13.0.1")];
        versions.sort();
        let rendered: Vec<String> = versions.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["12.6", "13", "13.0.1", "14.1"]);
    }

    #[test]
    fn test_macos_codename() {
        assert_eq!(macos_codename(13), Some("Ventura"));
        assert_eq!(macos_codename(14), Some("Sonoma"));
        assert_eq!(macos_codename(99), None);
    }
}

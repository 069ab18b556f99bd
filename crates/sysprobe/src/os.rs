//! OS release detection.
//!
//! Saidata override files are keyed by `<os>/<version>`, e.g. `ubuntu/22.04`.
//! On Linux the identity comes from `/etc/os-release`, falling back to
//! `/etc/lsb-release`, and finally to a generic `linux`/`unknown` pair.
//! macOS and Windows report fixed best-effort values.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Version reported when the release cannot be determined.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Identity of the running OS, as used for override lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsRelease {
    /// Lowercase distribution or OS identifier (e.g. "ubuntu", "macos").
    pub id: String,
    /// Version identifier (e.g. "22.04"), or "unknown".
    pub version: String,
}

impl OsRelease {
    /// Create a new release identity.
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }

    /// Generic identity for an OS whose release is unknown.
    pub fn generic(id: &str) -> Self {
        Self::new(id, UNKNOWN_VERSION)
    }
}

impl std::fmt::Display for OsRelease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.id, self.version)
    }
}

/// Parse `KEY=value` lines, stripping optional quotes.
fn parse_key_values(content: &str) -> impl Iterator<Item = (&str, &str)> {
    content.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        Some((key.trim(), value.trim().trim_matches('"').trim_matches('\'')))
    })
}

/// Parse the contents of `/etc/os-release`.
///
/// Returns `None` when no `ID` is present.
pub fn parse_os_release(content: &str) -> Option<OsRelease> {
    let mut id = None;
    let mut version = None;

    for (key, value) in parse_key_values(content) {
        match key {
            "ID" if !value.is_empty() => id = Some(value.to_lowercase()),
            "VERSION_ID" if !value.is_empty() => version = Some(value.to_string()),
            _ => {}
        }
    }

    id.map(|id| OsRelease::new(id, version.unwrap_or_else(|| UNKNOWN_VERSION.to_string())))
}

/// Parse the contents of `/etc/lsb-release`.
///
/// Returns `None` when no `DISTRIB_ID` is present.
pub fn parse_lsb_release(content: &str) -> Option<OsRelease> {
    let mut id = None;
    let mut version = None;

    for (key, value) in parse_key_values(content) {
        match key {
            "DISTRIB_ID" if !value.is_empty() => id = Some(value.to_lowercase()),
            "DISTRIB_RELEASE" if !value.is_empty() => version = Some(value.to_string()),
            _ => {}
        }
    }

    id.map(|id| OsRelease::new(id, version.unwrap_or_else(|| UNKNOWN_VERSION.to_string())))
}

/// Read an optional release file. A missing file is `Ok(None)`.
fn read_release_file(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Detect the Linux release from the files under `root`.
///
/// `root` is `/` in production; tests point it at a temporary directory.
/// Unreadable files are errors, missing or unparsable files fall through to
/// the next source and finally to `linux`/`unknown`.
pub fn detect_linux_release(root: &Path) -> Result<OsRelease> {
    let os_release = root.join("etc").join("os-release");
    if let Some(content) = read_release_file(&os_release)? {
        if let Some(release) = parse_os_release(&content) {
            log::debug!("Detected OS {release} from {}", os_release.display());
            return Ok(release);
        }
    }

    let lsb_release = root.join("etc").join("lsb-release");
    if let Some(content) = read_release_file(&lsb_release)? {
        if let Some(release) = parse_lsb_release(&content) {
            log::debug!("Detected OS {release} from {}", lsb_release.display());
            return Ok(release);
        }
    }

    log::debug!("No release files found, using generic linux identity");
    Ok(OsRelease::generic("linux"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UBUNTU: &str = r#"NAME="Ubuntu"
VERSION="22.04.3 LTS (Jammy Jellyfish)"
ID=ubuntu
ID_LIKE=debian
VERSION_ID="22.04"
"#;

    #[test]
    fn test_parse_os_release() {
        let release = parse_os_release(UBUNTU).unwrap();
        assert_eq!(release, OsRelease::new("ubuntu", "22.04"));
    }

    #[test]
    fn test_parse_os_release_without_version() {
        let release = parse_os_release("ID=arch\nNAME=\"Arch Linux\"\n").unwrap();
        assert_eq!(release, OsRelease::new("arch", "unknown"));
    }

    #[test]
    fn test_parse_os_release_missing_id() {
        assert!(parse_os_release("NAME=Foo\n# comment\n").is_none());
    }

    #[test]
    fn test_parse_lsb_release() {
        let content = "DISTRIB_ID=Ubuntu\nDISTRIB_RELEASE=20.04\nDISTRIB_CODENAME=focal\n";
        let release = parse_lsb_release(content).unwrap();
        assert_eq!(release, OsRelease::new("ubuntu", "20.04"));
    }

    #[test]
    fn test_detect_prefers_os_release() {
        let dir = TempDir::new().unwrap();
        let etc = dir.path().join("etc");
        fs::create_dir_all(&etc).unwrap();
        fs::write(etc.join("os-release"), "ID=debian\nVERSION_ID=\"12\"\n").unwrap();
        fs::write(etc.join("lsb-release"), "DISTRIB_ID=Ubuntu\nDISTRIB_RELEASE=20.04\n").unwrap();

        let release = detect_linux_release(dir.path()).unwrap();
        assert_eq!(release, OsRelease::new("debian", "12"));
    }

    #[test]
    fn test_detect_falls_back_to_lsb_release() {
        let dir = TempDir::new().unwrap();
        let etc = dir.path().join("etc");
        fs::create_dir_all(&etc).unwrap();
        fs::write(etc.join("lsb-release"), "DISTRIB_ID=LinuxMint\nDISTRIB_RELEASE=21\n").unwrap();

        let release = detect_linux_release(dir.path()).unwrap();
        assert_eq!(release, OsRelease::new("linuxmint", "21"));
    }

    #[test]
    fn test_detect_generic_when_nothing_present() {
        let dir = TempDir::new().unwrap();
        let release = detect_linux_release(dir.path()).unwrap();
        assert_eq!(release, OsRelease::generic("linux"));
        assert_eq!(release.to_string(), "linux/unknown");
    }
}

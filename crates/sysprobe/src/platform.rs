//! Platform strategy objects.
//!
//! Everything that differs between Linux, macOS and Windows lives behind the
//! [`Platform`] trait: how services are discovered, what counts as an
//! executable, where software conventionally keeps its files, and how the OS
//! release is identified. Consumers receive an `Arc<dyn Platform>` and never
//! branch on the host OS themselves.
//!
//! # Example
//!
//! ```no_run
//! use sysprobe::platform;
//!
//! let platform = platform::detect().expect("unsupported platform");
//! println!("Service manager: {}", platform.service_type());
//! ```

use crate::error::{Error, Result};
use crate::os::{self, OsRelease};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Supported host operating systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Linux (any distribution)
    Linux,
    /// macOS
    #[serde(rename = "macos")]
    MacOs,
    /// Windows
    Windows,
}

impl Os {
    /// Identifier used in saidata and provider documents.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::MacOs => "macos",
            Os::Windows => "windows",
        }
    }

    /// Parse an OS identifier, accepting common aliases.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Some(Os::Linux),
            "macos" | "darwin" | "osx" => Some(Os::MacOs),
            "windows" | "win32" => Some(Os::Windows),
            _ => None,
        }
    }

    /// The OS this binary was compiled for.
    pub fn current() -> Option<Self> {
        Self::from_name(std::env::consts::OS)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Conventional locations where a piece of software keeps its resources.
///
/// The first config file is the primary guess; the rest are alternates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConventionalPaths {
    /// Configuration files, primary first.
    pub config_files: Vec<PathBuf>,
    /// Log files.
    pub log_files: Vec<PathBuf>,
    /// Executable locations.
    pub binaries: Vec<PathBuf>,
    /// Configuration directories.
    pub config_dirs: Vec<PathBuf>,
    /// Data and state directories.
    pub data_dirs: Vec<PathBuf>,
    /// Log directories.
    pub log_dirs: Vec<PathBuf>,
}

/// Platform capability provider.
///
/// One implementation exists per supported OS, plus [`MockPlatform`] for tests.
pub trait Platform: Send + Sync + fmt::Debug {
    /// The OS this strategy describes.
    fn os(&self) -> Os;

    /// Conventional service type for generated saidata.
    fn service_type(&self) -> &'static str {
        match self.os() {
            Os::Linux => "systemd",
            Os::MacOs => "launchd",
            Os::Windows => "windows_service",
        }
    }

    /// Whether the service manager knows a service with this name.
    ///
    /// Any lookup failure is reported as `false`.
    fn service_exists(&self, name: &str) -> bool;

    /// Whether an absolute path points at an executable file.
    fn is_executable(&self, path: &Path) -> bool;

    /// Resolve a bare command name through the search path.
    fn find_in_path(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }

    /// Identify the running OS release.
    fn release(&self) -> Result<OsRelease>;

    /// Conventional resource locations for `name` on this platform.
    fn conventional_paths(&self, name: &str) -> ConventionalPaths;
}

/// Detect the current platform.
///
/// # Errors
///
/// Returns `Error::UnsupportedPlatform` when the host is not Linux, macOS or
/// Windows.
pub fn detect() -> Result<Arc<dyn Platform>> {
    match Os::current() {
        Some(Os::Linux) => Ok(Arc::new(LinuxPlatform::new())),
        Some(Os::MacOs) => Ok(Arc::new(MacOsPlatform)),
        Some(Os::Windows) => Ok(Arc::new(WindowsPlatform)),
        None => Err(Error::UnsupportedPlatform {
            os: std::env::consts::OS.to_string(),
        }),
    }
}

/// Run a command silently and capture stdout on success.
fn capture(cmd: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;

    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        None
    }
}

/// Check the POSIX execute bits of a regular file.
#[cfg(unix)]
fn has_execute_bit(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn has_execute_bit(path: &Path) -> bool {
    path.is_file()
}

// ============================================================================
// Linux
// ============================================================================

/// Linux with systemd.
#[derive(Debug, Clone)]
pub struct LinuxPlatform {
    root: PathBuf,
}

impl LinuxPlatform {
    /// Platform rooted at `/`.
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/"),
        }
    }

    /// Platform that reads release files below `root` instead of `/`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for LinuxPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for LinuxPlatform {
    fn os(&self) -> Os {
        Os::Linux
    }

    fn service_exists(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let unit = format!("{name}.service");
        capture(
            "systemctl",
            &["list-unit-files", &unit, "--no-legend", "--no-pager"],
        )
        .is_some_and(|out| out.lines().any(|line| line.split_whitespace().next() == Some(unit.as_str())))
    }

    fn is_executable(&self, path: &Path) -> bool {
        has_execute_bit(path)
    }

    fn release(&self) -> Result<OsRelease> {
        os::detect_linux_release(&self.root)
    }

    fn conventional_paths(&self, name: &str) -> ConventionalPaths {
        ConventionalPaths {
            config_files: vec![
                PathBuf::from(format!("/etc/{name}/{name}.conf")),
                PathBuf::from(format!("/etc/{name}.conf")),
                PathBuf::from(format!("/etc/{name}/config")),
            ],
            log_files: vec![PathBuf::from(format!("/var/log/{name}/{name}.log"))],
            binaries: vec![
                PathBuf::from(format!("/usr/bin/{name}")),
                PathBuf::from(format!("/usr/sbin/{name}")),
                PathBuf::from(format!("/usr/local/bin/{name}")),
            ],
            config_dirs: vec![PathBuf::from(format!("/etc/{name}"))],
            data_dirs: vec![PathBuf::from(format!("/var/lib/{name}"))],
            log_dirs: vec![PathBuf::from(format!("/var/log/{name}"))],
        }
    }
}

// ============================================================================
// macOS
// ============================================================================

/// macOS with launchd and Homebrew conventions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacOsPlatform;

impl Platform for MacOsPlatform {
    fn os(&self) -> Os {
        Os::MacOs
    }

    fn service_exists(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        capture("launchctl", &["list"]).is_some_and(|out| {
            out.lines()
                .filter_map(|line| line.split_whitespace().last())
                .any(|label| label == name || label.ends_with(&format!(".{name}")))
        })
    }

    fn is_executable(&self, path: &Path) -> bool {
        has_execute_bit(path)
    }

    fn release(&self) -> Result<OsRelease> {
        Ok(OsRelease::generic("macos"))
    }

    fn conventional_paths(&self, name: &str) -> ConventionalPaths {
        ConventionalPaths {
            config_files: vec![
                PathBuf::from(format!("/opt/homebrew/etc/{name}/{name}.conf")),
                PathBuf::from(format!("/usr/local/etc/{name}/{name}.conf")),
            ],
            log_files: vec![PathBuf::from(format!(
                "/opt/homebrew/var/log/{name}/{name}.log"
            ))],
            binaries: vec![
                PathBuf::from(format!("/opt/homebrew/bin/{name}")),
                PathBuf::from(format!("/usr/local/bin/{name}")),
            ],
            config_dirs: vec![
                PathBuf::from(format!("/opt/homebrew/etc/{name}")),
                PathBuf::from(format!("/usr/local/etc/{name}")),
            ],
            data_dirs: vec![PathBuf::from(format!("/opt/homebrew/var/{name}"))],
            log_dirs: vec![PathBuf::from(format!("/opt/homebrew/var/log/{name}"))],
        }
    }
}

// ============================================================================
// Windows
// ============================================================================

/// Extensions treated as executable on Windows.
pub const WINDOWS_EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "bat", "cmd", "com", "ps1"];

/// Windows with the service control manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPlatform;

impl Platform for WindowsPlatform {
    fn os(&self) -> Os {
        Os::Windows
    }

    fn service_exists(&self, name: &str) -> bool {
        !name.is_empty() && capture("sc", &["query", name]).is_some()
    }

    fn is_executable(&self, path: &Path) -> bool {
        let known_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                WINDOWS_EXECUTABLE_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            });
        known_extension && path.is_file()
    }

    fn release(&self) -> Result<OsRelease> {
        Ok(OsRelease::generic("windows"))
    }

    fn conventional_paths(&self, name: &str) -> ConventionalPaths {
        let program_files = PathBuf::from(r"C:\Program Files").join(name);
        let program_data = PathBuf::from(r"C:\ProgramData").join(name);
        ConventionalPaths {
            config_files: vec![program_files.join(format!("{name}.conf"))],
            log_files: vec![program_data.join("logs").join(format!("{name}.log"))],
            binaries: vec![program_files.join(format!("{name}.exe"))],
            log_dirs: vec![program_data.join("logs")],
            config_dirs: vec![program_files],
            data_dirs: vec![program_data],
        }
    }
}

// ============================================================================
// Mock
// ============================================================================

/// Deterministic platform for tests.
///
/// Conventional paths are laid out below `root` using the Linux layout, so a
/// test can create exactly the files it wants the probes to find. Services
/// and search-path commands are explicit sets.
#[derive(Debug, Clone)]
pub struct MockPlatform {
    os: Os,
    root: PathBuf,
    release: Option<OsRelease>,
    services: HashSet<String>,
    path_commands: HashSet<String>,
}

impl MockPlatform {
    /// Create a mock Linux platform rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            os: Os::Linux,
            root: root.into(),
            release: Some(OsRelease::new("ubuntu", "22.04")),
            services: HashSet::new(),
            path_commands: HashSet::new(),
        }
    }

    /// Pretend to be a different OS.
    pub fn with_os(mut self, os: Os) -> Self {
        self.os = os;
        self
    }

    /// Set the release; `None` makes release detection fail.
    pub fn with_release(mut self, release: Option<OsRelease>) -> Self {
        self.release = release;
        self
    }

    /// Register a service as known to the service manager.
    pub fn with_service(mut self, name: impl Into<String>) -> Self {
        self.services.insert(name.into());
        self
    }

    /// Register a command as resolvable through the search path.
    pub fn with_path_command(mut self, name: impl Into<String>) -> Self {
        self.path_commands.insert(name.into());
        self
    }

    /// Root directory conventional paths are placed under.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Platform for MockPlatform {
    fn os(&self) -> Os {
        self.os
    }

    fn service_exists(&self, name: &str) -> bool {
        self.services.contains(name)
    }

    fn is_executable(&self, path: &Path) -> bool {
        has_execute_bit(path)
    }

    fn find_in_path(&self, name: &str) -> Option<PathBuf> {
        self.path_commands
            .contains(name)
            .then(|| self.root.join("bin").join(name))
    }

    fn release(&self) -> Result<OsRelease> {
        self.release
            .clone()
            .ok_or_else(|| Error::OsDetection("mock release not configured".to_string()))
    }

    fn conventional_paths(&self, name: &str) -> ConventionalPaths {
        let etc = self.root.join("etc");
        ConventionalPaths {
            config_files: vec![
                etc.join(name).join(format!("{name}.conf")),
                etc.join(format!("{name}.conf")),
            ],
            log_files: vec![self.root.join("var/log").join(name).join(format!("{name}.log"))],
            binaries: vec![
                self.root.join("usr/bin").join(name),
                self.root.join("usr/sbin").join(name),
            ],
            config_dirs: vec![etc.join(name)],
            data_dirs: vec![self.root.join("var/lib").join(name)],
            log_dirs: vec![self.root.join("var/log").join(name)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_platform() {
        let platform = detect().expect("should detect platform");
        assert_eq!(Some(platform.os()), Os::current());
    }

    #[test]
    fn test_os_from_name_aliases() {
        assert_eq!(Os::from_name("darwin"), Some(Os::MacOs));
        assert_eq!(Os::from_name("MacOS"), Some(Os::MacOs));
        assert_eq!(Os::from_name("linux"), Some(Os::Linux));
        assert_eq!(Os::from_name("win32"), Some(Os::Windows));
        assert_eq!(Os::from_name("haiku"), None);
    }

    #[test]
    fn test_service_types() {
        assert_eq!(LinuxPlatform::new().service_type(), "systemd");
        assert_eq!(MacOsPlatform.service_type(), "launchd");
        assert_eq!(WindowsPlatform.service_type(), "windows_service");
    }

    #[test]
    fn test_linux_conventional_paths() {
        let paths = LinuxPlatform::new().conventional_paths("nginx");
        assert_eq!(
            paths.config_files[0],
            PathBuf::from("/etc/nginx/nginx.conf")
        );
        assert!(paths.config_files.contains(&PathBuf::from("/etc/nginx.conf")));
        assert!(paths.binaries.contains(&PathBuf::from("/usr/sbin/nginx")));
    }

    #[test]
    fn test_macos_conventional_paths() {
        let paths = MacOsPlatform.conventional_paths("redis");
        assert_eq!(
            paths.config_files[0],
            PathBuf::from("/opt/homebrew/etc/redis/redis.conf")
        );
    }

    #[test]
    fn test_windows_conventional_paths() {
        let paths = WindowsPlatform.conventional_paths("redis");
        assert!(paths.config_files[0].to_string_lossy().contains("Program Files"));
        assert!(paths.binaries[0].to_string_lossy().ends_with("redis.exe"));
    }

    #[test]
    fn test_empty_service_name_never_exists() {
        assert!(!LinuxPlatform::new().service_exists(""));
        assert!(!MacOsPlatform.service_exists(""));
        assert!(!WindowsPlatform.service_exists(""));
    }

    #[test]
    fn test_windows_requires_known_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("tool.sh");
        let exe = dir.path().join("tool.EXE");
        std::fs::write(&script, "").unwrap();
        std::fs::write(&exe, "").unwrap();

        assert!(!WindowsPlatform.is_executable(&script));
        assert!(WindowsPlatform.is_executable(&exe));
        assert!(!WindowsPlatform.is_executable(&dir.path().join("missing.exe")));
    }

    #[test]
    fn test_linux_release_from_root() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("etc")).unwrap();
        std::fs::write(dir.path().join("etc/os-release"), "ID=fedora\nVERSION_ID=39\n").unwrap();

        let release = LinuxPlatform::with_root(dir.path()).release().unwrap();
        assert_eq!(release, OsRelease::new("fedora", "39"));
    }

    #[test]
    fn test_mock_platform() {
        let mock = MockPlatform::new("/tmp/mock")
            .with_service("nginx")
            .with_path_command("nginx")
            .with_release(None);

        assert!(mock.service_exists("nginx"));
        assert!(!mock.service_exists("apache2"));
        assert_eq!(
            mock.find_in_path("nginx"),
            Some(PathBuf::from("/tmp/mock/bin/nginx"))
        );
        assert!(mock.find_in_path("apache2").is_none());
        assert!(mock.release().is_err());
    }
}

//! Live resource probes.
//!
//! Each probe is an independent boolean check with no side effects beyond the
//! check itself. Probes block, but every blocking step is bounded: port
//! checks use a connect timeout, service checks spawn a short-lived query.

use crate::platform::Platform;
use std::fs;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for TCP port checks.
pub const DEFAULT_PORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Highest valid TCP port.
pub const MAX_PORT: u32 = 65535;

/// Validates that files, directories, commands, services and ports exist.
///
/// Holds no mutable state; it is safe to share across threads.
#[derive(Debug, Clone)]
pub struct ResourceValidator {
    platform: Arc<dyn Platform>,
    port_timeout: Duration,
}

impl ResourceValidator {
    /// Create a validator for the given platform with the default timeout.
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            port_timeout: DEFAULT_PORT_TIMEOUT,
        }
    }

    /// Set the TCP connect timeout used by [`validate_port`](Self::validate_port).
    pub fn with_port_timeout(mut self, timeout: Duration) -> Self {
        self.port_timeout = timeout;
        self
    }

    /// The platform strategy this validator probes through.
    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    /// The configured port timeout.
    pub fn port_timeout(&self) -> Duration {
        self.port_timeout
    }

    /// Check that `path` is an existing regular file.
    pub fn validate_file(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        fs::metadata(path).is_ok_and(|meta| meta.is_file())
    }

    /// Check that `path` is an existing directory.
    pub fn validate_directory(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        fs::metadata(path).is_ok_and(|meta| meta.is_dir())
    }

    /// Check that a command is executable.
    ///
    /// Absolute paths are checked directly; bare names are resolved through
    /// the search path.
    pub fn validate_command(&self, command: &str) -> bool {
        if command.is_empty() {
            return false;
        }
        let path = Path::new(command);
        if path.is_absolute() {
            self.platform.is_executable(path)
        } else {
            self.platform.find_in_path(command).is_some()
        }
    }

    /// Check that the platform service manager knows this service.
    pub fn validate_service(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let found = self.platform.service_exists(name);
        log::debug!("Service {name} present: {found}");
        found
    }

    /// Check that something is listening on a localhost TCP port.
    ///
    /// Ports outside `1..=65535` are always closed. Connection failures,
    /// including timeouts, report closed.
    pub fn validate_port(&self, port: u32) -> bool {
        if port == 0 || port > MAX_PORT {
            return false;
        }
        let Ok(addrs) = ("localhost", port as u16).to_socket_addrs() else {
            return false;
        };
        let addrs: Vec<SocketAddr> = addrs.collect();
        let open = addrs
            .iter()
            .any(|addr| TcpStream::connect_timeout(addr, self.port_timeout).is_ok());
        log::debug!("Port {port} open: {open}");
        open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatform;
    use std::net::TcpListener;
    use tempfile::TempDir;

    fn validator(dir: &TempDir) -> ResourceValidator {
        ResourceValidator::new(Arc::new(
            MockPlatform::new(dir.path())
                .with_service("nginx")
                .with_path_command("nginx"),
        ))
        .with_port_timeout(Duration::from_millis(500))
    }

    #[test]
    fn test_validate_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("nginx.conf");
        fs::write(&file, "worker_processes 1;").unwrap();
        let v = validator(&dir);

        assert!(v.validate_file(file.to_str().unwrap()));
        assert!(!v.validate_file(dir.path().to_str().unwrap()));
        assert!(!v.validate_file(dir.path().join("missing").to_str().unwrap()));
        assert!(!v.validate_file(""));
    }

    #[test]
    fn test_validate_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "").unwrap();
        let v = validator(&dir);

        assert!(v.validate_directory(dir.path().to_str().unwrap()));
        assert!(!v.validate_directory(file.to_str().unwrap()));
        assert!(!v.validate_directory(""));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_command_absolute() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let exe = dir.path().join("tool");
        let plain = dir.path().join("data");
        fs::write(&exe, "#!/bin/sh\n").unwrap();
        fs::write(&plain, "").unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
        fs::set_permissions(&plain, fs::Permissions::from_mode(0o644)).unwrap();
        let v = validator(&dir);

        assert!(v.validate_command(exe.to_str().unwrap()));
        assert!(!v.validate_command(plain.to_str().unwrap()));
        assert!(!v.validate_command(dir.path().to_str().unwrap()));
    }

    #[test]
    fn test_validate_command_search_path() {
        let dir = TempDir::new().unwrap();
        let v = validator(&dir);

        assert!(v.validate_command("nginx"));
        assert!(!v.validate_command("apache2"));
        assert!(!v.validate_command(""));
    }

    #[test]
    fn test_validate_service() {
        let dir = TempDir::new().unwrap();
        let v = validator(&dir);

        assert!(v.validate_service("nginx"));
        assert!(!v.validate_service("postgresql"));
        assert!(!v.validate_service(""));
    }

    #[test]
    fn test_validate_port_open_listener() {
        let dir = TempDir::new().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = u32::from(listener.local_addr().unwrap().port());

        assert!(validator(&dir).validate_port(port));
    }

    #[test]
    fn test_validate_port_out_of_range() {
        let dir = TempDir::new().unwrap();
        let v = validator(&dir);

        assert!(!v.validate_port(0));
        assert!(!v.validate_port(70000));
    }

    #[test]
    fn test_validate_port_closed() {
        let dir = TempDir::new().unwrap();
        // Bind then drop to obtain a port nothing is listening on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            u32::from(listener.local_addr().unwrap().port())
        };

        assert!(!validator(&dir).validate_port(port));
    }

    #[test]
    fn test_default_timeout() {
        let dir = TempDir::new().unwrap();
        let v = ResourceValidator::new(Arc::new(MockPlatform::new(dir.path())));
        assert_eq!(v.port_timeout(), DEFAULT_PORT_TIMEOUT);
    }
}

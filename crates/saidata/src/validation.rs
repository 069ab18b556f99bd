//! Aggregate resource validation for a whole document.
//!
//! Every entity in a [`SoftwareData`] document is checked through the
//! [`ResourceValidator`]. Checks are independent and blocking, so each
//! resource class is fanned out over the rayon pool. Failures never become
//! errors; they are collected into the missing lists of [`ValidationResult`].

use crate::types::SoftwareData;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use sysprobe::ResourceValidator;

/// Outcome of validating a document against the live system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// True when no file, directory, command or service is missing.
    pub valid: bool,
    /// Whether the action may still be attempted.
    pub can_proceed: bool,
    /// Files that do not exist.
    pub missing_files: Vec<String>,
    /// Directories that do not exist.
    pub missing_directories: Vec<String>,
    /// Commands that cannot be resolved.
    pub missing_commands: Vec<String>,
    /// Services unknown to the service manager.
    pub missing_services: Vec<String>,
    /// Ports with no listener (only checked for port-sensitive actions).
    pub closed_ports: Vec<u16>,
    /// Human-readable warnings.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Total number of missing resources.
    pub fn missing_count(&self) -> usize {
        self.missing_files.len()
            + self.missing_directories.len()
            + self.missing_commands.len()
            + self.missing_services.len()
    }
}

/// How an action relates to the resources it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionClass {
    /// Read-only queries.
    InfoOnly,
    /// Installation creates resources, so nothing needs to exist yet.
    Install,
    /// Uninstall or upgrade of something that should already be there.
    Modify,
    /// Starting a service.
    Start,
    /// Stopping a service.
    Stop,
    /// Anything not recognised.
    Unknown,
}

const INFO_ONLY_ACTIONS: &[&str] = &[
    "search", "info", "version", "status", "logs", "config", "check", "cpu", "memory", "io",
    "list", "stats",
];

const PORT_SENSITIVE_ACTIONS: &[&str] = &["start", "status"];

impl ActionClass {
    /// Classify an action name.
    pub fn of(action: &str) -> Self {
        match action {
            a if INFO_ONLY_ACTIONS.contains(&a) => ActionClass::InfoOnly,
            "install" => ActionClass::Install,
            "uninstall" | "upgrade" => ActionClass::Modify,
            "start" | "restart" | "enable" => ActionClass::Start,
            "stop" | "disable" => ActionClass::Stop,
            _ => ActionClass::Unknown,
        }
    }
}

/// Decide whether `action` may proceed given a validation outcome.
///
/// Always at least as permissive as `result.valid`.
pub fn can_proceed(action: &str, result: &ValidationResult) -> bool {
    match ActionClass::of(action) {
        ActionClass::InfoOnly | ActionClass::Install | ActionClass::Unknown => true,
        ActionClass::Modify => {
            result.missing_commands.is_empty() || result.missing_services.is_empty()
        }
        ActionClass::Start | ActionClass::Stop => result.missing_services.is_empty(),
    }
}

/// Kind of a single resource checked on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Executable command
    Command,
    /// Service
    Service,
    /// TCP port
    Port,
}

impl ResourceKind {
    /// Parse a resource kind name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "file" => Some(ResourceKind::File),
            "directory" | "dir" => Some(ResourceKind::Directory),
            "command" | "cmd" => Some(ResourceKind::Command),
            "service" => Some(ResourceKind::Service),
            "port" => Some(ResourceKind::Port),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::File => "file",
            ResourceKind::Directory => "directory",
            ResourceKind::Command => "command",
            ResourceKind::Service => "service",
            ResourceKind::Port => "port",
        };
        write!(f, "{name}")
    }
}

/// Check one resource by kind. Unparseable port numbers count as closed.
pub fn validate_resource_exists(
    validator: &ResourceValidator,
    kind: ResourceKind,
    name: &str,
) -> bool {
    match kind {
        ResourceKind::File => validator.validate_file(name),
        ResourceKind::Directory => validator.validate_directory(name),
        ResourceKind::Command => validator.validate_command(name),
        ResourceKind::Service => validator.validate_service(name),
        ResourceKind::Port => name
            .parse::<u32>()
            .is_ok_and(|port| validator.validate_port(port)),
    }
}

/// Collect the targets for which `check` fails, preserving input order.
fn missing<T, F>(targets: Vec<T>, check: F) -> Vec<T>
where
    T: Send,
    F: Fn(&T) -> bool + Sync,
{
    targets
        .into_par_iter()
        .filter(|target| !check(target))
        .collect()
}

/// Check every resource in `data` and classify the outcome for `action`.
pub fn validate_resources(
    validator: &ResourceValidator,
    data: &SoftwareData,
    action: &str,
) -> ValidationResult {
    let files: Vec<String> = data
        .files
        .iter()
        .map(|file| file.path.clone().unwrap_or_else(|| file.name.clone()))
        .collect();
    let directories: Vec<String> = data
        .directories
        .iter()
        .map(|dir| dir.path.clone().unwrap_or_else(|| dir.name.clone()))
        .collect();
    let commands: Vec<String> = data
        .commands
        .iter()
        .map(|cmd| cmd.lookup_target().to_string())
        .collect();
    let services: Vec<String> = data
        .services
        .iter()
        .map(|svc| svc.effective_name().to_string())
        .collect();

    let mut result = ValidationResult {
        missing_files: missing(files, |path| validator.validate_file(path)),
        missing_directories: missing(directories, |path| validator.validate_directory(path)),
        missing_commands: missing(commands, |cmd| validator.validate_command(cmd)),
        missing_services: missing(services, |name| validator.validate_service(name)),
        ..Default::default()
    };

    if PORT_SENSITIVE_ACTIONS.contains(&action) {
        let ports: Vec<u16> = data.ports.iter().map(|p| p.port).collect();
        result.closed_ports = missing(ports, |port| validator.validate_port(u32::from(*port)));
        for port in &result.closed_ports {
            result
                .warnings
                .push(format!("port {port} is not accepting connections"));
        }
    }

    for path in &result.missing_files {
        result.warnings.push(format!("file not found: {path}"));
    }
    for path in &result.missing_directories {
        result.warnings.push(format!("directory not found: {path}"));
    }
    for cmd in &result.missing_commands {
        result.warnings.push(format!("command not found: {cmd}"));
    }
    for svc in &result.missing_services {
        result.warnings.push(format!("service not found: {svc}"));
    }

    result.valid = result.missing_count() == 0;
    result.can_proceed = can_proceed(action, &result);

    log::debug!(
        "validated {} for {action}: {} missing, {} closed ports",
        data.name(),
        result.missing_count(),
        result.closed_ports.len()
    );

    result
}

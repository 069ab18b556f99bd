//! Core types for software metadata ("saidata").
//!
//! A [`SoftwareData`] document describes one logical piece of software: the
//! packages that provide it, the services, files, directories, commands and
//! ports it owns, alternative installation methods (source builds, binary
//! downloads, install scripts) and per-provider overrides.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Current saidata schema version.
pub const SCHEMA_VERSION: &str = "0.3";

fn is_false(value: &bool) -> bool {
    !*value
}

// ============================================================================
// Document
// ============================================================================

/// Complete metadata for one logical software name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftwareData {
    /// Schema version of the document.
    #[serde(default)]
    pub version: String,

    /// Identity and descriptive metadata.
    #[serde(default)]
    pub metadata: Metadata,

    /// Packages that provide this software.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,

    /// Services managed by this software.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,

    /// Files owned by this software.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,

    /// Directories owned by this software.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directories: Vec<Directory>,

    /// Executables provided by this software.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,

    /// Network ports used by this software.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,

    /// Container images for this software.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,

    /// Source builds, addressed by position from templates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,

    /// Pre-built binary downloads, addressed by position from templates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binaries: Vec<Binary>,

    /// Installation scripts, addressed by position from templates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<Script>,

    /// Per-provider overrides keyed by provider name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<String, ProviderConfig>,

    /// Provider/platform support matrix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<Compatibility>,

    /// True when synthesized by the defaults generator instead of loaded.
    #[serde(skip_deserializing, skip_serializing_if = "is_false")]
    pub is_generated: bool,
}

impl SoftwareData {
    /// Create an empty document for `name` at the current schema version.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            metadata: Metadata {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Parse a YAML document. `path` is only used for error context.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|source| Error::Serialize { source })
    }

    /// The software name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Provider override section, if the document has one.
    pub fn provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }

    /// Whether the compatibility matrix marks a provider unsupported on a platform.
    ///
    /// Absent entries count as supported.
    pub fn is_supported(&self, provider: &str, platform: &str) -> bool {
        self.compatibility.as_ref().is_none_or(|compat| {
            compat
                .matrix
                .iter()
                .filter(|entry| entry.provider == provider && entry.platform.matches(platform))
                .all(|entry| entry.supported)
        })
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Descriptive metadata for a software document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Unique software name; empty in override documents.
    #[serde(default)]
    pub name: String,
    /// Human-friendly name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Upstream version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Category (e.g. "web-server").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Subcategory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// License identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Implementation language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Upstream maintainer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    /// Project URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Urls>,
}

/// Project URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Urls {
    /// Project website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Source repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Issue tracker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,
    /// Download page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<String>,
    /// Changelog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,
    /// License text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

// ============================================================================
// Resource entities
// ============================================================================

/// A package that provides the software.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Logical name, unique within the document.
    pub name: String,
    /// Name used by the package manager (defaults to `name`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    /// Version constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Alternative package names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    /// Extra flags passed to the package manager.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_options: Option<String>,
    /// Repository the package comes from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Checksum of the package artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Signature or signing key reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Direct download URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl Package {
    /// Create a package whose manager name equals its logical name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            package_name: Some(name.clone()),
            name,
            ..Default::default()
        }
    }
}

/// Kind of service manager a service is registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// systemd unit
    Systemd,
    /// SysV init script
    Init,
    /// launchd job
    Launchd,
    /// Windows service
    WindowsService,
    /// Docker container
    Docker,
}

impl ServiceType {
    /// Identifier as written in saidata.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Systemd => "systemd",
            ServiceType::Init => "init",
            ServiceType::Launchd => "launchd",
            ServiceType::WindowsService => "windows_service",
            ServiceType::Docker => "docker",
        }
    }

    /// Parse a service type identifier.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "systemd" => Some(ServiceType::Systemd),
            "init" => Some(ServiceType::Init),
            "launchd" => Some(ServiceType::Launchd),
            "windows_service" => Some(ServiceType::WindowsService),
            "docker" => Some(ServiceType::Docker),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A service the software runs as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Logical name, unique within the document.
    pub name: String,
    /// Name registered with the service manager (defaults to `name`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    /// Service manager type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    /// Whether the service should be enabled at boot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Configuration files read by the service.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub config_files: Vec<String>,
}

impl Service {
    /// Name to query the service manager with.
    pub fn effective_name(&self) -> &str {
        self.service_name.as_deref().unwrap_or(&self.name)
    }
}

/// Role of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Configuration file
    Config,
    /// Executable
    Binary,
    /// Shared library
    Library,
    /// Data file
    Data,
    /// Log file
    Log,
    /// Temporary file
    Temp,
    /// Unix socket
    Socket,
}

impl FileType {
    /// Identifier as written in saidata.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Config => "config",
            FileType::Binary => "binary",
            FileType::Library => "library",
            FileType::Data => "data",
            FileType::Log => "log",
            FileType::Temp => "temp",
            FileType::Socket => "socket",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file owned by the software.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Logical name, unique within the document.
    pub name: String,
    /// Filesystem path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Role of the file.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    /// Owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Owning group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Octal permission string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Whether the file should be backed up before changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<bool>,
}

/// A directory owned by the software.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    /// Logical name, unique within the document.
    pub name: String,
    /// Filesystem path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Owning group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Octal permission string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Whether ownership and mode apply recursively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
}

/// An executable provided by the software.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Command name, unique within the document.
    pub name: String,
    /// Absolute path of the executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Default arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    /// Alternative names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Shell completion script path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_completion: Option<String>,
    /// Man page path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub man_page: Option<String>,
}

impl Command {
    /// Path to look up: the explicit path if present, otherwise the name.
    pub fn lookup_target(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }
}

/// A network port used by the software. Identified by its number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Port number.
    pub port: u16,
    /// Protocol ("tcp" or "udp").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Service name using the port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Port {
    /// Create a TCP port entry.
    pub fn tcp(port: u16, service: impl Into<String>) -> Self {
        Self {
            port,
            protocol: Some("tcp".to_string()),
            service: Some(service.into()),
            description: None,
        }
    }
}

/// A container image for the software.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Logical name, unique within the document.
    pub name: String,
    /// Image name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Image tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Registry host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    /// Target platform (e.g. "linux/amd64").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Port mappings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// Volume mappings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// Environment variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Networks to attach.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    /// Container labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

// ============================================================================
// Alternative installation methods
// ============================================================================

/// Command overrides for alternative installation methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCommands {
    /// Download step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<String>,
    /// Extraction step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,
    /// Configure step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configure: Option<String>,
    /// Build step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    /// Install step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<String>,
    /// Uninstall step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uninstall: Option<String>,
    /// Post-install validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
    /// Version query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Build from source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Logical name.
    pub name: String,
    /// Source archive or repository URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Build system (autotools, cmake, make, meson, ninja, custom).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_system: Option<String>,
    /// Version to build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Build directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_dir: Option<String>,
    /// Unpacked source directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<String>,
    /// Installation prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_prefix: Option<String>,
    /// Arguments for the configure step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configure_args: Vec<String>,
    /// Arguments for the build step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_args: Vec<String>,
    /// Arguments for the install step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub install_args: Vec<String>,
    /// Packages required before building.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
    /// Build environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Archive checksum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Step overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_commands: Option<CustomCommands>,
}

/// Archive layout of a binary download.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Archive format (tar.gz, zip, none, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Leading path component to strip on extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_prefix: Option<String>,
    /// Path inside the archive to extract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_path: Option<String>,
}

/// Pre-built binary download.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    /// Logical name.
    pub name: String,
    /// Download URL (may contain `{{version}}`-style placeholders).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// CPU architecture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    /// Target OS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Artifact checksum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Installation directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_path: Option<String>,
    /// Executable name inside the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
    /// Archive layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveConfig>,
    /// Octal permissions for the installed executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
    /// Step overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_commands: Option<CustomCommands>,
}

/// Installation script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Logical name.
    pub name: String,
    /// Script URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Version installed by the script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Interpreter (bash, sh, python, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    /// Script checksum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Script arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    /// Script environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    /// Timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Step overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_commands: Option<CustomCommands>,
}

// ============================================================================
// Provider overrides
// ============================================================================

/// A package source offered by a provider (e.g. an upstream apt repo).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSource {
    /// Logical name.
    pub name: String,
    /// Lower is preferred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Recommendation note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Repository this source refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Packages provided by this source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A package repository used by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Logical name.
    pub name: String,
    /// Repository URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Signing key URL or fingerprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Repository kind (upstream, os-default, os-backports, third-party).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub repo_type: Option<String>,
    /// Components (e.g. "main", "contrib").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
    /// Repository maintainer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    /// Lower is preferred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Recommendation note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Packages served from this repository.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
}

/// Partial override of a document for one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Packages to install before this provider can act.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
    /// Extra build commands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_commands: Vec<String>,
    /// Package overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
    /// Package sources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_sources: Vec<PackageSource>,
    /// Repositories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<Repository>,
    /// Service overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
    /// File overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
    /// Directory overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directories: Vec<Directory>,
    /// Command overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,
    /// Port overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    /// Container overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,
    /// Source build overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
    /// Binary download overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binaries: Vec<Binary>,
    /// Script overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<Script>,
}

impl ProviderConfig {
    /// Whether the override carries no data at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// Compatibility
// ============================================================================

/// A single platform name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlatformSpec {
    /// One platform
    One(String),
    /// Several platforms
    Many(Vec<String>),
}

impl Default for PlatformSpec {
    fn default() -> Self {
        PlatformSpec::Many(Vec::new())
    }
}

impl PlatformSpec {
    /// All platform names.
    pub fn names(&self) -> Vec<&str> {
        match self {
            PlatformSpec::One(name) => vec![name.as_str()],
            PlatformSpec::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Whether this spec covers `platform` ("all" matches everything).
    pub fn matches(&self, platform: &str) -> bool {
        self.names()
            .iter()
            .any(|name| *name == "all" || name.eq_ignore_ascii_case(platform))
    }
}

/// One row of the compatibility matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityEntry {
    /// Provider name.
    pub provider: String,
    /// Platform(s) the row applies to.
    #[serde(default)]
    pub platform: PlatformSpec,
    /// Architecture(s) the row applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<PlatformSpec>,
    /// Whether the combination works.
    pub supported: bool,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Whether the combination has been tested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tested: Option<bool>,
    /// Whether the combination is recommended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,
}

/// Known upstream versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Latest release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    /// Minimum supported release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<String>,
    /// Latest long-term-support release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_lts: Option<String>,
    /// Minimum of the latest release line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_minimum: Option<String>,
}

/// Provider/platform support matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    /// Matrix rows.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matrix: Vec<CompatibilityEntry>,
    /// Version information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<VersionInfo>,
}

//! Synthesis of best-effort metadata for software with no saidata document.
//!
//! The generator guesses conventional locations through the platform
//! strategy and keeps only what the live system confirms. Packages are never
//! checked; the package named after the software is always present.

use crate::error::{Error, Result};
use crate::types::{
    Command, Directory, File, FileType, Package, Port, SCHEMA_VERSION, Service, ServiceType,
    SoftwareData,
};
use std::path::{Path, PathBuf};
use sysprobe::ResourceValidator;

/// Well-known ports per software name.
const WELL_KNOWN_PORTS: &[(&str, &[u16])] = &[
    ("nginx", &[80, 443]),
    ("apache", &[80, 443]),
    ("apache2", &[80, 443]),
    ("httpd", &[80, 443]),
    ("caddy", &[80, 443]),
    ("haproxy", &[80, 443]),
    ("traefik", &[80, 443, 8080]),
    ("mysql", &[3306]),
    ("mariadb", &[3306]),
    ("postgresql", &[5432]),
    ("postgres", &[5432]),
    ("redis", &[6379]),
    ("mongodb", &[27017]),
    ("mongod", &[27017]),
    ("elasticsearch", &[9200, 9300]),
    ("opensearch", &[9200, 9300]),
    ("kibana", &[5601]),
    ("memcached", &[11211]),
    ("rabbitmq", &[5672, 15672]),
    ("jenkins", &[8080]),
    ("tomcat", &[8080]),
    ("grafana", &[3000]),
    ("prometheus", &[9090]),
    ("alertmanager", &[9093]),
    ("node_exporter", &[9100]),
    ("kafka", &[9092]),
    ("zookeeper", &[2181]),
    ("consul", &[8500]),
    ("vault", &[8200]),
    ("nomad", &[4646]),
    ("etcd", &[2379, 2380]),
    ("ssh", &[22]),
    ("sshd", &[22]),
    ("openssh", &[22]),
    ("mosquitto", &[1883]),
    ("influxdb", &[8086]),
    ("cassandra", &[9042]),
    ("couchdb", &[5984]),
    ("minio", &[9000]),
    ("docker", &[2375, 2376]),
    ("gitea", &[3000]),
    ("gitlab", &[80, 443]),
    ("sonarqube", &[9000]),
    ("nexus", &[8081]),
    ("clickhouse", &[8123, 9000]),
];

/// Reverse substring matching (table key contains the name) needs at least
/// this many characters, otherwise names like "s" would match everything.
const MIN_REVERSE_MATCH_LEN: usize = 3;

/// Look up the well-known ports for a software name.
///
/// Exact case-insensitive match first; otherwise the longest table key that
/// is a substring of the name, or that contains the name.
pub fn well_known_ports(name: &str) -> &'static [u16] {
    let name = name.to_lowercase();
    if let Some((_, ports)) = WELL_KNOWN_PORTS.iter().find(|(key, _)| *key == name) {
        return *ports;
    }

    let mut candidates: Vec<&(&str, &[u16])> = WELL_KNOWN_PORTS
        .iter()
        .filter(|(key, _)| {
            name.contains(key) || (name.len() >= MIN_REVERSE_MATCH_LEN && key.contains(&name))
        })
        .collect();
    candidates.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
    candidates.first().map(|entry| entry.1).unwrap_or_default()
}

/// Capitalize the first character.
fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

/// Name the n-th surviving entity: `base`, `base-2`, `base-3`, ...
fn nth_name(base: &str, n: usize) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{base}-{}", n + 1)
    }
}

/// Generates saidata from platform conventions and live system checks.
#[derive(Debug, Clone)]
pub struct DefaultsGenerator {
    validator: ResourceValidator,
}

impl DefaultsGenerator {
    /// Create a generator probing through `validator`.
    pub fn new(validator: ResourceValidator) -> Self {
        Self { validator }
    }

    /// The validator used for probing.
    pub fn validator(&self) -> &ResourceValidator {
        &self.validator
    }

    /// Generate a document for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if the name is empty or contains a path
    /// separator. Missing resources are never an error.
    pub fn generate(&self, name: &str) -> Result<SoftwareData> {
        validate_name(name)?;

        let platform = self.validator.platform();
        let conventions = platform.conventional_paths(name);

        let mut data = SoftwareData::new(name);
        data.version = SCHEMA_VERSION.to_string();
        data.is_generated = true;
        data.metadata.display_name = Some(display_name(name));
        data.metadata.description = Some(format!("Auto-generated configuration for {name}"));
        data.packages.push(Package::new(name));

        data.files = self.existing_files(&conventions.config_files, "config", FileType::Config);
        data.files.extend(self.existing_files(&conventions.log_files, "log", FileType::Log));

        for (label, dirs) in [
            ("config", &conventions.config_dirs),
            ("data", &conventions.data_dirs),
            ("log", &conventions.log_dirs),
        ] {
            if let Some(dir) = dirs
                .iter()
                .map(|d| path_string(d))
                .find(|d| self.validator.validate_directory(d))
            {
                data.directories.push(Directory {
                    name: label.to_string(),
                    path: Some(dir),
                    ..Default::default()
                });
            }
        }

        if let Some(command) = self.find_command(name, &conventions.binaries) {
            data.commands.push(command);
        }

        if self.validator.validate_service(name) {
            data.services.push(Service {
                name: name.to_string(),
                service_name: Some(name.to_string()),
                service_type: ServiceType::from_name(platform.service_type()),
                ..Default::default()
            });
        }

        data.ports = well_known_ports(name)
            .iter()
            .filter(|port| self.validator.validate_port(u32::from(**port)))
            .map(|port| Port::tcp(*port, name))
            .collect();

        log::debug!(
            "Generated defaults for {name}: {} files, {} directories, {} commands, {} services, {} ports",
            data.files.len(),
            data.directories.len(),
            data.commands.len(),
            data.services.len(),
            data.ports.len()
        );

        Ok(data)
    }

    fn existing_files(&self, candidates: &[PathBuf], base: &str, file_type: FileType) -> Vec<File> {
        candidates
            .iter()
            .map(|p| path_string(p))
            .filter(|p| self.validator.validate_file(p))
            .enumerate()
            .map(|(n, path)| File {
                name: nth_name(base, n),
                path: Some(path),
                file_type: Some(file_type),
                ..Default::default()
            })
            .collect()
    }

    /// First conventional binary that is executable, else a search-path hit.
    fn find_command(&self, name: &str, binaries: &[PathBuf]) -> Option<Command> {
        let path = binaries
            .iter()
            .map(|p| path_string(p))
            .find(|p| self.validator.validate_command(p))
            .or_else(|| {
                self.validator
                    .platform()
                    .find_in_path(name)
                    .map(|p| path_string(&p))
            })?;

        Some(Command {
            name: name.to_string(),
            path: Some(path),
            ..Default::default()
        })
    }
}

/// Reject names that cannot be used as a single path component.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name.contains(['/', '\\'])
        || name == "."
        || name == ".."
    {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

//! Loading, caching and searching saidata documents.
//!
//! Documents live in a sharded tree:
//!
//! ```text
//! <root>/ng/nginx/default.yaml        base document
//! <root>/ng/nginx/ubuntu/22.04.yaml   OS-specific override
//! ```
//!
//! The shard prefix is the lowercased first two characters of the name.

use crate::defaults::{DefaultsGenerator, validate_name};
use crate::error::{Error, Result};
use crate::merge;
use crate::types::{ProviderConfig, SoftwareData};
use crate::validation::{self, ValidationResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use sysprobe::{OsRelease, ResourceValidator};
use walkdir::WalkDir;

/// File name of the base document inside a software directory.
pub const DEFAULT_FILE: &str = "default.yaml";

/// Depth of `default.yaml` below the root: prefix/name/default.yaml.
const DOCUMENT_DEPTH: usize = 3;

/// Padding character for names shorter than the prefix.
const PREFIX_PAD: char = '_';

/// Shard prefix for a software name.
pub fn shard_prefix(name: &str) -> String {
    let mut prefix: String = name.chars().take(2).flat_map(char::to_lowercase).collect();
    while prefix.chars().count() < 2 {
        prefix.push(PREFIX_PAD);
    }
    prefix
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftwareSummary {
    /// Software name.
    pub name: String,
    /// Display name, if any.
    pub display_name: Option<String>,
    /// Description, if any.
    pub description: Option<String>,
    /// Category, if any.
    pub category: Option<String>,
    /// Path of the base document.
    pub path: PathBuf,
}

/// Loads documents, merges OS overrides and caches the result.
///
/// The cache is owned by the manager; nothing is global. Concurrent loads of
/// the same name may both hit disk, but only the first result is cached.
#[derive(Debug)]
pub struct SaidataManager {
    root: PathBuf,
    validator: ResourceValidator,
    defaults: DefaultsGenerator,
    cache: RwLock<HashMap<String, Arc<SoftwareData>>>,
}

impl SaidataManager {
    /// Create a manager reading from `root`.
    pub fn new(root: impl Into<PathBuf>, validator: ResourceValidator) -> Self {
        Self {
            root: root.into(),
            defaults: DefaultsGenerator::new(validator.clone()),
            validator,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Root of the saidata tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The validator shared with the defaults generator.
    pub fn validator(&self) -> &ResourceValidator {
        &self.validator
    }

    /// The defaults generator.
    pub fn defaults(&self) -> &DefaultsGenerator {
        &self.defaults
    }

    /// Directory holding the documents for `name`.
    pub fn software_dir(&self, name: &str) -> PathBuf {
        self.root.join(shard_prefix(name)).join(name)
    }

    /// Path of the base document for `name`.
    pub fn default_path(&self, name: &str) -> PathBuf {
        self.software_dir(name).join(DEFAULT_FILE)
    }

    /// Path of the override document for `name` on `release`.
    pub fn override_path(&self, name: &str, release: &OsRelease) -> PathBuf {
        self.software_dir(name)
            .join(&release.id)
            .join(format!("{}.yaml", release.version))
    }

    /// Load the merged document for `name`.
    ///
    /// A missing base document falls back to generated defaults. A broken
    /// override is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, or if the base document exists
    /// but cannot be read or parsed.
    pub fn load_software(&self, name: &str) -> Result<Arc<SoftwareData>> {
        validate_name(name)?;

        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            log::debug!("Cache hit for {name}");
            return Ok(Arc::clone(cached));
        }

        let base = match self.load_base(name) {
            Ok(data) => data,
            Err(e) if e.is_not_found() => {
                log::info!("No saidata for {name}, generating defaults");
                self.defaults.generate(name)?
            }
            Err(e) => return Err(e),
        };

        let data = Arc::new(self.apply_override(name, base));

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(name.to_string()).or_insert(data)))
    }

    fn load_base(&self, name: &str) -> Result<SoftwareData> {
        let path = self.default_path(name);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound {
                name: name.to_string(),
                path: path.clone(),
            },
            _ => Error::io(&path, e),
        })?;
        log::debug!("Loading {}", path.display());
        let mut data = SoftwareData::from_yaml(&content, &path)?;
        if data.metadata.name.is_empty() {
            data.metadata.name = name.to_string();
        }
        Ok(data)
    }

    fn apply_override(&self, name: &str, base: SoftwareData) -> SoftwareData {
        let release = match self.validator.platform().release() {
            Ok(release) => release,
            Err(e) => {
                log::debug!("OS detection failed, skipping overrides for {name}: {e}");
                return base;
            }
        };

        let path = self.override_path(name, &release);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return base,
            Err(e) => {
                log::warn!("Failed to read override {}: {e}", path.display());
                return base;
            }
        };

        match SoftwareData::from_yaml(&content, &path) {
            Ok(over) => {
                log::debug!("Merging override {} for {release}", path.display());
                merge::merge(&base, &over)
            }
            Err(e) => {
                log::warn!("Ignoring broken override: {e}");
                base
            }
        }
    }

    /// Drop all cached documents.
    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Provider override section for `software`, empty when absent.
    ///
    /// # Errors
    ///
    /// Propagates load errors for the software itself.
    pub fn get_provider_config(&self, software: &str, provider: &str) -> Result<ProviderConfig> {
        let data = self.load_software(software)?;
        Ok(data.provider_config(provider).cloned().unwrap_or_default())
    }

    /// Generate defaults for `name` without touching the tree or the cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] for unusable names.
    pub fn generate_defaults(&self, name: &str) -> Result<SoftwareData> {
        self.defaults.generate(name)
    }

    /// Load `name` and validate its resources for `action`.
    ///
    /// # Errors
    ///
    /// Propagates load errors.
    pub fn validate_resources(&self, name: &str, action: &str) -> Result<ValidationResult> {
        let data = self.load_software(name)?;
        Ok(validation::validate_resources(&self.validator, &data, action))
    }

    /// Base documents in the tree, in walk order.
    fn documents(&self) -> impl Iterator<Item = PathBuf> {
        WalkDir::new(&self.root)
            .min_depth(DOCUMENT_DEPTH)
            .max_depth(DOCUMENT_DEPTH)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name() == DEFAULT_FILE)
            .map(walkdir::DirEntry::into_path)
    }

    /// Names of all software with a base document, sorted.
    pub fn get_software_list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .documents()
            .filter_map(|path| {
                path.parent()
                    .and_then(Path::file_name)
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Find software whose name, description or tags contain `query`.
    ///
    /// Matching is case-insensitive. Unparseable documents are skipped.
    pub fn search_software(&self, query: &str) -> Vec<SoftwareSummary> {
        let needle = query.to_lowercase();
        let mut hits: Vec<SoftwareSummary> = self
            .documents()
            .filter_map(|path| {
                let content = fs::read_to_string(&path).ok()?;
                match SoftwareData::from_yaml(&content, &path) {
                    Ok(mut data) => {
                        if data.metadata.name.is_empty() {
                            data.metadata.name = path
                                .parent()
                                .and_then(Path::file_name)
                                .and_then(|n| n.to_str())
                                .unwrap_or_default()
                                .to_string();
                        }
                        Some((path, data))
                    }
                    Err(e) => {
                        log::warn!("Skipping during search: {e}");
                        None
                    }
                }
            })
            .filter(|(_, data)| matches_query(data, &needle))
            .map(|(path, data)| SoftwareSummary {
                name: data.metadata.name,
                display_name: data.metadata.display_name,
                description: data.metadata.description,
                category: data.metadata.category,
                path,
            })
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits
    }
}

fn matches_query(data: &SoftwareData, needle: &str) -> bool {
    let meta = &data.metadata;
    meta.name.to_lowercase().contains(needle)
        || meta
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || meta.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

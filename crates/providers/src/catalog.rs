//! Provider catalog loaded from a directory of YAML documents.

use crate::error::{Error, Result};
use crate::types::{Action, ProviderDocument};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// All known provider documents, keyed by provider name.
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    providers: BTreeMap<String, ProviderDocument>,
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

impl ProviderCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.yaml` / `*.yml` document below `dir`.
    ///
    /// A missing directory yields an empty catalog. Later documents with the
    /// same provider name replace earlier ones (walk order is sorted).
    ///
    /// # Errors
    ///
    /// Returns an error if a document cannot be read or parsed.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut catalog = Self::new();
        if !dir.exists() {
            log::debug!("Provider directory {} does not exist", dir.display());
            return Ok(catalog);
        }

        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() || !is_yaml(entry.path()) {
                continue;
            }
            let path = entry.path();
            let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            let doc: ProviderDocument =
                serde_yaml::from_str(&content).map_err(|source| Error::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            log::debug!("Loaded provider {} from {}", doc.name(), path.display());
            catalog.insert(doc);
        }

        Ok(catalog)
    }

    /// Add or replace a provider.
    pub fn insert(&mut self, doc: ProviderDocument) {
        self.providers.insert(doc.name().to_string(), doc);
    }

    /// Keep only providers that run on `platform`.
    pub fn retain_platform(&mut self, platform: &str) {
        self.providers
            .retain(|_, doc| doc.provider.supports_platform(platform));
    }

    /// Provider by name.
    pub fn get(&self, name: &str) -> Option<&ProviderDocument> {
        self.providers.get(name)
    }

    /// Provider by name, or an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProviderNotFound`] for unknown names.
    pub fn require(&self, name: &str) -> Result<&ProviderDocument> {
        self.get(name)
            .ok_or_else(|| Error::ProviderNotFound(name.to_string()))
    }

    /// Action `action` of provider `name`, if both exist.
    pub fn action(&self, name: &str, action: &str) -> Option<&Action> {
        self.get(name).and_then(|doc| doc.action(action))
    }

    /// Whether provider `name` declares `action`.
    pub fn has_action(&self, name: &str, action: &str) -> bool {
        self.action(name, action).is_some()
    }

    /// Providers in name order.
    pub fn providers(&self) -> impl Iterator<Item = &ProviderDocument> {
        self.providers.values()
    }

    /// Providers declaring `action`, highest priority first.
    pub fn providers_for_action(&self, action: &str) -> Vec<&ProviderDocument> {
        let mut matching: Vec<&ProviderDocument> = self
            .providers
            .values()
            .filter(|doc| doc.has_action(action))
            .collect();
        matching.sort_by(|a, b| {
            b.provider
                .priority
                .cmp(&a.provider.priority)
                .then_with(|| a.name().cmp(b.name()))
        });
        matching
    }

    /// Number of providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl FromIterator<ProviderDocument> for ProviderCatalog {
    fn from_iter<I: IntoIterator<Item = ProviderDocument>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for doc in iter {
            catalog.insert(doc);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    const APT: &str = "provider:\n  name: apt\n  platforms: [linux]\n  priority: 90\nactions:\n  install:\n    template: apt-get install -y x\n";
    const BREW: &str = "provider:\n  name: brew\n  platforms: [macos, linux]\n  priority: 80\nactions:\n  install:\n    template: brew install x\n  start:\n    template: brew services start x\n";
    const CHOCO: &str = "provider:\n  name: choco\n  platforms: [windows]\nactions:\n  install:\n    command: choco install x\n";

    #[test]
    fn test_load_dir() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "package-managers/apt.yaml", APT);
        write(temp.path(), "package-managers/brew.yml", BREW);
        write(temp.path(), "windows/choco.yaml", CHOCO);
        write(temp.path(), "README.md", "not yaml");

        let catalog = ProviderCatalog::load_dir(temp.path()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.has_action("brew", "start"));
        assert!(!catalog.has_action("apt", "start"));
        assert!(catalog.require("zypper").is_err());

        let names: Vec<&str> = catalog
            .providers_for_action("install")
            .iter()
            .map(|doc| doc.name())
            .collect();
        assert_eq!(names, vec!["apt", "brew", "choco"]);
    }

    #[test]
    fn test_retain_platform() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "apt.yaml", APT);
        write(temp.path(), "brew.yaml", BREW);
        write(temp.path(), "choco.yaml", CHOCO);

        let mut catalog = ProviderCatalog::load_dir(temp.path()).unwrap();
        catalog.retain_platform("macos");
        let names: Vec<&str> = catalog.providers().map(ProviderDocument::name).collect();
        assert_eq!(names, vec!["brew"]);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let catalog = ProviderCatalog::load_dir(&temp.path().join("absent")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "broken.yaml", "provider: [");
        let err = ProviderCatalog::load_dir(temp.path()).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }
}

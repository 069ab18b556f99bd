//! Deep merge of an OS-specific override document into a base document.
//!
//! Sequences are merged as a keyed union: base order is kept, base entries
//! whose key appears in the override are replaced in place, and
//! override-only entries are appended in override order. Scalars follow
//! "override wins when non-empty". The merge never fails.

use crate::types::{
    Binary, Command, Compatibility, Container, Directory, File, Metadata, Package, PackageSource,
    Port, ProviderConfig, Repository, Script, Service, SoftwareData, Source, Urls, VersionInfo,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

/// Natural identity of an entity within its sequence.
pub trait Keyed {
    /// Key type.
    type Key: Eq + Hash + Clone;

    /// The key identifying this entity.
    fn key(&self) -> Self::Key;
}

macro_rules! keyed_by_name {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Keyed for $ty {
                type Key = String;

                fn key(&self) -> String {
                    self.name.clone()
                }
            }
        )*
    };
}

keyed_by_name!(
    Package,
    Service,
    File,
    Directory,
    Command,
    Container,
    Source,
    Binary,
    Script,
    PackageSource,
    Repository,
);

impl Keyed for Port {
    type Key = u16;

    fn key(&self) -> u16 {
        self.port
    }
}

impl Keyed for String {
    type Key = String;

    fn key(&self) -> String {
        self.clone()
    }
}

/// Keyed union of two sequences.
///
/// An empty override returns the base unchanged. When the override repeats
/// a key, its last occurrence wins.
pub fn merge_keyed<T: Keyed + Clone>(base: &[T], over: &[T]) -> Vec<T> {
    if over.is_empty() {
        return base.to_vec();
    }

    let overrides: HashMap<T::Key, &T> = over.iter().map(|item| (item.key(), item)).collect();
    let mut seen: HashSet<T::Key> = HashSet::with_capacity(base.len() + over.len());
    let mut merged = Vec::with_capacity(base.len() + over.len());

    for item in base {
        let key = item.key();
        if !seen.insert(key.clone()) {
            continue;
        }
        match overrides.get(&key) {
            Some(replacement) => merged.push((*replacement).clone()),
            None => merged.push(item.clone()),
        }
    }

    for item in over {
        let key = item.key();
        if seen.insert(key.clone()) {
            merged.push(overrides[&key].clone());
        }
    }

    merged
}

/// Merge `over` into `base`, returning a new document.
pub fn merge(base: &SoftwareData, over: &SoftwareData) -> SoftwareData {
    SoftwareData {
        version: pick_string(&base.version, &over.version),
        metadata: merge_metadata(&base.metadata, &over.metadata),
        packages: merge_keyed(&base.packages, &over.packages),
        services: merge_keyed(&base.services, &over.services),
        files: merge_keyed(&base.files, &over.files),
        directories: merge_keyed(&base.directories, &over.directories),
        commands: merge_keyed(&base.commands, &over.commands),
        ports: merge_keyed(&base.ports, &over.ports),
        containers: merge_keyed(&base.containers, &over.containers),
        sources: merge_keyed(&base.sources, &over.sources),
        binaries: merge_keyed(&base.binaries, &over.binaries),
        scripts: merge_keyed(&base.scripts, &over.scripts),
        providers: merge_providers(&base.providers, &over.providers),
        compatibility: merge_compatibility(base.compatibility.as_ref(), over.compatibility.as_ref()),
        is_generated: base.is_generated && over.is_generated,
    }
}

fn pick_string(base: &str, over: &str) -> String {
    if over.is_empty() { base } else { over }.to_string()
}

fn pick(base: &Option<String>, over: &Option<String>) -> Option<String> {
    match over {
        Some(value) if !value.is_empty() => Some(value.clone()),
        _ => base.clone(),
    }
}

fn pick_list(base: &[String], over: &[String]) -> Vec<String> {
    if over.is_empty() { base } else { over }.to_vec()
}

fn merge_metadata(base: &Metadata, over: &Metadata) -> Metadata {
    Metadata {
        name: pick_string(&base.name, &over.name),
        display_name: pick(&base.display_name, &over.display_name),
        description: pick(&base.description, &over.description),
        version: pick(&base.version, &over.version),
        category: pick(&base.category, &over.category),
        subcategory: pick(&base.subcategory, &over.subcategory),
        tags: pick_list(&base.tags, &over.tags),
        license: pick(&base.license, &over.license),
        language: pick(&base.language, &over.language),
        maintainer: pick(&base.maintainer, &over.maintainer),
        urls: match (&base.urls, &over.urls) {
            (Some(b), Some(o)) => Some(merge_urls(b, o)),
            (b, o) => o.clone().or_else(|| b.clone()),
        },
    }
}

fn merge_urls(base: &Urls, over: &Urls) -> Urls {
    Urls {
        website: pick(&base.website, &over.website),
        documentation: pick(&base.documentation, &over.documentation),
        source: pick(&base.source, &over.source),
        issues: pick(&base.issues, &over.issues),
        download: pick(&base.download, &over.download),
        changelog: pick(&base.changelog, &over.changelog),
        license: pick(&base.license, &over.license),
    }
}

/// Merge two provider override sections with the keyed-union rule.
pub fn merge_provider_config(base: &ProviderConfig, over: &ProviderConfig) -> ProviderConfig {
    ProviderConfig {
        prerequisites: merge_keyed(&base.prerequisites, &over.prerequisites),
        build_commands: merge_keyed(&base.build_commands, &over.build_commands),
        packages: merge_keyed(&base.packages, &over.packages),
        package_sources: merge_keyed(&base.package_sources, &over.package_sources),
        repositories: merge_keyed(&base.repositories, &over.repositories),
        services: merge_keyed(&base.services, &over.services),
        files: merge_keyed(&base.files, &over.files),
        directories: merge_keyed(&base.directories, &over.directories),
        commands: merge_keyed(&base.commands, &over.commands),
        ports: merge_keyed(&base.ports, &over.ports),
        containers: merge_keyed(&base.containers, &over.containers),
        sources: merge_keyed(&base.sources, &over.sources),
        binaries: merge_keyed(&base.binaries, &over.binaries),
        scripts: merge_keyed(&base.scripts, &over.scripts),
    }
}

fn merge_providers(
    base: &BTreeMap<String, ProviderConfig>,
    over: &BTreeMap<String, ProviderConfig>,
) -> BTreeMap<String, ProviderConfig> {
    let mut merged = base.clone();
    for (name, config) in over {
        let combined = match base.get(name) {
            Some(existing) => merge_provider_config(existing, config),
            None => config.clone(),
        };
        merged.insert(name.clone(), combined);
    }
    merged
}

fn merge_versions(base: &VersionInfo, over: &VersionInfo) -> VersionInfo {
    VersionInfo {
        latest: pick(&base.latest, &over.latest),
        minimum: pick(&base.minimum, &over.minimum),
        latest_lts: pick(&base.latest_lts, &over.latest_lts),
        latest_minimum: pick(&base.latest_minimum, &over.latest_minimum),
    }
}

fn merge_compatibility(
    base: Option<&Compatibility>,
    over: Option<&Compatibility>,
) -> Option<Compatibility> {
    match (base, over) {
        (None, None) => None,
        (Some(b), None) => Some(b.clone()),
        (None, Some(o)) => Some(o.clone()),
        (Some(b), Some(o)) => Some(Compatibility {
            matrix: if o.matrix.is_empty() {
                b.matrix.clone()
            } else {
                o.matrix.clone()
            },
            versions: match (&b.versions, &o.versions) {
                (Some(bv), Some(ov)) => Some(merge_versions(bv, ov)),
                (bv, ov) => ov.clone().or_else(|| bv.clone()),
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompatibilityEntry, PlatformSpec};

    fn pkg(name: &str, package_name: &str) -> Package {
        Package {
            name: name.to_string(),
            package_name: Some(package_name.to_string()),
            ..Default::default()
        }
    }

    fn names(packages: &[Package]) -> Vec<&str> {
        packages.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_merge_keyed_replaces_and_appends() {
        let base = vec![pkg("a", "a-base"), pkg("b", "b-base"), pkg("c", "c-base")];
        let over = vec![pkg("d", "d-over"), pkg("b", "b-over")];

        let merged = merge_keyed(&base, &over);
        assert_eq!(names(&merged), vec!["a", "b", "c", "d"]);
        assert_eq!(merged[1].package_name.as_deref(), Some("b-over"));
        assert_eq!(merged[0].package_name.as_deref(), Some("a-base"));
    }

    #[test]
    fn test_merge_keyed_empty_override_is_noop() {
        let base = vec![pkg("a", "a"), pkg("b", "b")];
        assert_eq!(merge_keyed(&base, &[]), base);

        let ports = vec![Port::tcp(80, "http"), Port::tcp(443, "https")];
        assert_eq!(merge_keyed(&ports, &[]), ports);
    }

    #[test]
    fn test_merge_keyed_never_duplicates() {
        let base = vec![pkg("a", "1"), pkg("b", "1")];
        let over = vec![pkg("b", "2"), pkg("b", "3"), pkg("c", "2"), pkg("a", "2")];

        let merged = merge_keyed(&base, &over);
        assert_eq!(names(&merged), vec!["a", "b", "c"]);
        assert_eq!(merged[1].package_name.as_deref(), Some("3"));
    }

    #[test]
    fn test_merge_ports_by_number() {
        let base = vec![Port::tcp(80, "http")];
        let over = vec![Port {
            port: 80,
            protocol: Some("tcp".to_string()),
            service: Some("nginx".to_string()),
            description: None,
        }];

        let merged = merge_keyed(&base, &over);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].service.as_deref(), Some("nginx"));
    }

    #[test]
    fn test_merge_never_drops_base_entities() {
        let mut base = SoftwareData::new("nginx");
        base.packages = vec![pkg("nginx", "nginx")];
        base.services = vec![Service {
            name: "nginx".to_string(),
            ..Default::default()
        }];
        base.ports = vec![Port::tcp(80, "http")];

        let mut over = SoftwareData::default();
        over.packages = vec![pkg("nginx-extras", "nginx-extras")];
        over.ports = vec![Port::tcp(443, "https")];

        let merged = merge(&base, &over);
        assert_eq!(names(&merged.packages), vec!["nginx", "nginx-extras"]);
        assert_eq!(merged.services.len(), 1);
        assert_eq!(
            merged.ports.iter().map(|p| p.port).collect::<Vec<_>>(),
            vec![80, 443]
        );
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let mut base = SoftwareData::new("redis");
        base.packages = vec![pkg("redis", "redis")];
        let mut over = SoftwareData::default();
        over.packages = vec![pkg("redis", "redis-server")];

        let base_before = base.clone();
        let over_before = over.clone();
        let _ = merge(&base, &over);
        assert_eq!(base, base_before);
        assert_eq!(over, over_before);
    }

    #[test]
    fn test_merge_metadata_override_wins_if_non_empty() {
        let mut base = SoftwareData::new("nginx");
        base.metadata.description = Some("base description".to_string());
        base.metadata.category = Some("web-server".to_string());
        base.metadata.tags = vec!["http".to_string()];

        let mut over = SoftwareData::default();
        over.metadata.description = Some("ubuntu description".to_string());
        over.metadata.category = Some(String::new());

        let merged = merge(&base, &over);
        assert_eq!(merged.metadata.name, "nginx");
        assert_eq!(merged.version, "0.3");
        assert_eq!(
            merged.metadata.description.as_deref(),
            Some("ubuntu description")
        );
        assert_eq!(merged.metadata.category.as_deref(), Some("web-server"));
        assert_eq!(merged.metadata.tags, vec!["http"]);
    }

    #[test]
    fn test_merge_urls_field_by_field() {
        let mut base = SoftwareData::new("x");
        base.metadata.urls = Some(Urls {
            website: Some("https://base".to_string()),
            documentation: Some("https://docs".to_string()),
            ..Default::default()
        });
        let mut over = SoftwareData::default();
        over.metadata.urls = Some(Urls {
            website: Some("https://over".to_string()),
            ..Default::default()
        });

        let urls = merge(&base, &over).metadata.urls.unwrap();
        assert_eq!(urls.website.as_deref(), Some("https://over"));
        assert_eq!(urls.documentation.as_deref(), Some("https://docs"));
    }

    #[test]
    fn test_merge_providers() {
        let mut base = SoftwareData::new("nginx");
        base.providers.insert(
            "apt".to_string(),
            ProviderConfig {
                packages: vec![pkg("nginx", "nginx")],
                prerequisites: vec!["ca-certificates".to_string()],
                ..Default::default()
            },
        );

        let mut over = SoftwareData::default();
        over.providers.insert(
            "apt".to_string(),
            ProviderConfig {
                packages: vec![pkg("nginx", "nginx-full"), pkg("geoip", "libnginx-mod-geoip")],
                prerequisites: vec!["ca-certificates".to_string(), "gnupg".to_string()],
                ..Default::default()
            },
        );
        over.providers.insert(
            "snap".to_string(),
            ProviderConfig {
                packages: vec![pkg("nginx", "nginx")],
                ..Default::default()
            },
        );

        let merged = merge(&base, &over);
        let apt = &merged.providers["apt"];
        assert_eq!(names(&apt.packages), vec!["nginx", "geoip"]);
        assert_eq!(apt.packages[0].package_name.as_deref(), Some("nginx-full"));
        assert_eq!(apt.prerequisites, vec!["ca-certificates", "gnupg"]);
        assert!(merged.providers.contains_key("snap"));
    }

    #[test]
    fn test_merge_compatibility() {
        let entry = |provider: &str, supported: bool| CompatibilityEntry {
            provider: provider.to_string(),
            platform: PlatformSpec::One("linux".to_string()),
            supported,
            ..Default::default()
        };

        let mut base = SoftwareData::new("x");
        base.compatibility = Some(Compatibility {
            matrix: vec![entry("apt", true), entry("dnf", true)],
            versions: Some(VersionInfo {
                latest: Some("1.0".to_string()),
                minimum: Some("0.9".to_string()),
                ..Default::default()
            }),
        });

        let mut over = SoftwareData::default();
        over.compatibility = Some(Compatibility {
            matrix: vec![entry("apt", false)],
            versions: Some(VersionInfo {
                latest: Some("1.1".to_string()),
                ..Default::default()
            }),
        });

        let compat = merge(&base, &over).compatibility.unwrap();
        assert_eq!(compat.matrix.len(), 1);
        assert!(!compat.matrix[0].supported);
        let versions = compat.versions.unwrap();
        assert_eq!(versions.latest.as_deref(), Some("1.1"));
        assert_eq!(versions.minimum.as_deref(), Some("0.9"));
    }

    #[test]
    fn test_merge_compatibility_empty_matrix_keeps_base() {
        let mut base = SoftwareData::new("x");
        base.compatibility = Some(Compatibility {
            matrix: vec![CompatibilityEntry {
                provider: "apt".to_string(),
                supported: true,
                ..Default::default()
            }],
            versions: None,
        });
        let mut over = SoftwareData::default();
        over.compatibility = Some(Compatibility::default());

        assert_eq!(merge(&base, &over).compatibility.unwrap().matrix.len(), 1);
    }

    #[test]
    fn test_merge_generated_flag() {
        let mut generated = SoftwareData::new("x");
        generated.is_generated = true;
        let loaded = SoftwareData::new("x");

        assert!(!merge(&loaded, &loaded).is_generated);
        assert!(!merge(&generated, &loaded).is_generated);
        assert!(merge(&generated, &generated).is_generated);
    }
}

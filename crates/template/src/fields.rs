//! Field accessor table for saidata entities.
//!
//! Each entity type maps dot-separated path components to its fields by
//! hand. Nested structures (`archive.format`, `custom_commands.build`) and
//! maps (`environment.DEBUG`) are walked one component at a time; string
//! lists may be indexed (`arguments.0`) or stringified whole.

use saidata::{
    ArchiveConfig, Binary, Command, Container, CustomCommands, Directory, File, Package, Port,
    Script, Service, Source,
};
use std::collections::BTreeMap;

/// Result of walking a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// A scalar rendered as text.
    Value(String),
    /// A list of scalars.
    List(Vec<String>),
    /// The path ends at a structure or map.
    Composite,
    /// The path does not resolve, or the field is unset.
    Missing,
}

impl Lookup {
    /// Render for substitution. Lists are space-joined; composites have no
    /// textual form.
    pub fn render(self) -> Option<String> {
        match self {
            Lookup::Value(value) => Some(value),
            Lookup::List(items) => Some(items.join(" ")),
            Lookup::Composite | Lookup::Missing => None,
        }
    }
}

/// Access to an entity's fields by path.
pub trait FieldAccess {
    /// Walk `path` from this entity.
    fn field(&self, path: &[&str]) -> Lookup;
}

fn text(value: &str, rest: &[&str]) -> Lookup {
    if rest.is_empty() {
        Lookup::Value(value.to_string())
    } else {
        Lookup::Missing
    }
}

fn opt<T: ToString>(value: Option<&T>, rest: &[&str]) -> Lookup {
    match value {
        Some(v) if rest.is_empty() => Lookup::Value(v.to_string()),
        _ => Lookup::Missing,
    }
}

fn list(items: &[String], rest: &[&str]) -> Lookup {
    match rest {
        [] if items.is_empty() => Lookup::Missing,
        [] => Lookup::List(items.to_vec()),
        [index] => index
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .map_or(Lookup::Missing, |item| Lookup::Value(item.clone())),
        _ => Lookup::Missing,
    }
}

fn map(entries: &BTreeMap<String, String>, rest: &[&str]) -> Lookup {
    match rest {
        [] if entries.is_empty() => Lookup::Missing,
        [] => Lookup::Composite,
        [key] => entries
            .get(*key)
            .map_or(Lookup::Missing, |value| Lookup::Value(value.clone())),
        _ => Lookup::Missing,
    }
}

fn nested<T: FieldAccess>(value: Option<&T>, rest: &[&str]) -> Lookup {
    match value {
        None => Lookup::Missing,
        Some(_) if rest.is_empty() => Lookup::Composite,
        Some(inner) => inner.field(rest),
    }
}

/// Split the first component off a path.
fn split<'p>(path: &'p [&'p str]) -> Option<(&'p str, &'p [&'p str])> {
    path.split_first().map(|(head, rest)| (*head, rest))
}

impl FieldAccess for Package {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        match head {
            "name" => text(&self.name, rest),
            "package_name" => opt(self.package_name.as_ref(), rest),
            "version" => opt(self.version.as_ref(), rest),
            "alternatives" => list(&self.alternatives, rest),
            "install_options" => opt(self.install_options.as_ref(), rest),
            "repository" => opt(self.repository.as_ref(), rest),
            "checksum" => opt(self.checksum.as_ref(), rest),
            "signature" => opt(self.signature.as_ref(), rest),
            "download_url" => opt(self.download_url.as_ref(), rest),
            _ => Lookup::Missing,
        }
    }
}

impl FieldAccess for Service {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        match head {
            "name" => text(&self.name, rest),
            "service_name" => opt(self.service_name.as_ref(), rest),
            "type" | "service_type" => opt(self.service_type.as_ref(), rest),
            "enabled" => opt(self.enabled.as_ref(), rest),
            "config_files" => list(&self.config_files, rest),
            _ => Lookup::Missing,
        }
    }
}

impl FieldAccess for File {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        match head {
            "name" => text(&self.name, rest),
            "path" => opt(self.path.as_ref(), rest),
            "type" | "file_type" => opt(self.file_type.as_ref(), rest),
            "owner" => opt(self.owner.as_ref(), rest),
            "group" => opt(self.group.as_ref(), rest),
            "mode" => opt(self.mode.as_ref(), rest),
            "backup" => opt(self.backup.as_ref(), rest),
            _ => Lookup::Missing,
        }
    }
}

impl FieldAccess for Directory {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        match head {
            "name" => text(&self.name, rest),
            "path" => opt(self.path.as_ref(), rest),
            "owner" => opt(self.owner.as_ref(), rest),
            "group" => opt(self.group.as_ref(), rest),
            "mode" => opt(self.mode.as_ref(), rest),
            "recursive" => opt(self.recursive.as_ref(), rest),
            _ => Lookup::Missing,
        }
    }
}

impl FieldAccess for Command {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        match head {
            "name" => text(&self.name, rest),
            "path" => opt(self.path.as_ref(), rest),
            "arguments" => list(&self.arguments, rest),
            "aliases" => list(&self.aliases, rest),
            "shell_completion" => opt(self.shell_completion.as_ref(), rest),
            "man_page" => opt(self.man_page.as_ref(), rest),
            _ => Lookup::Missing,
        }
    }
}

impl FieldAccess for Port {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        match head {
            "port" => opt(Some(&self.port), rest),
            "protocol" => opt(self.protocol.as_ref(), rest),
            "service" => opt(self.service.as_ref(), rest),
            "description" => opt(self.description.as_ref(), rest),
            _ => Lookup::Missing,
        }
    }
}

impl FieldAccess for Container {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        match head {
            "name" => text(&self.name, rest),
            "image" => opt(self.image.as_ref(), rest),
            "tag" => opt(self.tag.as_ref(), rest),
            "registry" => opt(self.registry.as_ref(), rest),
            "platform" => opt(self.platform.as_ref(), rest),
            "ports" => list(&self.ports, rest),
            "volumes" => list(&self.volumes, rest),
            "environment" => map(&self.environment, rest),
            "networks" => list(&self.networks, rest),
            "labels" => map(&self.labels, rest),
            _ => Lookup::Missing,
        }
    }
}

impl FieldAccess for CustomCommands {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        let value = match head {
            "download" => self.download.as_ref(),
            "extract" => self.extract.as_ref(),
            "configure" => self.configure.as_ref(),
            "build" => self.build.as_ref(),
            "install" => self.install.as_ref(),
            "uninstall" => self.uninstall.as_ref(),
            "validation" => self.validation.as_ref(),
            "version" => self.version.as_ref(),
            _ => None,
        };
        opt(value, rest)
    }
}

impl FieldAccess for ArchiveConfig {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        match head {
            "format" => opt(self.format.as_ref(), rest),
            "strip_prefix" => opt(self.strip_prefix.as_ref(), rest),
            "extract_path" => opt(self.extract_path.as_ref(), rest),
            _ => Lookup::Missing,
        }
    }
}

impl FieldAccess for Source {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        match head {
            "name" => text(&self.name, rest),
            "url" => opt(self.url.as_ref(), rest),
            "build_system" => opt(self.build_system.as_ref(), rest),
            "version" => opt(self.version.as_ref(), rest),
            "build_dir" => opt(self.build_dir.as_ref(), rest),
            "source_dir" => opt(self.source_dir.as_ref(), rest),
            "install_prefix" => opt(self.install_prefix.as_ref(), rest),
            "configure_args" => list(&self.configure_args, rest),
            "build_args" => list(&self.build_args, rest),
            "install_args" => list(&self.install_args, rest),
            "prerequisites" => list(&self.prerequisites, rest),
            "environment" => map(&self.environment, rest),
            "checksum" => opt(self.checksum.as_ref(), rest),
            "custom_commands" => nested(self.custom_commands.as_ref(), rest),
            _ => Lookup::Missing,
        }
    }
}

impl FieldAccess for Binary {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        match head {
            "name" => text(&self.name, rest),
            "url" => opt(self.url.as_ref(), rest),
            "version" => opt(self.version.as_ref(), rest),
            "architecture" => opt(self.architecture.as_ref(), rest),
            "platform" => opt(self.platform.as_ref(), rest),
            "checksum" => opt(self.checksum.as_ref(), rest),
            "install_path" => opt(self.install_path.as_ref(), rest),
            "executable" => opt(self.executable.as_ref(), rest),
            "archive" => nested(self.archive.as_ref(), rest),
            "permissions" => opt(self.permissions.as_ref(), rest),
            "custom_commands" => nested(self.custom_commands.as_ref(), rest),
            _ => Lookup::Missing,
        }
    }
}

impl FieldAccess for Script {
    fn field(&self, path: &[&str]) -> Lookup {
        let Some((head, rest)) = split(path) else {
            return Lookup::Composite;
        };
        match head {
            "name" => text(&self.name, rest),
            "url" => opt(self.url.as_ref(), rest),
            "version" => opt(self.version.as_ref(), rest),
            "interpreter" => opt(self.interpreter.as_ref(), rest),
            "checksum" => opt(self.checksum.as_ref(), rest),
            "arguments" => list(&self.arguments, rest),
            "environment" => map(&self.environment, rest),
            "working_dir" => opt(self.working_dir.as_ref(), rest),
            "timeout" => opt(self.timeout.as_ref(), rest),
            "custom_commands" => nested(self.custom_commands.as_ref(), rest),
            _ => Lookup::Missing,
        }
    }
}

//! Template resolution against a saidata document.

use crate::error::{Error, Result};
use crate::fields::{FieldAccess, Lookup};
use crate::parser::{Call, Kind, Template, Token};
use saidata::{ProviderConfig, SoftwareData};

/// Entity at `index` of the sequence for `kind` in a document.
fn base_entity(data: &SoftwareData, kind: Kind, index: usize) -> Option<&dyn FieldAccess> {
    match kind {
        Kind::Package => data.packages.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Service => data.services.get(index).map(|e| e as &dyn FieldAccess),
        Kind::File => data.files.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Directory => data.directories.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Command => data.commands.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Port => data.ports.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Container => data.containers.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Source => data.sources.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Binary => data.binaries.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Script => data.scripts.get(index).map(|e| e as &dyn FieldAccess),
    }
}

/// Entity at `index` of the sequence for `kind` in a provider override.
fn override_entity(config: &ProviderConfig, kind: Kind, index: usize) -> Option<&dyn FieldAccess> {
    match kind {
        Kind::Package => config.packages.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Service => config.services.get(index).map(|e| e as &dyn FieldAccess),
        Kind::File => config.files.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Directory => config.directories.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Command => config.commands.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Port => config.ports.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Container => config.containers.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Source => config.sources.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Binary => config.binaries.get(index).map(|e| e as &dyn FieldAccess),
        Kind::Script => config.scripts.get(index).map(|e| e as &dyn FieldAccess),
    }
}

/// Resolves `sai_*` calls in provider templates.
///
/// Resolution is all-or-nothing: the first failing call aborts the whole
/// template and no partial output is produced.
///
/// # Example
///
/// ```
/// use saidata::{Package, SoftwareData};
/// use template::TemplateEngine;
///
/// let mut data = SoftwareData::new("nginx");
/// data.packages.push(Package::new("nginx"));
///
/// let engine = TemplateEngine::new(&data, Some("apt"));
/// let cmd = engine.execute("apt-get install -y {{sai_package(0, 'package_name')}}").unwrap();
/// assert_eq!(cmd, "apt-get install -y nginx");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TemplateEngine<'a> {
    data: &'a SoftwareData,
    provider: Option<&'a str>,
}

impl<'a> TemplateEngine<'a> {
    /// Create an engine over `data`, preferring overrides of `provider`.
    pub fn new(data: &'a SoftwareData, provider: Option<&'a str>) -> Self {
        Self { data, provider }
    }

    /// Provider context of this engine.
    pub fn provider(&self) -> Option<&'a str> {
        self.provider
    }

    /// Parse and render `template`.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed templates, or a resolution error
    /// for a missing entity, unresolved field path, or non-scalar field.
    pub fn execute(&self, template: &str) -> Result<String> {
        self.render(&Template::parse(template)?)
    }

    /// Render an already parsed template.
    ///
    /// # Errors
    ///
    /// Same resolution errors as [`execute`](Self::execute).
    pub fn render(&self, template: &Template) -> Result<String> {
        let mut out = String::new();
        for token in template.tokens() {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Call(call) => out.push_str(&self.resolve(call)?),
            }
        }
        Ok(out)
    }

    /// Resolve one call to its substituted text.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub fn resolve(&self, call: &Call) -> Result<String> {
        let provider = call.provider.as_deref().or(self.provider);
        let over = provider
            .and_then(|p| self.data.provider_config(p))
            .and_then(|config| override_entity(config, call.kind, call.index));
        let base = base_entity(self.data, call.kind, call.index);

        if over.is_none() && base.is_none() {
            return Err(Error::IndexNotFound {
                kind: call.kind,
                index: call.index,
            });
        }

        let path = call.path_components();
        for entity in [over, base].into_iter().flatten() {
            match entity.field(&path) {
                Lookup::Missing => continue,
                Lookup::Composite => {
                    return Err(Error::NotScalar {
                        kind: call.kind,
                        index: call.index,
                        path: call.field_path.clone(),
                    });
                }
                found => return Ok(found.render().unwrap_or_default()),
            }
        }

        log::debug!(
            "{}: field '{}' unresolved for {} {}",
            self.data.name(),
            call.field_path,
            call.kind,
            call.index
        );
        Err(Error::FieldNotFound {
            kind: call.kind,
            index: call.index,
            path: call.field_path.clone(),
        })
    }
}

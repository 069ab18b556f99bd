//! Turns an action request into a provider command

use anyhow::{Context, Result, anyhow, bail};
use providers::{
    DegradationManager, DegradationPolicy, DegradationResult, ProviderCatalog, Strategy,
};
use saidata::{DefaultsGenerator, SaidataManager, SoftwareData, ValidationResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use sysprobe::{Platform, ResourceValidator};
use template::TemplateEngine;

/// Everything the engine needs besides the platform
#[derive(Debug, Clone)]
pub struct Settings {
    pub saidata_dir: PathBuf,
    pub provider_dir: PathBuf,
    pub port_timeout: Duration,
    pub default_provider: Option<String>,
    pub policies: BTreeMap<String, DegradationPolicy>,
}

/// Outcome of resolving one request
#[derive(Debug, Serialize)]
pub struct Resolution {
    pub action: String,
    pub software: String,
    /// Provider whose template produced the command
    pub provider: Option<String>,
    /// Rendered command; absent when only partial support remains
    pub command: Option<String>,
    pub requires_root: bool,
    /// Providers that could not serve the request, in order
    pub tried: Vec<String>,
    /// Whether the command came from generated saidata
    pub generated: bool,
    pub validation: ValidationResult,
    pub degradation: Option<DegradationResult>,
}

struct Rendered {
    command: String,
    requires_root: bool,
}

/// Resolution engine bound to one platform
pub struct Engine {
    platform: Arc<dyn Platform>,
    saidata: SaidataManager,
    degradation: DegradationManager,
    default_provider: Option<String>,
}

impl Engine {
    /// Build an engine, loading providers that run on `platform`
    pub fn new(settings: Settings, platform: Arc<dyn Platform>) -> Result<Self> {
        let mut catalog = ProviderCatalog::load_dir(&settings.provider_dir).with_context(|| {
            format!(
                "Failed to load providers from {}",
                settings.provider_dir.display()
            )
        })?;
        catalog.retain_platform(platform.os().as_str());
        log::debug!("{} providers available on {}", catalog.len(), platform.os());

        let validator =
            ResourceValidator::new(Arc::clone(&platform)).with_port_timeout(settings.port_timeout);
        let defaults = DefaultsGenerator::new(validator.clone());
        let degradation = DegradationManager::new(Arc::new(catalog), Arc::new(defaults));
        for (action, policy) in settings.policies {
            degradation.set_policy(&action, policy);
        }

        Ok(Self {
            platform,
            saidata: SaidataManager::new(settings.saidata_dir, validator),
            degradation,
            default_provider: settings.default_provider,
        })
    }

    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    pub fn saidata(&self) -> &SaidataManager {
        &self.saidata
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        self.degradation.catalog()
    }

    pub fn degradation(&self) -> &DegradationManager {
        &self.degradation
    }

    /// Resolve `action` for `software`
    ///
    /// With `provider` set only that provider is tried before degrading.
    pub fn resolve(
        &self,
        action: &str,
        software: &str,
        provider: Option<&str>,
    ) -> Result<Resolution> {
        let data = self
            .saidata
            .load_software(software)
            .with_context(|| format!("Failed to load saidata for {software}"))?;
        let validation = saidata::validate_resources(self.saidata.validator(), &data, action);
        let candidates = self.candidates(action, &data, provider)?;

        let mut resolution = Resolution {
            action: action.to_string(),
            software: software.to_string(),
            provider: None,
            command: None,
            requires_root: false,
            tried: Vec::new(),
            generated: data.is_generated,
            validation,
            degradation: None,
        };

        let mut template_failed = Vec::new();
        if let Some((name, rendered)) = self.first_rendered(
            &candidates,
            action,
            &data,
            &mut resolution.tried,
            &mut template_failed,
        ) {
            resolution.accept(name, rendered);
            return Ok(resolution);
        }

        // Generated saidata cannot be regenerated into anything better
        let mut exhausted = Vec::new();
        if data.is_generated {
            exhausted.push(Strategy::IntelligentDefaults);
        }

        loop {
            log::info!(
                "No provider could resolve {action} for {software}, degrading (tried: {})",
                resolution.tried.join(", ")
            );
            let outcome = self.degradation.handle_provider_unavailable_excluding(
                action,
                software,
                &resolution.tried,
                &exhausted,
            )?;

            match outcome.strategy {
                Strategy::ProviderFallback => {
                    let Some(fallback) = outcome.fallback_provider.clone() else {
                        bail!("Fallback for {action} {software} named no provider");
                    };
                    if let Some((name, rendered)) = self.first_rendered(
                        &[fallback],
                        action,
                        &data,
                        &mut resolution.tried,
                        &mut template_failed,
                    ) {
                        resolution.accept(name, rendered);
                        resolution.degradation = Some(outcome);
                        return Ok(resolution);
                    }
                }
                Strategy::IntelligentDefaults => {
                    exhausted.push(Strategy::IntelligentDefaults);
                    // Only template failures can be cured by regenerated saidata
                    if let Some(generated) = &outcome.saidata {
                        let mut retried = Vec::new();
                        if let Some((name, rendered)) = self.first_rendered(
                            &template_failed,
                            action,
                            generated,
                            &mut retried,
                            &mut Vec::new(),
                        ) {
                            resolution.accept(name, rendered);
                            resolution.generated = true;
                            resolution.degradation = Some(outcome);
                            return Ok(resolution);
                        }
                    }
                }
                Strategy::PartialFunctionality => {
                    resolution.degradation = Some(outcome);
                    return Ok(resolution);
                }
            }
        }
    }

    /// Providers to try for `action`, best first
    fn candidates(
        &self,
        action: &str,
        data: &SoftwareData,
        preferred: Option<&str>,
    ) -> Result<Vec<String>> {
        if let Some(name) = preferred {
            let doc = self.catalog().get(name).ok_or_else(|| {
                anyhow!(
                    "Provider {name} is not available on {}",
                    self.platform.os()
                )
            })?;
            if !doc.has_action(action) {
                bail!("Provider {name} does not support {action}");
            }
            return Ok(vec![name.to_string()]);
        }

        let os = self.platform.os();
        let mut names: Vec<String> = self
            .catalog()
            .providers_for_action(action)
            .into_iter()
            .map(|doc| doc.name().to_string())
            .filter(|name| self.degradation.is_provider_available(name))
            .filter(|name| data.is_supported(name, os.as_str()))
            .collect();

        if let Some(default) = &self.default_provider {
            if let Some(pos) = names.iter().position(|name| name == default) {
                let name = names.remove(pos);
                names.insert(0, name);
            }
        }
        Ok(names)
    }

    /// First candidate whose template renders
    ///
    /// Every failed candidate is appended to `tried`; those that failed only
    /// while rendering are also appended to `template_failed`.
    fn first_rendered(
        &self,
        candidates: &[String],
        action: &str,
        data: &SoftwareData,
        tried: &mut Vec<String>,
        template_failed: &mut Vec<String>,
    ) -> Option<(String, Rendered)> {
        for name in candidates {
            match self.render(name, action, data) {
                Ok(rendered) => return Some((name.clone(), rendered)),
                Err(Failure::Provider(e)) => {
                    log::info!("Provider {name} cannot serve {action}: {e:#}");
                    tried.push(name.clone());
                }
                Err(Failure::Template(e)) => {
                    log::info!("Provider {name} cannot serve {action}: {e:#}");
                    tried.push(name.clone());
                    template_failed.push(name.clone());
                }
            }
        }
        None
    }

    fn render(
        &self,
        provider: &str,
        action: &str,
        data: &SoftwareData,
    ) -> std::result::Result<Rendered, Failure> {
        let doc = self.catalog().require(provider).map_err(Failure::provider)?;
        let spec = doc
            .action(action)
            .ok_or_else(|| Failure::Provider(anyhow!("no {action} action")))?;

        if let Some(executable) = &doc.provider.executable {
            if !self.saidata.validator().validate_command(executable) {
                let message = format!("{executable} not found");
                self.degradation.update_action_health(
                    action,
                    provider,
                    false,
                    Some(message.as_str()),
                );
                return Err(Failure::Provider(anyhow!(message)));
            }
        }

        let template = spec
            .effective_command()
            .ok_or_else(|| Failure::Provider(anyhow!("{action} action has no command")))?;
        let command = TemplateEngine::new(data, Some(provider))
            .execute(&template)
            .with_context(|| format!("Failed to render {provider} {action} template"))
            .map_err(Failure::Template)?;

        self.degradation
            .update_action_health(action, provider, true, None);
        Ok(Rendered {
            command,
            requires_root: spec.requires_root,
        })
    }
}

/// Why a provider could not render a command
enum Failure {
    /// The provider itself is unusable (missing, unsupported, no executable)
    Provider(anyhow::Error),
    /// The provider works but the saidata lacks what its template needs
    Template(anyhow::Error),
}

impl Failure {
    fn provider(e: impl Into<anyhow::Error>) -> Self {
        Failure::Provider(e.into())
    }
}

impl Resolution {
    /// A command was produced, or degradation settled for partial functionality
    pub fn is_usable(&self) -> bool {
        self.command.is_some()
            || self
                .degradation
                .as_ref()
                .is_some_and(|outcome| outcome.partial_success)
    }

    fn accept(&mut self, provider: String, rendered: Rendered) {
        self.provider = Some(provider);
        self.command = Some(rendered.command);
        self.requires_root = rendered.requires_root;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use sysprobe::MockPlatform;
    use tempfile::TempDir;

    const APT: &str = r"
provider:
  name: apt
  platforms: [linux]
  capabilities: [install, uninstall, package]
  priority: 90
  executable: apt-get
actions:
  install:
    template: apt-get install -y {{sai_package(0, 'package_name')}}
    requires_root: true
  uninstall:
    template: apt-get remove -y {{sai_package(0, 'package_name')}}
";

    const BREW: &str = r"
provider:
  name: brew
  platforms: [macos, linux]
  capabilities: [install, package]
  priority: 50
  executable: brew
actions:
  install:
    template: brew install {{sai_package(0, 'package_name')}}
";

    const SYSTEMD: &str = r"
provider:
  name: systemd
  platforms: [linux]
  capabilities: [start, stop, service]
  priority: 70
  executable: systemctl
actions:
  start:
    template: systemctl start {{sai_service(0, 'service_name')}}
";

    const CHOCO: &str = r"
provider:
  name: choco
  platforms: [windows]
  priority: 99
actions:
  install:
    command: choco install -y {{sai_package(0, 'package_name')}}
";

    const NGINX: &str = r"
metadata:
  name: nginx
packages:
  - name: nginx
    package_name: nginx
providers:
  apt:
    packages:
      - name: nginx
        package_name: nginx-full
";

    struct Fixture {
        temp: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let fx = Self {
                temp: TempDir::new().unwrap(),
            };
            fx.write("providers/apt.yaml", APT);
            fx.write("providers/brew.yaml", BREW);
            fx.write("providers/systemd.yaml", SYSTEMD);
            fx.write("providers/choco.yaml", CHOCO);
            fx.write("saidata/ng/nginx/default.yaml", NGINX);
            fx
        }

        fn write(&self, relative: &str, content: &str) {
            let path = self.temp.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn root(&self) -> &Path {
            self.temp.path()
        }

        fn settings(&self) -> Settings {
            Settings {
                saidata_dir: self.root().join("saidata"),
                provider_dir: self.root().join("providers"),
                port_timeout: Duration::from_millis(100),
                default_provider: None,
                policies: BTreeMap::new(),
            }
        }

        fn platform(&self) -> MockPlatform {
            MockPlatform::new(self.root().join("sysroot"))
        }

        fn engine(&self, platform: MockPlatform) -> Engine {
            Engine::new(self.settings(), Arc::new(platform)).unwrap()
        }
    }

    #[test]
    fn test_catalog_filtered_by_platform() {
        let fx = Fixture::new();
        let engine = fx.engine(fx.platform());
        assert!(engine.catalog().get("apt").is_some());
        assert!(engine.catalog().get("choco").is_none());
    }

    #[test]
    fn test_highest_priority_provider_wins() {
        let fx = Fixture::new();
        let engine = fx.engine(
            fx.platform()
                .with_path_command("apt-get")
                .with_path_command("brew"),
        );

        let resolution = engine.resolve("install", "nginx", None).unwrap();
        assert_eq!(resolution.provider.as_deref(), Some("apt"));
        assert_eq!(
            resolution.command.as_deref(),
            Some("apt-get install -y nginx-full")
        );
        assert!(resolution.requires_root);
        assert!(resolution.tried.is_empty());
        assert!(resolution.degradation.is_none());
        assert!(!resolution.generated);
    }

    #[test]
    fn test_missing_executable_moves_to_next_provider() {
        let fx = Fixture::new();
        let engine = fx.engine(fx.platform().with_path_command("brew"));

        let resolution = engine.resolve("install", "nginx", None).unwrap();
        assert_eq!(resolution.provider.as_deref(), Some("brew"));
        assert_eq!(resolution.command.as_deref(), Some("brew install nginx"));
        assert_eq!(resolution.tried, vec!["apt"]);
        assert_eq!(engine.degradation().provider_health("apt").consecutive_fails, 1);
    }

    #[test]
    fn test_default_provider_goes_first() {
        let fx = Fixture::new();
        let mut settings = fx.settings();
        settings.default_provider = Some("brew".to_string());
        let platform = fx
            .platform()
            .with_path_command("apt-get")
            .with_path_command("brew");
        let engine = Engine::new(settings, Arc::new(platform)).unwrap();

        let resolution = engine.resolve("install", "nginx", None).unwrap();
        assert_eq!(resolution.provider.as_deref(), Some("brew"));
    }

    #[test]
    fn test_explicit_provider() {
        let fx = Fixture::new();
        let engine = fx.engine(fx.platform().with_path_command("brew"));

        let resolution = engine.resolve("install", "nginx", Some("brew")).unwrap();
        assert_eq!(resolution.command.as_deref(), Some("brew install nginx"));

        let err = engine.resolve("install", "nginx", Some("choco")).unwrap_err();
        assert!(err.to_string().contains("not available"));

        let err = engine.resolve("start", "nginx", Some("brew")).unwrap_err();
        assert!(err.to_string().contains("does not support start"));
    }

    #[test]
    fn test_policy_fallback_provider() {
        let fx = Fixture::new();
        let mut settings = fx.settings();
        settings.policies.insert(
            "install".to_string(),
            DegradationPolicy {
                fallback_providers: vec!["brew".to_string()],
                ..DegradationPolicy::default()
            },
        );
        let engine = Engine::new(settings, Arc::new(fx.platform().with_path_command("brew")))
            .unwrap();

        let resolution = engine.resolve("install", "nginx", Some("apt")).unwrap();
        assert_eq!(resolution.tried, vec!["apt"]);
        assert_eq!(resolution.provider.as_deref(), Some("brew"));
        let outcome = resolution.degradation.unwrap();
        assert_eq!(outcome.fallback_provider.as_deref(), Some("brew"));
    }

    #[test]
    fn test_template_failure_degrades_to_defaults() {
        let fx = Fixture::new();
        let engine = fx.engine(
            fx.platform()
                .with_path_command("systemctl")
                .with_service("nginx"),
        );

        // nginx declares no services
        let resolution = engine.resolve("start", "nginx", None).unwrap();
        assert_eq!(resolution.tried, vec!["systemd"]);
        let outcome = resolution.degradation.as_ref().unwrap();
        assert!(outcome.used_defaults);
        assert_eq!(resolution.provider.as_deref(), Some("systemd"));
        assert_eq!(resolution.command.as_deref(), Some("systemctl start nginx"));
        assert!(resolution.generated);
    }

    #[test]
    fn test_partial_functionality_has_no_command() {
        let fx = Fixture::new();
        let mut settings = fx.settings();
        settings.policies.insert(
            "uninstall".to_string(),
            DegradationPolicy {
                use_defaults: false,
                ..DegradationPolicy::default()
            },
        );
        let engine = Engine::new(settings, Arc::new(fx.platform())).unwrap();

        let resolution = engine.resolve("uninstall", "nginx", None).unwrap();
        assert!(resolution.command.is_none());
        let outcome = resolution.degradation.unwrap();
        assert!(outcome.partial_success);
        assert!(outcome.available_features.contains(&"uninstall".to_string()));
    }

    #[test]
    fn test_exhausted_strategies_is_error() {
        let fx = Fixture::new();
        let mut settings = fx.settings();
        settings.policies.insert(
            "restart".to_string(),
            DegradationPolicy {
                use_defaults: false,
                allow_partial: false,
                ..DegradationPolicy::default()
            },
        );
        let engine = Engine::new(settings, Arc::new(fx.platform())).unwrap();

        let err = engine.resolve("restart", "nginx", None).unwrap_err();
        assert!(err.to_string().contains("all fallback providers failed"));
    }

    #[test]
    fn test_unknown_software_uses_generated_saidata() {
        let fx = Fixture::new();
        let engine = fx.engine(fx.platform().with_path_command("apt-get"));

        let resolution = engine.resolve("install", "htop", None).unwrap();
        assert!(resolution.generated);
        assert_eq!(resolution.command.as_deref(), Some("apt-get install -y htop"));
    }

    fn fallback_policy(allow_partial: bool) -> DegradationPolicy {
        DegradationPolicy {
            fallback_providers: vec!["brew".to_string()],
            allow_partial,
            ..DegradationPolicy::default()
        }
    }

    #[test]
    fn test_failed_fallback_continues_to_partial() {
        let fx = Fixture::new();
        let mut settings = fx.settings();
        settings
            .policies
            .insert("install".to_string(), fallback_policy(true));
        let engine = Engine::new(settings, Arc::new(fx.platform())).unwrap();

        let resolution = engine.resolve("install", "nginx", Some("apt")).unwrap();
        assert!(resolution.command.is_none());
        assert!(resolution.is_usable());
        assert_eq!(resolution.tried, vec!["apt", "brew"]);
        let outcome = resolution.degradation.unwrap();
        assert_eq!(outcome.strategy, Strategy::PartialFunctionality);
        assert!(outcome.partial_success);
    }

    #[test]
    fn test_failed_fallback_without_partial_is_error() {
        let fx = Fixture::new();
        let mut settings = fx.settings();
        settings
            .policies
            .insert("install".to_string(), fallback_policy(false));
        let engine = Engine::new(settings, Arc::new(fx.platform())).unwrap();

        let err = engine.resolve("install", "nginx", Some("apt")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("all fallback providers failed"));
        assert!(message.contains("apt, brew"));
    }

    #[test]
    fn test_missing_executable_counted_once_per_resolve() {
        let fx = Fixture::new();
        let engine = fx.engine(fx.platform());

        let resolution = engine.resolve("install", "htop", None).unwrap();
        assert!(resolution.command.is_none());
        let health = engine.degradation().provider_health("apt");
        assert_eq!(health.consecutive_fails, 1);
        assert!(health.available);

        engine.resolve("install", "htop", None).unwrap();
        assert_eq!(engine.degradation().provider_health("apt").consecutive_fails, 2);
    }

    #[test]
    fn test_action_policy_threshold_applies_to_resolution() {
        let fx = Fixture::new();
        let mut settings = fx.settings();
        settings.policies.insert(
            "install".to_string(),
            DegradationPolicy {
                max_failures: 1,
                ..DegradationPolicy::default()
            },
        );
        let engine =
            Engine::new(settings, Arc::new(fx.platform().with_path_command("brew"))).unwrap();

        let resolution = engine.resolve("install", "nginx", None).unwrap();
        assert_eq!(resolution.provider.as_deref(), Some("brew"));
        assert!(!engine.degradation().is_provider_available("apt"));

        let resolution = engine.resolve("install", "nginx", None).unwrap();
        assert!(resolution.tried.is_empty());
    }
}

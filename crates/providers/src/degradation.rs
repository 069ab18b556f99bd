//! Graceful degradation when a preferred provider cannot serve a request.
//!
//! Strategies run in a fixed order and the first that succeeds wins:
//!
//! 1. `provider_fallback`: the first policy fallback provider that has not
//!    been tried, is available, and declares the action.
//! 2. `intelligent_defaults`: generated saidata for the software.
//! 3. `partial_functionality`: capabilities still offered by the available
//!    providers for the action.
//!
//! When every strategy fails the request is unexecutable and
//! [`Error::AllStrategiesFailed`] is returned.

use crate::catalog::ProviderCatalog;
use crate::error::{Error, Result};
use crate::health::{HealthTracker, ProviderHealth};
use saidata::{DefaultsGenerator, SoftwareData};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Source of generated saidata for the defaults strategy.
pub trait DefaultsSource: Send + Sync {
    /// Generate a best-effort document for `software`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name cannot be used.
    fn generate_defaults(&self, software: &str) -> saidata::Result<SoftwareData>;
}

impl DefaultsSource for DefaultsGenerator {
    fn generate_defaults(&self, software: &str) -> saidata::Result<SoftwareData> {
        self.generate(software)
    }
}

/// How to degrade for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DegradationPolicy {
    /// Providers to try, in order.
    pub fallback_providers: Vec<String>,
    /// Whether generated defaults are acceptable.
    pub use_defaults: bool,
    /// Whether reduced functionality is acceptable.
    pub allow_partial: bool,
    /// Consecutive failures before a provider is marked unavailable.
    ///
    /// Checked when a failure is recorded for this action; the resulting
    /// availability applies to the provider for every action.
    pub max_failures: u32,
}

impl Default for DegradationPolicy {
    fn default() -> Self {
        Self {
            fallback_providers: Vec::new(),
            use_defaults: true,
            allow_partial: true,
            max_failures: 3,
        }
    }
}

/// A degradation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Switch to another provider.
    ProviderFallback,
    /// Use generated saidata.
    IntelligentDefaults,
    /// Offer a subset of the requested functionality.
    PartialFunctionality,
}

impl Strategy {
    /// Identifier used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ProviderFallback => "provider_fallback",
            Strategy::IntelligentDefaults => "intelligent_defaults",
            Strategy::PartialFunctionality => "partial_functionality",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Successful degradation outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegradationResult {
    /// Always true; failures are reported as errors.
    pub success: bool,
    /// Strategy that produced this result.
    pub strategy: Strategy,
    /// Provider chosen by the fallback strategy.
    pub fallback_provider: Option<String>,
    /// Whether generated defaults are in use.
    pub used_defaults: bool,
    /// Generated saidata, for the defaults strategy.
    #[serde(skip)]
    pub saidata: Option<SoftwareData>,
    /// Whether only part of the functionality is available.
    pub partial_success: bool,
    /// Capabilities still available, for the partial strategy.
    pub available_features: Vec<String>,
    /// Notes for the user.
    pub warnings: Vec<String>,
}

impl DegradationResult {
    fn new(strategy: Strategy) -> Self {
        Self {
            success: true,
            strategy,
            fallback_provider: None,
            used_defaults: false,
            saidata: None,
            partial_success: false,
            available_features: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Capabilities an action needs; any overlap permits partial functionality.
pub fn required_capabilities(action: &str) -> &'static [&'static str] {
    match action {
        "install" => &["install", "package"],
        "uninstall" => &["uninstall", "remove"],
        "start" | "stop" | "restart" | "enable" | "disable" => &["action", "service"],
        "status" => &["status", "info"],
        "logs" => &["logs"],
        "upgrade" => &["upgrade", "install"],
        _ => &["action"],
    }
}

/// Tracks provider health and applies degradation policies.
pub struct DegradationManager {
    catalog: Arc<ProviderCatalog>,
    defaults: Arc<dyn DefaultsSource>,
    health: HealthTracker,
    policies: RwLock<HashMap<String, DegradationPolicy>>,
    default_policy: DegradationPolicy,
}

impl fmt::Debug for DegradationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DegradationManager")
            .field("providers", &self.catalog.len())
            .field("health", &self.health)
            .field("default_policy", &self.default_policy)
            .finish_non_exhaustive()
    }
}

impl DegradationManager {
    /// Create a manager over `catalog`, generating defaults through `defaults`.
    pub fn new(catalog: Arc<ProviderCatalog>, defaults: Arc<dyn DefaultsSource>) -> Self {
        Self {
            catalog,
            defaults,
            health: HealthTracker::new(),
            policies: RwLock::new(HashMap::new()),
            default_policy: DegradationPolicy::default(),
        }
    }

    /// Replace the policy used for actions without their own.
    pub fn with_default_policy(mut self, policy: DegradationPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// The provider catalog.
    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Set the policy for `action`.
    pub fn set_policy(&self, action: &str, policy: DegradationPolicy) {
        self.policies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(action.to_string(), policy);
    }

    /// Policy for `action`, falling back to the default policy.
    pub fn policy(&self, action: &str) -> DegradationPolicy {
        self.policies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(action)
            .cloned()
            .unwrap_or_else(|| self.default_policy.clone())
    }

    /// Record the outcome of using a provider.
    ///
    /// The default policy's `max_failures` applies.
    pub fn update_provider_health(
        &self,
        name: &str,
        success: bool,
        error: Option<&str>,
    ) -> ProviderHealth {
        self.health
            .update(name, success, error, self.default_policy.max_failures)
    }

    /// Record the outcome of using a provider for `action`.
    ///
    /// The failure threshold comes from the policy for `action`. Availability
    /// itself is tracked per provider, not per action.
    pub fn update_action_health(
        &self,
        action: &str,
        name: &str,
        success: bool,
        error: Option<&str>,
    ) -> ProviderHealth {
        let max_failures = self.policy(action).max_failures;
        self.health.update(name, success, error, max_failures)
    }

    /// Whether `name` may be used.
    pub fn is_provider_available(&self, name: &str) -> bool {
        self.health.is_available(name)
    }

    /// Health record for `name`; unknown providers are healthy.
    pub fn provider_health(&self, name: &str) -> ProviderHealth {
        self.health.get(name)
    }

    /// All observed health records, sorted by name.
    pub fn all_provider_health(&self) -> Vec<ProviderHealth> {
        self.health.all()
    }

    /// Forget the health history of `name`.
    pub fn reset_provider_health(&self, name: &str) {
        self.health.reset(name);
    }

    /// Degrade after the caller's preferred providers (`tried`) failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllStrategiesFailed`] when no strategy succeeds.
    pub fn handle_provider_unavailable(
        &self,
        action: &str,
        software: &str,
        tried: &[String],
    ) -> Result<DegradationResult> {
        self.handle_provider_unavailable_excluding(action, software, tried, &[])
    }

    /// Like [`handle_provider_unavailable`](Self::handle_provider_unavailable),
    /// skipping strategies the caller already used without success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllStrategiesFailed`] when no remaining strategy
    /// succeeds. Excluded strategies are listed as attempted.
    pub fn handle_provider_unavailable_excluding(
        &self,
        action: &str,
        software: &str,
        tried: &[String],
        exhausted: &[Strategy],
    ) -> Result<DegradationResult> {
        let policy = self.policy(action);
        let mut attempted: Vec<String> = exhausted
            .iter()
            .filter(|strategy| **strategy != Strategy::ProviderFallback)
            .map(|strategy| strategy.as_str().to_string())
            .collect();

        attempted.insert(0, Strategy::ProviderFallback.as_str().to_string());
        if let Some(result) = self.try_fallback(&policy, action, tried) {
            return Ok(result);
        }

        if policy.use_defaults && !exhausted.contains(&Strategy::IntelligentDefaults) {
            attempted.push(Strategy::IntelligentDefaults.as_str().to_string());
            if let Some(result) = self.try_defaults(software) {
                return Ok(result);
            }
        }

        if policy.allow_partial && !exhausted.contains(&Strategy::PartialFunctionality) {
            attempted.push(Strategy::PartialFunctionality.as_str().to_string());
            if let Some(result) = self.try_partial(action) {
                return Ok(result);
            }
        }

        log::warn!("All degradation strategies failed for {action} {software}");
        Err(Error::AllStrategiesFailed {
            action: action.to_string(),
            software: software.to_string(),
            tried: tried.to_vec(),
            attempted,
        })
    }

    fn try_fallback(
        &self,
        policy: &DegradationPolicy,
        action: &str,
        tried: &[String],
    ) -> Option<DegradationResult> {
        let provider = policy.fallback_providers.iter().find(|name| {
            !tried.contains(*name)
                && self.is_provider_available(name)
                && self.catalog.has_action(name, action)
        })?;

        log::info!("Falling back to provider {provider} for {action}");
        let mut result = DegradationResult::new(Strategy::ProviderFallback);
        result.fallback_provider = Some(provider.clone());
        result
            .warnings
            .push(format!("using fallback provider {provider}"));
        Some(result)
    }

    fn try_defaults(&self, software: &str) -> Option<DegradationResult> {
        match self.defaults.generate_defaults(software) {
            Ok(data) => {
                let mut result = DegradationResult::new(Strategy::IntelligentDefaults);
                result.used_defaults = true;
                result.saidata = Some(data);
                result.warnings.push(format!(
                    "using auto-generated defaults for {software}; results may be incomplete"
                ));
                Some(result)
            }
            Err(e) => {
                log::debug!("Defaults strategy failed for {software}: {e}");
                None
            }
        }
    }

    fn try_partial(&self, action: &str) -> Option<DegradationResult> {
        let required = required_capabilities(action);
        let features: BTreeSet<String> = self
            .catalog
            .providers()
            .filter(|doc| self.is_provider_available(doc.name()))
            .flat_map(|doc| doc.provider.capabilities.iter())
            .filter(|capability| required.contains(&capability.as_str()))
            .cloned()
            .collect();

        if features.is_empty() {
            return None;
        }

        let mut result = DegradationResult::new(Strategy::PartialFunctionality);
        result.partial_success = true;
        result.available_features = features.into_iter().collect();
        result.warnings.push(format!(
            "only partial functionality is available for {action}: {}",
            result.available_features.join(", ")
        ));
        Some(result)
    }
}

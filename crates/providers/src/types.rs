//! Provider document model.
//!
//! A provider document describes one package manager or installation method
//! (apt, brew, source, binary, ...) and the actions it can perform. Action
//! commands are templates resolved against saidata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Joiner for multi-step actions.
const STEP_SEPARATOR: &str = " && ";

/// A complete provider document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderDocument {
    /// Schema version.
    #[serde(default)]
    pub version: String,
    /// Provider identity.
    pub provider: ProviderInfo,
    /// Actions keyed by action name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, Action>,
}

impl ProviderDocument {
    /// Provider name.
    pub fn name(&self) -> &str {
        &self.provider.name
    }

    /// Action definition, if declared.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    /// Whether the provider declares `action`.
    pub fn has_action(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    /// Whether the provider declares `capability`.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.provider.capabilities.iter().any(|c| c == capability)
    }
}

/// Provider identity and metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Unique provider name.
    pub name: String,
    /// Human-friendly name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Provider kind (package_manager, source, binary, script, container, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<String>,
    /// Platforms the provider runs on; empty means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,
    /// Declared capabilities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    /// Selection priority; higher is preferred.
    #[serde(default)]
    pub priority: i32,
    /// Executable that must be present for the provider to work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
}

impl ProviderInfo {
    /// Whether the provider runs on `platform` (case-insensitive).
    pub fn supports_platform(&self, platform: &str) -> bool {
        self.platforms.is_empty()
            || self
                .platforms
                .iter()
                .any(|p| p == "all" || p.eq_ignore_ascii_case(platform))
    }
}

/// One step of a multi-step action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Command template.
    pub command: String,
    /// Continue when this step fails.
    #[serde(default)]
    pub ignore_failure: bool,
}

/// Post-action validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionValidation {
    /// Command template to run.
    pub command: String,
    /// Expected exit code.
    #[serde(default)]
    pub expected_exit_code: i32,
    /// Expected substring of the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
}

/// Retry behaviour of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// Delay between attempts in seconds.
    #[serde(default)]
    pub delay: u64,
    /// Backoff kind ("linear" or "exponential").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff: Option<String>,
}

fn default_attempts() -> u32 {
    1
}

/// One action a provider can perform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Command template (preferred).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Plain command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Inline script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Multi-step command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    /// Whether the action needs elevated privileges.
    #[serde(default)]
    pub requires_root: bool,
    /// Timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Post-action validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ActionValidation>,
    /// Rollback command template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback: Option<String>,
    /// Retry behaviour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryConfig>,
}

impl Action {
    /// Command template to resolve: `template`, else `command`, else
    /// `script`, else the steps joined with `&&`.
    pub fn effective_command(&self) -> Option<String> {
        [&self.template, &self.command, &self.script]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .cloned()
            .or_else(|| {
                (!self.steps.is_empty()).then(|| {
                    self.steps
                        .iter()
                        .map(|step| step.command.as_str())
                        .collect::<Vec<_>>()
                        .join(STEP_SEPARATOR)
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APT: &str = r"
version: '1.0'
provider:
  name: apt
  display_name: APT
  type: package_manager
  platforms: [linux]
  capabilities: [install, uninstall, upgrade, search, info, package]
  priority: 90
  executable: apt-get
actions:
  install:
    description: Install packages
    template: apt-get install -y {{sai_package(0, 'package_name', 'apt')}}
    requires_root: true
    timeout: 600
    validation:
      command: dpkg -s {{sai_package(0, 'package_name', 'apt')}}
      expected_exit_code: 0
    rollback: apt-get remove -y {{sai_package(0, 'package_name', 'apt')}}
    retry:
      attempts: 3
      delay: 5
      backoff: exponential
  refresh:
    steps:
      - name: update
        command: apt-get update
      - command: apt-get upgrade -y
        ignore_failure: true
";

    #[test]
    fn test_parse_provider_document() {
        let doc: ProviderDocument = serde_yaml::from_str(APT).unwrap();
        assert_eq!(doc.name(), "apt");
        assert_eq!(doc.provider.provider_type.as_deref(), Some("package_manager"));
        assert_eq!(doc.provider.priority, 90);
        assert!(doc.has_action("install"));
        assert!(!doc.has_action("start"));
        assert!(doc.has_capability("package"));

        let install = doc.action("install").unwrap();
        assert!(install.requires_root);
        assert_eq!(install.retry.as_ref().unwrap().attempts, 3);
        assert_eq!(install.validation.as_ref().unwrap().expected_exit_code, 0);
    }

    #[test]
    fn test_effective_command_precedence() {
        let doc: ProviderDocument = serde_yaml::from_str(APT).unwrap();
        assert_eq!(
            doc.action("install").unwrap().effective_command().as_deref(),
            Some("apt-get install -y {{sai_package(0, 'package_name', 'apt')}}")
        );
        assert_eq!(
            doc.action("refresh").unwrap().effective_command().as_deref(),
            Some("apt-get update && apt-get upgrade -y")
        );

        let action = Action {
            command: Some("brew install x".to_string()),
            script: Some("echo".to_string()),
            ..Default::default()
        };
        assert_eq!(action.effective_command().as_deref(), Some("brew install x"));
        assert_eq!(Action::default().effective_command(), None);
    }

    #[test]
    fn test_platform_support() {
        let doc: ProviderDocument = serde_yaml::from_str(APT).unwrap();
        assert!(doc.provider.supports_platform("Linux"));
        assert!(!doc.provider.supports_platform("macos"));
        assert!(ProviderInfo::default().supports_platform("windows"));
    }
}

//! # providers
//!
//! Provider documents, provider health and graceful degradation.
//!
//! This crate provides functionality for:
//! - Parsing provider YAML documents and loading them into a catalog
//! - Tracking provider health across a session
//! - Choosing a fallback when the preferred provider cannot serve a request
//!
//! ## Example
//!
//! ```no_run
//! use providers::{DegradationManager, ProviderCatalog};
//! use saidata::DefaultsGenerator;
//! use std::path::Path;
//! use std::sync::Arc;
//! use sysprobe::{ResourceValidator, platform};
//!
//! let catalog = ProviderCatalog::load_dir(Path::new("/usr/share/sai/providers")).unwrap();
//! let validator = ResourceValidator::new(platform::detect().unwrap());
//! let manager = DegradationManager::new(
//!     Arc::new(catalog),
//!     Arc::new(DefaultsGenerator::new(validator)),
//! );
//!
//! manager.update_provider_health("apt", false, Some("dpkg lock held"));
//! let outcome = manager.handle_provider_unavailable("install", "nginx", &["apt".to_string()]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod degradation;
pub mod error;
pub mod health;
pub mod types;

pub use catalog::ProviderCatalog;
pub use degradation::{
    DefaultsSource, DegradationManager, DegradationPolicy, DegradationResult, Strategy,
    required_capabilities,
};
pub use error::{Error, ErrorCategory, Result};
pub use health::{HealthTracker, ProviderHealth};
pub use types::{Action, ActionValidation, ProviderDocument, ProviderInfo, RetryConfig, Step};

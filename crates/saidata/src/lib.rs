//! # saidata
//!
//! Software metadata ("saidata") for cross-platform software management.
//!
//! This crate provides functionality for:
//! - The saidata document model and its YAML representation
//! - Merging OS-specific overrides into base documents
//! - Validating a document's resources against the live system
//! - Generating best-effort defaults for undocumented software
//! - Loading and caching documents from a sharded directory tree
//!
//! ## Example
//!
//! ```no_run
//! use saidata::SaidataManager;
//! use sysprobe::{ResourceValidator, platform};
//!
//! let validator = ResourceValidator::new(platform::detect().unwrap());
//! let manager = SaidataManager::new("/usr/share/sai/saidata", validator);
//!
//! let nginx = manager.load_software("nginx").unwrap();
//! for package in &nginx.packages {
//!     println!("{}", package.name);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod defaults;
pub mod error;
pub mod manager;
pub mod merge;
pub mod types;
pub mod validation;

pub use defaults::{DefaultsGenerator, well_known_ports};
pub use error::{Error, ErrorCategory, Result};
pub use manager::{SaidataManager, SoftwareSummary, shard_prefix};
pub use merge::{Keyed, merge, merge_keyed};
pub use types::*;
pub use validation::{
    ActionClass, ResourceKind, ValidationResult, can_proceed, validate_resource_exists,
    validate_resources,
};

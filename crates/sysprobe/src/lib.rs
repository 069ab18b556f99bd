//! # sysprobe
//!
//! Platform detection and live resource probes.
//!
//! This crate provides functionality for:
//! - Detecting the host platform and OS release
//! - Conventional resource locations per platform
//! - Checking files, directories, commands, services and TCP ports
//!
//! ## Example
//!
//! ```no_run
//! use sysprobe::{ResourceValidator, platform};
//!
//! let validator = ResourceValidator::new(platform::detect().unwrap());
//! if validator.validate_port(8080) {
//!     println!("something is listening on 8080");
//! }
//! ```
//!
//! ## Testing
//!
//! Use [`MockPlatform`] to make service lookups and search-path resolution
//! deterministic.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod os;
pub mod platform;
pub mod validator;

pub use error::{Error, ErrorCategory, Result};
pub use os::OsRelease;
pub use platform::{
    ConventionalPaths, LinuxPlatform, MacOsPlatform, MockPlatform, Os, Platform, WindowsPlatform,
};
pub use validator::{DEFAULT_PORT_TIMEOUT, ResourceValidator};

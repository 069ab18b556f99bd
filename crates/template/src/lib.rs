//! # template
//!
//! Resolution of provider command templates against saidata.
//!
//! Provider actions describe commands with embedded calls such as
//! `{{sai_package(0, 'package_name')}}`. This crate tokenizes such templates
//! and substitutes each call with a field of the addressed entity, preferring
//! the provider's override section when one applies.
//!
//! ## Example
//!
//! ```
//! use saidata::{SoftwareData, Source};
//! use template::TemplateEngine;
//!
//! let mut data = SoftwareData::new("nginx");
//! data.sources.push(Source {
//!     name: "main".to_string(),
//!     url: Some("https://nginx.org/download/nginx-1.25.3.tar.gz".to_string()),
//!     ..Default::default()
//! });
//!
//! let engine = TemplateEngine::new(&data, None);
//! let url = engine.execute("curl -LO {{sai_source(0, 'url')}}").unwrap();
//! assert_eq!(url, "curl -LO https://nginx.org/download/nginx-1.25.3.tar.gz");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod fields;
pub mod parser;

pub use engine::TemplateEngine;
pub use error::{Error, ErrorCategory, Result};
pub use fields::{FieldAccess, Lookup};
pub use parser::{Call, Kind, Template, Token};

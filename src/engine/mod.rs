//! Request resolution for sai
//!
//! A request names an action and a software. The engine:
//! 1. Loads merged saidata for the current platform
//! 2. Validates the resources the action depends on
//! 3. Renders the action template of the best available provider
//! 4. Degrades (fallback provider, generated defaults, partial support)
//!    when no provider can serve the request

pub mod resolver;

pub use resolver::{Engine, Resolution, Settings};

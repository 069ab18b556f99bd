// Software actions (install, start, ...)
pub mod action;

// Saidata inspection
pub mod saidata;
pub mod search;

pub mod providers;

//! Shared ambient helpers: logging setup and startup environment checks.

pub mod env;
pub mod utils;

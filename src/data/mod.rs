//! Resolved analysis data.
//!
//! - read-only yield/efficiency/luminosity lookups (`resolver`)

pub mod resolver;

pub use resolver::*;

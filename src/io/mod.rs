//! Input/output helpers.
//!
//! - report JSON export (`export`)

pub mod export;

pub use export::*;

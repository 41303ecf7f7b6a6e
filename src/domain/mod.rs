//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - measured quantities (`Quantity`) and their addressing
//!   (`Channel`, `Era`, `ChannelKey`, `Observable`)
//! - the declared comparison plan (`ComparisonSpec`, `RowSpec`)
//! - engine outputs (`RatioResult`, `PullResult`, `ComparisonReport`)

pub mod types;

pub use types::*;

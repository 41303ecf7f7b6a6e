//! The ratio/pull engine.
//!
//! Responsibilities:
//!
//! - single and efficiency-corrected ratios (`ratio`)
//! - ratio-of-ratios for systematic cancellation (`ratio::double_ratio`)
//! - tension against reference values (`pull`)
//! - orchestration over a declared comparison plan (`comparator`)
//!
//! Every function here is a pure function of its inputs: no I/O, no shared
//! state, nothing mutated after construction.

pub mod comparator;
pub mod pull;
pub mod ratio;

pub use comparator::*;
pub use pull::*;
pub use ratio::*;

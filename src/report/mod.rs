//! Report rendering.
//!
//! All rounding and alignment happens here; the engine hands over unrounded
//! values and signed pulls.

pub mod format;

pub use format::*;

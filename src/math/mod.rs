//! Mathematical utilities: quadrature uncertainty propagation.

pub mod propagate;

pub use propagate::*;

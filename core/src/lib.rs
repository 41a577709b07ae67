//! Constraint layer of a 2-D geometric constraint solver.
//!
//! Geometry is stored as parameter cells in a [`ParamStore`]; constraints hold
//! handles to those cells and expose residuals, partial derivatives and step
//! limits to an outer iterative solver.

pub mod config;
pub mod constraints;
pub mod diagnostics;
pub mod dual;
pub mod geometry;
pub mod params;
pub mod redirect;

pub use config::{ConfigError, Settings};
pub use constraints::{Constraint, ConstraintBase, ConstraintError, ConstraintKind, ConstraintResult};
pub use diagnostics::{check_gradients, ConstraintInfo, GradientMismatch};
pub use params::{ParamId, ParamStore, StepDirection, SubstitutionMap};
pub use redirect::{ConstraintSet, Redirected};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Handle-only geometric primitives consumed by the constraint layer.
//!
//! Primitives never hold numbers, only [`ParamId`](crate::params::ParamId)s into a
//! [`ParamStore`](crate::params::ParamStore). A
//! constraint that needs its own copy of a primitive clones it and re-links the
//! copy from its positional parameter list through [`ParamLayout::rebuild`].

use crate::params::ParamId;
use thiserror::Error;

pub mod primitives;
pub use primitives::*;

pub mod bspline;
pub use bspline::{pole_window, BSpline, BSplineBasis, Blend};

pub mod curve;
pub use curve::Curve;

/// Errors raised while assembling geometry from handles.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("knot vector and multiplicities differ in length ({knots} vs {mults})")]
    KnotMultiplicityMismatch { knots: usize, mults: usize },

    #[error("knot vector must be strictly increasing")]
    UnorderedKnots,

    #[error("B-spline degree must be at least 1")]
    ZeroDegree,

    #[error("invalid end multiplicities for a {0} B-spline")]
    BadEndMultiplicity(&'static str),

    #[error("expected {expected} {what}, got {got}")]
    CountMismatch { what: &'static str, expected: usize, got: usize },
}

pub type GeometryResult<T> = Result<T, GeometryError>;

/// Fixed flattening order of a primitive's handles.
pub trait ParamLayout {
    /// Appends this primitive's handles in layout order.
    fn push_params(&self, out: &mut Vec<ParamId>);

    /// Re-links this primitive from `params[*cursor..]`, advancing the cursor.
    fn rebuild(&mut self, params: &[ParamId], cursor: &mut usize);

    fn param_count(&self) -> usize {
        let mut out = Vec::new();
        self.push_params(&mut out);
        out.len()
    }
}

/// Point given by two coordinate cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: ParamId,
    pub y: ParamId,
}

impl Point {
    pub fn new(x: ParamId, y: ParamId) -> Self {
        Self { x, y }
    }
}

impl ParamLayout for Point {
    fn push_params(&self, out: &mut Vec<ParamId>) {
        out.push(self.x);
        out.push(self.y);
    }

    fn rebuild(&mut self, params: &[ParamId], cursor: &mut usize) {
        self.x = params[*cursor];
        self.y = params[*cursor + 1];
        *cursor += 2;
    }

    fn param_count(&self) -> usize {
        2
    }
}

pub(crate) fn take(params: &[ParamId], cursor: &mut usize) -> ParamId {
    let id = params[*cursor];
    *cursor += 1;
    id
}

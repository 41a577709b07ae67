//! Low-level solver constraints.
//!
//! Each constraint is one scalar equation over an ordered list of parameter
//! handles. The solver only ever talks to the [`Constraint`] trait: residual,
//! partial derivatives, step limiting, rescaling and handle redirection.
//!
//! Constraints never own the cells they reference and never write cell values.
//! Redirection swaps handles in the constraint's `current` list; the handles seen
//! at construction stay in `original` so the swap can always be undone.

use crate::geometry::GeometryError;
use crate::params::{ParamId, ParamStore, StepDirection, SubstitutionMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod algebraic;
pub mod bspline;
pub mod conics;
pub mod curves;
pub mod distance;
pub mod lines;

pub use algebraic::{CenterOfGravity, Difference, Equal, WeightedLinearCombination};
pub use bspline::{Axis, PointOnBSpline, SlopeAtBSplineKnot};
pub use conics::{
    EllipseAlignment, EllipticalArcRangeToEndPoints, EqualFocalDistance, EqualMajorAxesConic, HyperbolaAlignment,
    InternalAlignmentPointEllipse, InternalAlignmentPointHyperbola, PointOnEllipse, PointOnHyperbola, PointOnParabola,
    TangentCircles, TangentEllipseLine,
};
pub use curves::{
    AngleViaPoint, AngleViaPointAndParam, AngleViaPointAndTwoParams, AngleViaTwoPoints, CurveValue, Snell,
};
pub use distance::{
    ArcLength, DistanceCircleCircle, DistanceCircleLine, DistancePointCircle, DistancePointLine, DistancePointPoint,
    EqualLineLength,
};
pub use lines::{
    AngleLineLine, AnglePointPoint, MidpointOnLine, Parallel, Perpendicular, PointOnLine, PointOnPerpBisector,
};

#[cfg(test)]
mod tests_algebraic;
#[cfg(test)]
mod tests_bspline;
#[cfg(test)]
mod tests_conics;
#[cfg(test)]
mod tests_lines;

/// Largest angular step (10 degrees) an angle-like cell may take in one iteration.
pub const MAX_ANGLE_STEP: f64 = std::f64::consts::PI / 18.0;

/// Construction-time misuse of a constraint.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstraintError {
    #[error("{what}: expected {expected}, got {got}")]
    CountMismatch { what: &'static str, expected: usize, got: usize },

    #[error("{constraint} does not accept a {curve}")]
    UnsupportedCurve { constraint: ConstraintKind, curve: &'static str },

    #[error("constrained coordinate {0} is neither coordinate of the point")]
    ForeignCoordinate(ParamId),

    #[error("knot index {index} out of range (B-spline has {knots} knots)")]
    KnotOutOfRange { index: usize, knots: usize },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Every relation the constraint layer can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    Equal,
    Difference,
    DistancePointPoint,
    AnglePointPoint,
    DistancePointLine,
    PointOnLine,
    PointOnPerpBisector,
    Parallel,
    Perpendicular,
    AngleLineLine,
    MidpointOnLine,
    TangentCircles,
    PointOnEllipse,
    TangentEllipseLine,
    InternalAlignmentPointEllipse,
    EqualMajorAxesConic,
    EllipticalArcRangeToEndPoints,
    AngleViaPoint,
    Snell,
    CurveValue,
    PointOnHyperbola,
    InternalAlignmentPointHyperbola,
    PointOnParabola,
    EqualFocalDistance,
    EqualLineLength,
    CenterOfGravity,
    WeightedLinearCombination,
    SlopeAtBSplineKnot,
    PointOnBSpline,
    DistanceCircleCircle,
    DistanceCircleLine,
    DistancePointCircle,
    AngleViaPointAndParam,
    AngleViaPointAndTwoParams,
    AngleViaTwoPoints,
    ArcLength,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// State shared by every constraint: handle lists, scale and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintBase {
    original: Vec<ParamId>,
    current: Vec<ParamId>,
    scale: f64,
    tag: i32,
    driving: bool,
    internal_alignment: bool,
    alias_dirty: bool,
}

impl ConstraintBase {
    pub fn new(params: Vec<ParamId>) -> Self {
        Self {
            original: params.clone(),
            current: params,
            scale: 1.0,
            tag: 0,
            driving: true,
            internal_alignment: false,
            alias_dirty: false,
        }
    }

    pub(crate) fn internal(params: Vec<ParamId>) -> Self {
        Self { internal_alignment: true, ..Self::new(params) }
    }

    pub fn params(&self) -> &[ParamId] {
        &self.current
    }

    pub fn original_params(&self) -> &[ParamId] {
        &self.original
    }

    /// Handle at position `i` of the current list.
    #[inline]
    pub fn at(&self, i: usize) -> ParamId {
        self.current[i]
    }

    /// Position of the first occurrence of `param`.
    pub fn position_of(&self, param: ParamId) -> Option<usize> {
        self.current.iter().position(|&p| p == param)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn alias_dirty(&self) -> bool {
        self.alias_dirty
    }

    fn redirect(&mut self, map: &SubstitutionMap) {
        for p in self.current.iter_mut() {
            if let Some(&to) = map.get(p) {
                *p = to;
            }
        }
        self.alias_dirty = true;
    }

    fn revert(&mut self) {
        self.current.clone_from(&self.original);
        self.alias_dirty = true;
    }
}

/// Uniform solver-facing contract of every constraint.
///
/// Implementors provide the raw (unscaled) equation through
/// [`Constraint::error_grad`]; everything else has a default in terms of it.
pub trait Constraint: fmt::Debug {
    fn kind(&self) -> ConstraintKind;

    fn base(&self) -> &ConstraintBase;

    fn base_mut(&mut self) -> &mut ConstraintBase;

    /// Unscaled residual and, when `wrt` is given, its derivative with respect to
    /// that cell. Implementations may assume `wrt` occurs in the parameter list.
    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64);

    /// Geometry-derived factor folded into the scale by [`Constraint::rescale`].
    fn normalization(&self, _store: &ParamStore) -> f64 {
        1.0
    }

    /// Re-links cached geometry copies from the current handle list.
    fn rebuild_geometry(&mut self) {}

    /// Largest fraction of `dir` (capped at `limit`) that keeps the operands valid.
    fn max_step(&self, _store: &ParamStore, _dir: &StepDirection, limit: f64) -> f64 {
        limit
    }

    fn params(&self) -> &[ParamId] {
        self.base().params()
    }

    fn residual(&self, store: &ParamStore) -> f64 {
        self.residual_and_derivative(store, None).0
    }

    /// Zero for any handle not in [`Constraint::params`].
    fn partial_derivative(&self, store: &ParamStore, param: ParamId) -> f64 {
        self.residual_and_derivative(store, Some(param)).1
    }

    fn residual_and_derivative(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let wrt = wrt.filter(|&p| self.base().position_of(p).is_some());
        let (err, grad) = self.error_grad(store, wrt);
        let scale = self.base().scale;
        let grad = if wrt.is_some() { scale * grad } else { 0.0 };
        (scale * err, grad)
    }

    /// Sets the scale to `coef` times the constraint's geometric normalization.
    fn rescale(&mut self, store: &ParamStore, coef: f64) {
        if !(coef.is_finite() && coef > 0.0) {
            tracing::warn!(kind = %self.kind(), coef, "ignoring non-positive rescale coefficient");
            return;
        }
        let norm = self.normalization(store);
        let norm = if norm.is_finite() && norm > 0.0 { norm } else { 1.0 };
        self.base_mut().scale = coef * norm;
    }

    fn redirect_params(&mut self, map: &SubstitutionMap) {
        self.base_mut().redirect(map);
    }

    fn revert_params(&mut self) {
        self.base_mut().revert();
    }

    fn resynchronize(&mut self) {
        if self.base().alias_dirty {
            self.rebuild_geometry();
            self.base_mut().alias_dirty = false;
        }
    }

    fn tag(&self) -> i32 {
        self.base().tag
    }

    fn set_tag(&mut self, tag: i32) {
        self.base_mut().tag = tag;
    }

    fn is_driving(&self) -> bool {
        self.base().driving
    }

    fn set_driving(&mut self, driving: bool) {
        self.base_mut().driving = driving;
    }

    fn is_internal_alignment(&self) -> bool {
        self.base().internal_alignment
    }

    fn set_internal_alignment(&mut self, internal: bool) {
        self.base_mut().internal_alignment = internal;
    }
}

/// Expands to the `kind`/`base`/`base_mut` trio of a `Constraint` impl.
macro_rules! constraint_base {
    ($kind:ident) => {
        fn kind(&self) -> $crate::constraints::ConstraintKind {
            $crate::constraints::ConstraintKind::$kind
        }

        fn base(&self) -> &$crate::constraints::ConstraintBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut $crate::constraints::ConstraintBase {
            &mut self.base
        }
    };
}
pub(crate) use constraint_base;

/// Reads the step of `param` from a direction map.
#[inline]
pub(crate) fn step_of(dir: &StepDirection, param: ParamId) -> Option<f64> {
    dir.get(&param).copied()
}

/// Caps `limit` so that an angle-like cell moves at most [`MAX_ANGLE_STEP`].
pub(crate) fn limit_angle_step(dir: &StepDirection, param: ParamId, limit: f64) -> f64 {
    match step_of(dir, param) {
        Some(step) if step.abs() > MAX_ANGLE_STEP => limit.min(MAX_ANGLE_STEP / step.abs()),
        _ => limit,
    }
}

/// Caps `limit` so that a non-negative cell does not drop below zero.
pub(crate) fn limit_non_negative(store: &ParamStore, dir: &StepDirection, param: ParamId, limit: f64) -> f64 {
    match step_of(dir, param) {
        Some(step) if step < 0.0 => limit.min((-store.get(param) / step).max(0.0)),
        _ => limit,
    }
}

/// Debug-build check of the redirect/resynchronize protocol.
#[inline]
pub(crate) fn assert_synced(base: &ConstraintBase) {
    debug_assert!(!base.alias_dirty, "constraint evaluated after redirect/revert without resynchronize");
}

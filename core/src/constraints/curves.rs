//! Curve-generic relations evaluated through normals and parametric values.
//!
//! Every constraint here owns clones of its curves and points of interest. The
//! clones carry their own handles, so they must be re-linked from the current
//! parameter list after each redirect or revert (see [`Constraint::resynchronize`]).

use super::{
    assert_synced, constraint_base, limit_angle_step, Constraint, ConstraintBase, ConstraintError, ConstraintResult,
};
use crate::dual::{angle_between, Dual, DualVec2};
use crate::geometry::{Curve, ParamLayout, Point};
use crate::params::{ParamId, ParamStore, StepDirection};

/// Rotates `v` counter-clockwise by `a`.
fn rotate(v: DualVec2, a: Dual) -> DualVec2 {
    let (s, c) = (a.sin(), a.cos());
    DualVec2::from_duals(v.x() * c - v.y() * s, v.x() * s + v.y() * c)
}

/// Signed angle from `n1` (rotated by `angle`) to `n2`.
fn angle_error(n1: DualVec2, n2: DualVec2, angle: Dual) -> (f64, f64) {
    let err = angle_between(&rotate(n1, angle), &n2);
    (err.v, err.d)
}

/// Angle between the normals of two curves at a common point.
///
/// Layout: `[angle, poa.x, poa.y, crv1, crv2]`.
#[derive(Debug, Clone)]
pub struct AngleViaPoint {
    base: ConstraintBase,
    crv1: Curve,
    crv2: Curve,
    poa: Point,
}

impl AngleViaPoint {
    pub fn new(crv1: &Curve, crv2: &Curve, poa: &Point, angle: ParamId) -> Self {
        let mut params = vec![angle];
        poa.push_params(&mut params);
        crv1.push_params(&mut params);
        crv2.push_params(&mut params);
        Self { base: ConstraintBase::new(params), crv1: crv1.clone(), crv2: crv2.clone(), poa: *poa }
    }
}

impl Constraint for AngleViaPoint {
    constraint_base!(AngleViaPoint);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let angle = store.dual(self.base.at(0), wrt);
        let n1 = self.crv1.normal_at(store, &self.poa, wrt);
        let n2 = self.crv2.normal_at(store, &self.poa, wrt);
        angle_error(n1, n2, angle)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 1;
        self.poa.rebuild(params, &mut cursor);
        self.crv1.rebuild(params, &mut cursor);
        self.crv2.rebuild(params, &mut cursor);
    }
}

/// Angle between the normal of `crv1` at `p1` and that of `crv2` at `p2`.
///
/// Layout: `[angle, p1 (2), p2 (2), crv1, crv2]`.
#[derive(Debug, Clone)]
pub struct AngleViaTwoPoints {
    base: ConstraintBase,
    crv1: Curve,
    crv2: Curve,
    poa1: Point,
    poa2: Point,
}

impl AngleViaTwoPoints {
    pub fn new(crv1: &Curve, crv2: &Curve, p1: &Point, p2: &Point, angle: ParamId) -> Self {
        let mut params = vec![angle];
        p1.push_params(&mut params);
        p2.push_params(&mut params);
        crv1.push_params(&mut params);
        crv2.push_params(&mut params);
        Self {
            base: ConstraintBase::new(params),
            crv1: crv1.clone(),
            crv2: crv2.clone(),
            poa1: *p1,
            poa2: *p2,
        }
    }
}

impl Constraint for AngleViaTwoPoints {
    constraint_base!(AngleViaTwoPoints);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let angle = store.dual(self.base.at(0), wrt);
        let n1 = self.crv1.normal_at(store, &self.poa1, wrt);
        let n2 = self.crv2.normal_at(store, &self.poa2, wrt);
        angle_error(n1, n2, angle)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 1;
        self.poa1.rebuild(params, &mut cursor);
        self.poa2.rebuild(params, &mut cursor);
        self.crv1.rebuild(params, &mut cursor);
        self.crv2.rebuild(params, &mut cursor);
    }
}

/// Like [`AngleViaPoint`] but the normal of `crv1` is taken at parameter `u`.
///
/// Layout: `[angle, poa (2), u, crv1, crv2]`.
#[derive(Debug, Clone)]
pub struct AngleViaPointAndParam {
    base: ConstraintBase,
    crv1: Curve,
    crv2: Curve,
    poa: Point,
}

impl AngleViaPointAndParam {
    pub fn new(crv1: &Curve, crv2: &Curve, poa: &Point, u: ParamId, angle: ParamId) -> Self {
        let mut params = vec![angle];
        poa.push_params(&mut params);
        params.push(u);
        crv1.push_params(&mut params);
        crv2.push_params(&mut params);
        Self { base: ConstraintBase::new(params), crv1: crv1.clone(), crv2: crv2.clone(), poa: *poa }
    }
}

impl Constraint for AngleViaPointAndParam {
    constraint_base!(AngleViaPointAndParam);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let angle = store.dual(self.base.at(0), wrt);
        let u = store.dual(self.base.at(3), wrt);
        let n1 = self.crv1.normal_at_param(store, u, wrt);
        let n2 = self.crv2.normal_at(store, &self.poa, wrt);
        angle_error(n1, n2, angle)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 1;
        self.poa.rebuild(params, &mut cursor);
        cursor += 1;
        self.crv1.rebuild(params, &mut cursor);
        self.crv2.rebuild(params, &mut cursor);
    }
}

/// Angle between the normals of `crv1` at `u1` and of `crv2` at `u2`.
///
/// Layout: `[angle, poa (2), u1, u2, crv1, crv2]`.
#[derive(Debug, Clone)]
pub struct AngleViaPointAndTwoParams {
    base: ConstraintBase,
    crv1: Curve,
    crv2: Curve,
    poa: Point,
}

impl AngleViaPointAndTwoParams {
    pub fn new(crv1: &Curve, crv2: &Curve, poa: &Point, u1: ParamId, u2: ParamId, angle: ParamId) -> Self {
        let mut params = vec![angle];
        poa.push_params(&mut params);
        params.push(u1);
        params.push(u2);
        crv1.push_params(&mut params);
        crv2.push_params(&mut params);
        Self { base: ConstraintBase::new(params), crv1: crv1.clone(), crv2: crv2.clone(), poa: *poa }
    }
}

impl Constraint for AngleViaPointAndTwoParams {
    constraint_base!(AngleViaPointAndTwoParams);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let angle = store.dual(self.base.at(0), wrt);
        let u1 = store.dual(self.base.at(3), wrt);
        let u2 = store.dual(self.base.at(4), wrt);
        let n1 = self.crv1.normal_at_param(store, u1, wrt);
        let n2 = self.crv2.normal_at_param(store, u2, wrt);
        angle_error(n1, n2, angle)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 1;
        self.poa.rebuild(params, &mut cursor);
        cursor += 2;
        self.crv1.rebuild(params, &mut cursor);
        self.crv2.rebuild(params, &mut cursor);
    }
}

/// Refraction law at a point shared by two rays and a boundary:
/// `n1 * sin(theta1) = n2 * sin(theta2)`.
///
/// Layout: `[n1, n2, poa (2), ray1, ray2, boundary]`.
#[derive(Debug, Clone)]
pub struct Snell {
    base: ConstraintBase,
    ray1: Curve,
    ray2: Curve,
    boundary: Curve,
    poa: Point,
    flip1: bool,
    flip2: bool,
}

impl Snell {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ray1: &Curve,
        ray2: &Curve,
        boundary: &Curve,
        poa: &Point,
        n1: ParamId,
        n2: ParamId,
        flip1: bool,
        flip2: bool,
    ) -> Self {
        let mut params = vec![n1, n2];
        poa.push_params(&mut params);
        ray1.push_params(&mut params);
        ray2.push_params(&mut params);
        boundary.push_params(&mut params);
        Self {
            base: ConstraintBase::new(params),
            ray1: ray1.clone(),
            ray2: ray2.clone(),
            boundary: boundary.clone(),
            poa: *poa,
            flip1,
            flip2,
        }
    }

    fn unit_tangent(&self, crv: &Curve, store: &ParamStore, wrt: Option<ParamId>) -> DualVec2 {
        crv.normal_at(store, &self.poa, wrt).rot90cw().normalized()
    }
}

impl Constraint for Snell {
    constraint_base!(Snell);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let n1 = store.dual(self.base.at(0), wrt);
        let n2 = store.dual(self.base.at(1), wrt);
        let tangent_b = self.unit_tangent(&self.boundary, store, wrt);
        let mut sin1 = self.unit_tangent(&self.ray1, store, wrt).dot(&tangent_b);
        let mut sin2 = self.unit_tangent(&self.ray2, store, wrt).dot(&tangent_b);
        if self.flip1 {
            sin1 = -sin1;
        }
        if self.flip2 {
            sin2 = -sin2;
        }
        let err = n1 * sin1 - n2 * sin2;
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 2;
        self.poa.rebuild(params, &mut cursor);
        self.ray1.rebuild(params, &mut cursor);
        self.ray2.rebuild(params, &mut cursor);
        self.boundary.rebuild(params, &mut cursor);
    }
}

/// One coordinate of a point equals the same coordinate of `crv(u)`.
///
/// Layout: `[p.x, p.y, pcoord, u, crv]`. `pcoord` repeats whichever coordinate
/// of `p` is constrained.
#[derive(Debug, Clone)]
pub struct CurveValue {
    base: ConstraintBase,
    crv: Curve,
    x_axis: bool,
}

impl CurveValue {
    pub fn new(p: &Point, pcoord: ParamId, crv: &Curve, u: ParamId) -> ConstraintResult<Self> {
        let x_axis = if pcoord == p.x {
            true
        } else if pcoord == p.y {
            false
        } else {
            return Err(ConstraintError::ForeignCoordinate(pcoord));
        };
        let mut params = vec![p.x, p.y, pcoord, u];
        crv.push_params(&mut params);
        tracing::trace!(axis = if x_axis { "x" } else { "y" }, curve = crv.name(), "curve value constraint");
        Ok(Self { base: ConstraintBase::new(params), crv: crv.clone(), x_axis })
    }
}

impl Constraint for CurveValue {
    constraint_base!(CurveValue);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let coord = store.dual(self.base.at(2), wrt);
        let u = store.dual(self.base.at(3), wrt);
        let value = self.crv.value(store, u, wrt);
        let target = if self.x_axis { value.x() } else { value.y() };
        let err = target - coord;
        (err.v, err.d)
    }

    fn max_step(&self, _store: &ParamStore, dir: &StepDirection, limit: f64) -> f64 {
        limit_angle_step(dir, self.base.at(3), limit)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 4;
        self.crv.rebuild(params, &mut cursor);
    }
}

//! Relations that evaluate a rational B-spline from its pole and weight cells.

use super::{constraint_base, Constraint, ConstraintBase, ConstraintError, ConstraintResult};
use crate::dual::{Dual, DualVec2};
use crate::geometry::{pole_window, BSpline, BSplineBasis, Line, ParamLayout};
use crate::params::{seed, ParamId, ParamStore};
use serde::{Deserialize, Serialize};

/// Coordinate a per-axis constraint acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// One coordinate of a point equals that coordinate of the spline at `u`.
///
/// Layout: `[point, u, pole_1.axis, .., pole_n.axis, w_1, .., w_n]`. Only the
/// `degree + 1` poles of the span containing `u` contribute; for periodic
/// splines that window wraps around the end of storage.
#[derive(Debug, Clone)]
pub struct PointOnBSpline {
    base: ConstraintBase,
    basis: BSplineBasis,
    axis: Axis,
}

impl PointOnBSpline {
    pub fn new(point: ParamId, u: ParamId, axis: Axis, bspline: &BSpline) -> Self {
        let n = bspline.poles.len();
        let mut params = Vec::with_capacity(2 + 2 * n);
        params.push(point);
        params.push(u);
        params.extend(bspline.poles.iter().map(|p| match axis {
            Axis::X => p.x,
            Axis::Y => p.y,
        }));
        params.extend_from_slice(&bspline.weights);
        tracing::trace!(poles = n, degree = bspline.basis.degree(), ?axis, "point on B-spline");
        Self { base: ConstraintBase::new(params), basis: bspline.basis.clone(), axis }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    fn pole_count(&self) -> usize {
        self.basis.pole_count()
    }

    fn pole(&self, i: usize) -> ParamId {
        self.base.at(2 + i)
    }

    fn weight(&self, i: usize) -> ParamId {
        self.base.at(2 + self.pole_count() + i)
    }

    /// First pole of the span containing the current value of `u`.
    pub fn start_pole(&self, store: &ParamStore) -> usize {
        self.basis.start_pole(store.get(self.base.at(1)))
    }

    /// Storage indices of the poles contributing at the current `u`.
    pub fn window(&self, store: &ParamStore) -> Vec<usize> {
        pole_window(self.start_pole(store), self.basis.degree() + 1, self.pole_count()).collect()
    }
}

impl Constraint for PointOnBSpline {
    constraint_base!(PointOnBSpline);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let (q_id, u_id) = (self.base.at(0), self.base.at(1));
        let q = store.get(q_id);
        let blend = self.basis.blend(store.get(u_id), 1);
        let window = pole_window(blend.start_pole, self.basis.degree() + 1, self.pole_count());

        let mut err = 0.0;
        let mut grad = 0.0;
        for (j, idx) in window.enumerate() {
            let (n, dn) = (blend.ders[0][j], blend.ders[1][j]);
            let (pole, weight) = (self.pole(idx), self.weight(idx));
            let p = store.get(pole);
            let w = store.get(weight);
            err += n * w * (q - p);
            grad += n * w * (seed(q_id, wrt) - seed(pole, wrt))
                + n * (q - p) * seed(weight, wrt)
                + dn * w * (q - p) * seed(u_id, wrt);
        }
        (err, grad)
    }
}

/// Spline slope at a knot is parallel to a line.
///
/// Layout: `[pole_1.x, .., pole_n.x, pole_1.y, .., pole_n.y, w_1, .., w_n, l (4)]`.
/// Blending factors at the knot are fixed at construction.
#[derive(Debug, Clone)]
pub struct SlopeAtBSplineKnot {
    base: ConstraintBase,
    factors: Vec<f64>,
    slopes: Vec<f64>,
}

impl SlopeAtBSplineKnot {
    pub fn new(bspline: &BSpline, line: &Line, knot_index: usize) -> ConstraintResult<Self> {
        let knots = bspline.basis.knots();
        let Some(&knot) = knots.get(knot_index) else {
            return Err(ConstraintError::KnotOutOfRange { index: knot_index, knots: knots.len() });
        };
        let (factors, slopes) = bspline.basis.factors(knot);

        let n = bspline.poles.len();
        let mut params = Vec::with_capacity(3 * n + 4);
        params.extend(bspline.poles.iter().map(|p| p.x));
        params.extend(bspline.poles.iter().map(|p| p.y));
        params.extend_from_slice(&bspline.weights);
        line.push_params(&mut params);
        Ok(Self { base: ConstraintBase::new(params), factors, slopes })
    }

    /// Slope direction of the spline at the knot, up to a positive factor.
    fn slope(&self, store: &ParamStore, wrt: Option<ParamId>) -> DualVec2 {
        let n = self.factors.len();
        let mut w_sum = Dual::constant(0.0);
        let mut w_slope = Dual::constant(0.0);
        let mut s_sum = DualVec2::zero();
        let mut s_slope = DualVec2::zero();
        for i in 0..n {
            let w = store.dual(self.base.at(2 * n + i), wrt);
            let pole = DualVec2::from_duals(store.dual(self.base.at(i), wrt), store.dual(self.base.at(n + i), wrt));
            w_sum = w_sum + w * self.factors[i];
            w_slope = w_slope + w * self.slopes[i];
            s_sum = s_sum + pole.scale(w * self.factors[i]);
            s_slope = s_slope + pole.scale(w * self.slopes[i]);
        }
        s_slope.scale(w_sum) - s_sum.scale(w_slope)
    }
}

impl Constraint for SlopeAtBSplineKnot {
    constraint_base!(SlopeAtBSplineKnot);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let offset = 3 * self.factors.len();
        let b = &self.base;
        let dx = store.dual(b.at(offset + 2), wrt) - store.dual(b.at(offset), wrt);
        let dy = store.dual(b.at(offset + 3), wrt) - store.dual(b.at(offset + 1), wrt);
        let line_dir = DualVec2::from_duals(dx, dy).normalized();
        let err = self.slope(store, wrt).normalized().cross(&line_dir);
        (err.v, err.d)
    }
}

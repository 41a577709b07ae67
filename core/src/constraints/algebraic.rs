//! Relations among free scalars.

use super::{constraint_base, Constraint, ConstraintBase, ConstraintError, ConstraintResult};
use crate::params::{seed, ParamId, ParamStore};

/// `p1 = ratio * p2`
#[derive(Debug, Clone)]
pub struct Equal {
    base: ConstraintBase,
    ratio: f64,
}

impl Equal {
    pub fn new(p1: ParamId, p2: ParamId) -> Self {
        Self::with_ratio(p1, p2, 1.0)
    }

    pub fn with_ratio(p1: ParamId, p2: ParamId, ratio: f64) -> Self {
        Self { base: ConstraintBase::new(vec![p1, p2]), ratio }
    }
}

impl Constraint for Equal {
    constraint_base!(Equal);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let (p1, p2) = (self.base.at(0), self.base.at(1));
        let err = store.get(p1) - self.ratio * store.get(p2);
        let grad = seed(p1, wrt) - self.ratio * seed(p2, wrt);
        (err, grad)
    }
}

/// `p2 - p1 = d`
#[derive(Debug, Clone)]
pub struct Difference {
    base: ConstraintBase,
}

impl Difference {
    pub fn new(p1: ParamId, p2: ParamId, d: ParamId) -> Self {
        Self { base: ConstraintBase::new(vec![p1, p2, d]) }
    }
}

impl Constraint for Difference {
    constraint_base!(Difference);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let (p1, p2, d) = (self.base.at(0), self.base.at(1), self.base.at(2));
        let err = store.get(p2) - store.get(p1) - store.get(d);
        let grad = seed(p2, wrt) - seed(p1, wrt) - seed(d, wrt);
        (err, grad)
    }
}

/// `q = sum(w_i * p_i)` with constant weights `w_i`.
///
/// Layout: `[q, p_1, .., p_n]`.
#[derive(Debug, Clone)]
pub struct CenterOfGravity {
    base: ConstraintBase,
    weights: Vec<f64>,
}

impl CenterOfGravity {
    pub fn new(center: ParamId, points: &[ParamId], weights: Vec<f64>) -> ConstraintResult<Self> {
        if points.len() != weights.len() {
            return Err(ConstraintError::CountMismatch {
                what: "center of gravity weights",
                expected: points.len(),
                got: weights.len(),
            });
        }
        let mut params = Vec::with_capacity(points.len() + 1);
        params.push(center);
        params.extend_from_slice(points);
        Ok(Self { base: ConstraintBase::new(params), weights })
    }
}

impl Constraint for CenterOfGravity {
    constraint_base!(CenterOfGravity);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let center = self.base.at(0);
        let mut err = store.get(center);
        let mut grad = seed(center, wrt);
        for (i, w) in self.weights.iter().enumerate() {
            let p = self.base.at(1 + i);
            err -= w * store.get(p);
            grad -= w * seed(p, wrt);
        }
        (err, grad)
    }
}

/// `q * sum(w_i f_i) = sum(p_i w_i f_i)`: `q` is the homogeneous combination of
/// the `p_i` with cell weights `w_i` and constant factors `f_i`.
///
/// Layout: `[q, p_1, .., p_n, w_1, .., w_n]`. Used to keep a B-spline knot
/// point where its poles put it.
#[derive(Debug, Clone)]
pub struct WeightedLinearCombination {
    base: ConstraintBase,
    factors: Vec<f64>,
}

impl WeightedLinearCombination {
    pub fn new(point: ParamId, poles: &[ParamId], weights: &[ParamId], factors: Vec<f64>) -> ConstraintResult<Self> {
        if weights.len() != poles.len() {
            return Err(ConstraintError::CountMismatch {
                what: "pole weights",
                expected: poles.len(),
                got: weights.len(),
            });
        }
        if factors.len() != poles.len() {
            return Err(ConstraintError::CountMismatch {
                what: "blending factors",
                expected: poles.len(),
                got: factors.len(),
            });
        }
        let mut params = Vec::with_capacity(2 * poles.len() + 1);
        params.push(point);
        params.extend_from_slice(poles);
        params.extend_from_slice(weights);
        Ok(Self { base: ConstraintBase::new(params), factors })
    }

    fn pole(&self, i: usize) -> ParamId {
        self.base.at(1 + i)
    }

    fn weight(&self, i: usize) -> ParamId {
        self.base.at(1 + self.factors.len() + i)
    }
}

impl Constraint for WeightedLinearCombination {
    constraint_base!(WeightedLinearCombination);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let q_id = self.base.at(0);
        let q = store.get(q_id);
        let mut err = 0.0;
        let mut grad = 0.0;
        for (i, f) in self.factors.iter().enumerate() {
            let (pole, weight) = (self.pole(i), self.weight(i));
            let p = store.get(pole);
            let w = store.get(weight);
            err += (q - p) * w * f;
            grad += seed(q_id, wrt) * w * f - seed(pole, wrt) * w * f + seed(weight, wrt) * (q - p) * f;
        }
        (err, grad)
    }
}

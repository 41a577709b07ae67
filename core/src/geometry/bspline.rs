//! Rational B-splines: knot basis, blending factors and evaluation.
//!
//! Knots are geometry-layer constants; poles and weights are parameter cells.
//! Periodic splines pad the flattened knot vector on both sides so that every
//! window of `degree + 1` consecutive poles (taken cyclically) has a valid span.

use super::{GeometryError, GeometryResult, ParamLayout, Point};
use crate::dual::{Dual, DualVec2};
use crate::params::{ParamId, ParamStore};

/// Storage indices of a window of `len` poles starting at `start_pole`, wrapping
/// around `pole_count`.
pub fn pole_window(start_pole: usize, len: usize, pole_count: usize) -> impl Iterator<Item = usize> {
    (0..len).map(move |i| (start_pole + i) % pole_count)
}

/// Knot vector, multiplicities and degree of a B-spline.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineBasis {
    knots: Vec<f64>,
    mult: Vec<usize>,
    degree: usize,
    periodic: bool,
    flattened: Vec<f64>,
}

/// Basis functions (and derivatives) of the poles of one span.
#[derive(Debug, Clone, PartialEq)]
pub struct Blend {
    /// First pole of the window, in flattened (unwrapped) numbering.
    pub start_pole: usize,
    /// `ders[k][j]`: k-th derivative of the basis function of window pole `j`.
    pub ders: Vec<Vec<f64>>,
}

impl BSplineBasis {
    pub fn new(knots: Vec<f64>, mult: Vec<usize>, degree: usize, periodic: bool) -> GeometryResult<Self> {
        if knots.len() != mult.len() {
            return Err(GeometryError::KnotMultiplicityMismatch { knots: knots.len(), mults: mult.len() });
        }
        if degree == 0 {
            return Err(GeometryError::ZeroDegree);
        }
        if knots.len() < 2 || knots.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GeometryError::UnorderedKnots);
        }
        let first = mult[0];
        let last = mult[mult.len() - 1];
        if periodic {
            if first != last || first > degree + 1 {
                return Err(GeometryError::BadEndMultiplicity("periodic"));
            }
        } else if first != degree + 1 || last != degree + 1 {
            return Err(GeometryError::BadEndMultiplicity("non-periodic"));
        }

        let mut basis = Self { knots, mult, degree, periodic, flattened: Vec::new() };
        if basis.pole_count() < degree + 1 {
            return Err(GeometryError::CountMismatch {
                what: "poles at least",
                expected: degree + 1,
                got: basis.pole_count(),
            });
        }
        basis.flattened = basis.flatten();
        Ok(basis)
    }

    fn flatten(&self) -> Vec<f64> {
        let mut flat: Vec<f64> = self
            .knots
            .iter()
            .zip(&self.mult)
            .flat_map(|(&k, &m)| std::iter::repeat(k).take(m))
            .collect();
        if self.periodic {
            let period = self.knots[self.knots.len() - 1] - self.knots[0];
            let c = self.degree + 1 - self.mult[0];
            let m_last = self.mult[self.mult.len() - 1];
            let m_first = self.mult[0];
            let front: Vec<f64> = flat[flat.len() - m_last - c..flat.len() - m_last]
                .iter()
                .map(|k| k - period)
                .collect();
            let back: Vec<f64> = flat[m_first..m_first + c].iter().map(|k| k + period).collect();
            flat.extend(back);
            flat.splice(0..0, front);
        }
        flat
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn flattened(&self) -> &[f64] {
        &self.flattened
    }

    pub fn pole_count(&self) -> usize {
        let total: usize = self.mult.iter().sum();
        if self.periodic {
            total - self.mult[self.mult.len() - 1]
        } else {
            total - self.degree - 1
        }
    }

    /// First pole influencing the span that contains `u`.
    pub fn start_pole(&self, u: f64) -> usize {
        let mut start = 0;
        for j in 1..self.knots.len() - 1 {
            if self.knots[j] <= u {
                start += self.mult[j];
            } else {
                break;
            }
        }
        start
    }

    /// Basis functions of the span containing `u` and their first `n` derivatives.
    pub fn blend(&self, u: f64, n: usize) -> Blend {
        let start_pole = self.start_pole(u);
        let ders = ders_basis_funs(start_pole + self.degree, u, self.degree, n, &self.flattened);
        Blend { start_pole, ders }
    }

    /// Blending factor and its parametric derivative per stored pole at `u`.
    pub fn factors(&self, u: f64) -> (Vec<f64>, Vec<f64>) {
        let n = self.pole_count();
        let blend = self.blend(u, 1);
        let mut values = vec![0.0; n];
        let mut slopes = vec![0.0; n];
        for (j, idx) in pole_window(blend.start_pole, self.degree + 1, n).enumerate() {
            values[idx] += blend.ders[0][j];
            slopes[idx] += blend.ders[1][j];
        }
        (values, slopes)
    }
}

/// Nonzero basis functions of span `span` and their derivatives up to `n`
/// (Piegl & Tiller, algorithm A2.3).
fn ders_basis_funs(span: usize, u: f64, p: usize, n: usize, knots: &[f64]) -> Vec<Vec<f64>> {
    let mut ndu = vec![vec![0.0; p + 1]; p + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];
    ndu[0][0] = 1.0;
    for j in 1..=p {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            ndu[j][r] = right[r + 1] + left[j - r];
            let temp = ndu[r][j - 1] / ndu[j][r];
            ndu[r][j] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[j][j] = saved;
    }

    let mut ders = vec![vec![0.0; p + 1]; n + 1];
    for j in 0..=p {
        ders[0][j] = ndu[j][p];
    }
    let top = n.min(p);
    let mut a = vec![vec![0.0; p + 1]; 2];
    for r in 0..=p {
        let (mut s1, mut s2) = (0usize, 1usize);
        a[0][0] = 1.0;
        for k in 1..=top {
            let mut d = 0.0;
            let rk = r as isize - k as isize;
            let pk = p - k;
            if rk >= 0 {
                a[s2][0] = a[s1][0] / ndu[pk + 1][rk as usize];
                d = a[s2][0] * ndu[rk as usize][pk];
            }
            let j1 = if rk >= -1 { 1 } else { (-rk) as usize };
            let j2 = if r as isize - 1 <= pk as isize { k - 1 } else { p - r };
            for j in j1..=j2 {
                let col = (rk + j as isize) as usize;
                a[s2][j] = (a[s1][j] - a[s1][j - 1]) / ndu[pk + 1][col];
                d += a[s2][j] * ndu[col][pk];
            }
            if r <= pk {
                a[s2][k] = -a[s1][k - 1] / ndu[pk + 1][r];
                d += a[s2][k] * ndu[r][pk];
            }
            ders[k][r] = d;
            std::mem::swap(&mut s1, &mut s2);
        }
    }
    let mut factor = p as f64;
    for k in 1..=top {
        for value in ders[k].iter_mut() {
            *value *= factor;
        }
        factor *= (p - k) as f64;
    }
    ders
}

/// Rational B-spline curve over parameter cells.
#[derive(Debug, Clone, PartialEq)]
pub struct BSpline {
    pub poles: Vec<Point>,
    pub weights: Vec<ParamId>,
    pub basis: BSplineBasis,
    pub start: Point,
    pub end: Point,
}

impl BSpline {
    pub fn new(
        poles: Vec<Point>,
        weights: Vec<ParamId>,
        basis: BSplineBasis,
        start: Point,
        end: Point,
    ) -> GeometryResult<Self> {
        let expected = basis.pole_count();
        if poles.len() != expected {
            return Err(GeometryError::CountMismatch { what: "poles", expected, got: poles.len() });
        }
        if weights.len() != expected {
            return Err(GeometryError::CountMismatch { what: "weights", expected, got: weights.len() });
        }
        Ok(Self { poles, weights, basis, start, end })
    }

    /// Weighted sums `W`, `S` and their parametric derivatives `W'`, `S'` at `u`.
    fn sums(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> (Dual, DualVec2, Dual, DualVec2) {
        let p = self.basis.degree;
        let n = self.poles.len();
        let blend = self.basis.blend(u.v, 2);
        let mut w_sum = Dual::constant(0.0);
        let mut s_sum = DualVec2::zero();
        let mut w_slope = Dual::constant(0.0);
        let mut s_slope = DualVec2::zero();
        for (j, idx) in pole_window(blend.start_pole, p + 1, n).enumerate() {
            let basis = Dual::new(blend.ders[0][j], blend.ders[1][j] * u.d);
            let slope = Dual::new(blend.ders[1][j], blend.ders[2][j] * u.d);
            let w = store.dual(self.weights[idx], wrt);
            let pole = store.dual_point(&self.poles[idx], wrt);
            w_sum = w_sum + basis * w;
            s_sum = s_sum + pole.scale(basis * w);
            w_slope = w_slope + slope * w;
            s_slope = s_slope + pole.scale(slope * w);
        }
        (w_sum, s_sum, w_slope, s_slope)
    }

    pub fn value(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        let (w, s, _, _) = self.sums(store, u, wrt);
        s.scale(Dual::constant(1.0) / w)
    }

    pub fn tangent(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        let (w, s, w_slope, s_slope) = self.sums(store, u, wrt);
        let inv = Dual::constant(1.0) / w;
        let value = s.scale(inv);
        (s_slope - value.scale(w_slope)).scale(inv)
    }

    /// Normals are only defined at the end points; elsewhere zero.
    ///
    /// `p` may be the end point itself or any point currently coinciding with it.
    pub fn normal_at(&self, store: &ParamStore, p: &Point, wrt: Option<ParamId>) -> DualVec2 {
        let knots = self.basis.knots();
        let u = if coincident(store, p, &self.start) {
            knots[0]
        } else if coincident(store, p, &self.end) {
            knots[knots.len() - 1]
        } else {
            return DualVec2::zero();
        };
        self.tangent(store, Dual::constant(u), wrt).rot90ccw()
    }
}

/// Distance under which a point counts as sitting on a spline end point.
pub const ENDPOINT_TOLERANCE: f64 = 1e-8;

fn coincident(store: &ParamStore, a: &Point, b: &Point) -> bool {
    if a == b {
        return true;
    }
    let [ax, ay] = store.point(a);
    let [bx, by] = store.point(b);
    (ax - bx).hypot(ay - by) <= ENDPOINT_TOLERANCE
}

impl ParamLayout for BSpline {
    fn push_params(&self, out: &mut Vec<ParamId>) {
        for pole in &self.poles {
            pole.push_params(out);
        }
        out.extend(&self.weights);
        self.start.push_params(out);
        self.end.push_params(out);
    }

    fn rebuild(&mut self, params: &[ParamId], cursor: &mut usize) {
        for pole in self.poles.iter_mut() {
            pole.rebuild(params, cursor);
        }
        for weight in self.weights.iter_mut() {
            *weight = super::take(params, cursor);
        }
        self.start.rebuild(params, cursor);
        self.end.rebuild(params, cursor);
    }
}

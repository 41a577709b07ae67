//! Fixed-arity relations over points and lines.

use super::{constraint_base, limit_angle_step, Constraint, ConstraintBase};
use crate::geometry::{Line, ParamLayout, Point};
use crate::params::{seed, ParamId, ParamStore, StepDirection};

fn line_params(lines: &[&Line]) -> Vec<ParamId> {
    let mut params = Vec::with_capacity(4 * lines.len());
    for line in lines {
        line.push_params(&mut params);
    }
    params
}

/// Signed distance of `(x0, y0)` to the line through `(x1, y1)`-`(x2, y2)` and its
/// partials with respect to the six coordinates.
fn signed_distance(x0: f64, y0: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> (f64, [f64; 6]) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let d2 = dx * dx + dy * dy;
    let d = d2.sqrt();
    if d == 0.0 {
        return (0.0, [0.0; 6]);
    }
    let area = -x0 * dy + y0 * dx + x1 * y2 - x2 * y1;
    let partials = [
        (y1 - y2) / d,
        (x2 - x1) / d,
        ((y2 - y0) * d + (dx / d) * area) / d2,
        ((x0 - x2) * d + (dy / d) * area) / d2,
        ((y0 - y1) * d - (dx / d) * area) / d2,
        ((x1 - x0) * d - (dy / d) * area) / d2,
    ];
    (area / d, partials)
}

fn dot_seeds(partials: &[f64], ids: &[ParamId], wrt: Option<ParamId>) -> f64 {
    partials.iter().zip(ids).map(|(p, &id)| p * seed(id, wrt)).sum()
}

/// Point lies on the (infinite) line.
///
/// Layout: `[p.x, p.y, l.p1.x, l.p1.y, l.p2.x, l.p2.y]`.
#[derive(Debug, Clone)]
pub struct PointOnLine {
    base: ConstraintBase,
}

impl PointOnLine {
    pub fn new(p: &Point, line: &Line) -> Self {
        Self::through(p, &line.p1, &line.p2)
    }

    pub fn through(p: &Point, lp1: &Point, lp2: &Point) -> Self {
        let params = vec![p.x, p.y, lp1.x, lp1.y, lp2.x, lp2.y];
        Self { base: ConstraintBase::new(params) }
    }
}

impl Constraint for PointOnLine {
    constraint_base!(PointOnLine);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let ids = self.base.params();
        let v: Vec<f64> = ids.iter().map(|&id| store.get(id)).collect();
        let (err, partials) = signed_distance(v[0], v[1], v[2], v[3], v[4], v[5]);
        (err, dot_seeds(&partials, ids, wrt))
    }
}

/// Point lies on the perpendicular bisector of a segment.
///
/// Layout: `[p.x, p.y, l.p1.x, l.p1.y, l.p2.x, l.p2.y]`.
#[derive(Debug, Clone)]
pub struct PointOnPerpBisector {
    base: ConstraintBase,
}

impl PointOnPerpBisector {
    pub fn new(p: &Point, line: &Line) -> Self {
        Self::through(p, &line.p1, &line.p2)
    }

    pub fn through(p: &Point, lp1: &Point, lp2: &Point) -> Self {
        let params = vec![p.x, p.y, lp1.x, lp1.y, lp2.x, lp2.y];
        Self { base: ConstraintBase::new(params) }
    }
}

impl Constraint for PointOnPerpBisector {
    constraint_base!(PointOnPerpBisector);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let b = &self.base;
        let p0 = store.dual_point(&Point::new(b.at(0), b.at(1)), wrt);
        let p1 = store.dual_point(&Point::new(b.at(2), b.at(3)), wrt);
        let p2 = store.dual_point(&Point::new(b.at(4), b.at(5)), wrt);
        let dir = (p2 - p1).normalized();
        let proj = (p0 - p1).dot(&dir) + (p0 - p2).dot(&dir);
        (proj.v, proj.d)
    }
}

/// Cross product of the two line directions vanishes.
///
/// Layout: `[l1 (4), l2 (4)]`.
#[derive(Debug, Clone)]
pub struct Parallel {
    base: ConstraintBase,
}

impl Parallel {
    pub fn new(l1: &Line, l2: &Line) -> Self {
        Self { base: ConstraintBase::new(line_params(&[l1, l2])) }
    }
}

/// Direction components `(dx1, dy1, dx2, dy2)`, each taken as `p1 - p2`.
fn directions(base: &ConstraintBase, store: &ParamStore) -> [f64; 4] {
    let v = |i| store.get(base.at(i));
    [v(0) - v(2), v(1) - v(3), v(4) - v(6), v(5) - v(7)]
}

fn inverse_lengths(base: &ConstraintBase, store: &ParamStore) -> f64 {
    let [dx1, dy1, dx2, dy2] = directions(base, store);
    1.0 / ((dx1 * dx1 + dy1 * dy1) * (dx2 * dx2 + dy2 * dy2)).sqrt()
}

impl Constraint for Parallel {
    constraint_base!(Parallel);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let [dx1, dy1, dx2, dy2] = directions(&self.base, store);
        let err = dx1 * dy2 - dy1 * dx2;
        let partials = [dy2, -dx2, -dy2, dx2, -dy1, dx1, dy1, -dx1];
        (err, dot_seeds(&partials, self.base.params(), wrt))
    }

    fn normalization(&self, store: &ParamStore) -> f64 {
        inverse_lengths(&self.base, store)
    }
}

/// Dot product of the two line directions vanishes.
///
/// Layout: `[l1 (4), l2 (4)]`.
#[derive(Debug, Clone)]
pub struct Perpendicular {
    base: ConstraintBase,
}

impl Perpendicular {
    pub fn new(l1: &Line, l2: &Line) -> Self {
        Self::through(&l1.p1, &l1.p2, &l2.p1, &l2.p2)
    }

    pub fn through(l1p1: &Point, l1p2: &Point, l2p1: &Point, l2p2: &Point) -> Self {
        let params = vec![l1p1.x, l1p1.y, l1p2.x, l1p2.y, l2p1.x, l2p1.y, l2p2.x, l2p2.y];
        Self { base: ConstraintBase::new(params) }
    }
}

impl Constraint for Perpendicular {
    constraint_base!(Perpendicular);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let [dx1, dy1, dx2, dy2] = directions(&self.base, store);
        let err = dx1 * dx2 + dy1 * dy2;
        let partials = [dx2, dy2, -dx2, -dy2, dx1, dy1, -dx1, -dy1];
        (err, dot_seeds(&partials, self.base.params(), wrt))
    }

    fn normalization(&self, store: &ParamStore) -> f64 {
        inverse_lengths(&self.base, store)
    }
}

/// Direction of `p1 -> p2` makes angle `angle + da` with the x axis.
///
/// Layout: `[p1.x, p1.y, p2.x, p2.y, angle]`.
#[derive(Debug, Clone)]
pub struct AnglePointPoint {
    base: ConstraintBase,
    da: f64,
}

impl AnglePointPoint {
    pub fn new(p1: &Point, p2: &Point, angle: ParamId) -> Self {
        Self::with_offset(p1, p2, angle, 0.0)
    }

    pub fn with_offset(p1: &Point, p2: &Point, angle: ParamId, da: f64) -> Self {
        Self { base: ConstraintBase::new(vec![p1.x, p1.y, p2.x, p2.y, angle]), da }
    }
}

impl Constraint for AnglePointPoint {
    constraint_base!(AnglePointPoint);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let v = |i| store.get(self.base.at(i));
        let dx = v(2) - v(0);
        let dy = v(3) - v(1);
        let a = v(4) + self.da;
        let (sa, ca) = a.sin_cos();
        let x = dx * ca + dy * sa;
        let y = -dx * sa + dy * ca;
        let err = y.atan2(x);

        let r2 = dx * dx + dy * dy;
        let partials = if r2 > 0.0 {
            [dy / r2, -dx / r2, -dy / r2, dx / r2, -1.0]
        } else {
            [0.0, 0.0, 0.0, 0.0, -1.0]
        };
        (err, dot_seeds(&partials, self.base.params(), wrt))
    }

    fn max_step(&self, _store: &ParamStore, dir: &StepDirection, limit: f64) -> f64 {
        limit_angle_step(dir, self.base.at(4), limit)
    }
}

/// Angle from the direction of `l1` to that of `l2` equals `angle`.
///
/// Layout: `[l1 (4), l2 (4), angle]`.
#[derive(Debug, Clone)]
pub struct AngleLineLine {
    base: ConstraintBase,
}

impl AngleLineLine {
    pub fn new(l1: &Line, l2: &Line, angle: ParamId) -> Self {
        let mut params = line_params(&[l1, l2]);
        params.push(angle);
        Self { base: ConstraintBase::new(params) }
    }
}

impl Constraint for AngleLineLine {
    constraint_base!(AngleLineLine);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let v = |i| store.get(self.base.at(i));
        let dx1 = v(2) - v(0);
        let dy1 = v(3) - v(1);
        let dx2 = v(6) - v(4);
        let dy2 = v(7) - v(5);
        let a = dy1.atan2(dx1) + v(8);
        let (sa, ca) = a.sin_cos();
        let x2 = dx2 * ca + dy2 * sa;
        let y2 = -dx2 * sa + dy2 * ca;
        let err = y2.atan2(x2);

        let r1 = dx1 * dx1 + dy1 * dy1;
        let r2 = dx2 * dx2 + dy2 * dy2;
        let (a1, b1) = if r1 > 0.0 { (dy1 / r1, dx1 / r1) } else { (0.0, 0.0) };
        let (a2, b2) = if r2 > 0.0 { (dy2 / r2, dx2 / r2) } else { (0.0, 0.0) };
        let partials = [-a1, b1, a1, -b1, a2, -b2, -a2, b2, -1.0];
        (err, dot_seeds(&partials, self.base.params(), wrt))
    }

    fn max_step(&self, _store: &ParamStore, dir: &StepDirection, limit: f64) -> f64 {
        limit_angle_step(dir, self.base.at(8), limit)
    }
}

/// Midpoint of `l1` lies on `l2`.
///
/// Layout: `[l1 (4), l2 (4)]`.
#[derive(Debug, Clone)]
pub struct MidpointOnLine {
    base: ConstraintBase,
}

impl MidpointOnLine {
    pub fn new(l1: &Line, l2: &Line) -> Self {
        Self { base: ConstraintBase::new(line_params(&[l1, l2])) }
    }
}

impl Constraint for MidpointOnLine {
    constraint_base!(MidpointOnLine);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let v = |i| store.get(self.base.at(i));
        let x0 = (v(0) + v(2)) / 2.0;
        let y0 = (v(1) + v(3)) / 2.0;
        let (err, p) = signed_distance(x0, y0, v(4), v(5), v(6), v(7));
        let partials = [p[0] / 2.0, p[1] / 2.0, p[0] / 2.0, p[1] / 2.0, p[2], p[3], p[4], p[5]];
        (err, dot_seeds(&partials, self.base.params(), wrt))
    }
}

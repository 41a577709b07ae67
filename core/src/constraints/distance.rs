//! Distance-like relations: point/line/circle gaps, equal lengths, arc length.

use super::{assert_synced, constraint_base, limit_non_negative, step_of, Constraint, ConstraintBase};
use crate::dual::Dual;
use crate::geometry::{Arc, Circle, Line, ParamLayout, Point};
use crate::params::{seed, ParamId, ParamStore, StepDirection};

/// `|p1 p2| = d`
///
/// Layout: `[p1.x, p1.y, p2.x, p2.y, d]`.
#[derive(Debug, Clone)]
pub struct DistancePointPoint {
    base: ConstraintBase,
}

impl DistancePointPoint {
    pub fn new(p1: &Point, p2: &Point, d: ParamId) -> Self {
        Self { base: ConstraintBase::new(vec![p1.x, p1.y, p2.x, p2.y, d]) }
    }
}

impl Constraint for DistancePointPoint {
    constraint_base!(DistancePointPoint);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let ids = self.base.params();
        let v = |i| store.get(ids[i]);
        let dx = v(0) - v(2);
        let dy = v(1) - v(3);
        let len = (dx * dx + dy * dy).sqrt();
        let err = len - v(4);

        let mut grad = -seed(ids[4], wrt);
        if len > 0.0 {
            let (ux, uy) = (dx / len, dy / len);
            grad += ux * seed(ids[0], wrt) + uy * seed(ids[1], wrt) - ux * seed(ids[2], wrt) - uy * seed(ids[3], wrt);
        }
        (err, grad)
    }

    fn max_step(&self, store: &ParamStore, dir: &StepDirection, limit: f64) -> f64 {
        let ids = self.base.params();
        let mut limit = limit_non_negative(store, dir, ids[4], limit);

        // the represented length may not change by more than it currently is
        let delta = |i: usize| step_of(dir, ids[i]).unwrap_or(0.0);
        let ddx = delta(0) - delta(2);
        let ddy = delta(1) - delta(3);
        let dd = (ddx * ddx + ddy * ddy).sqrt();
        let target = store.get(ids[4]);
        if dd > target {
            let dx = store.get(ids[0]) - store.get(ids[2]);
            let dy = store.get(ids[1]) - store.get(ids[3]);
            let len = (dx * dx + dy * dy).sqrt();
            if dd > len {
                limit = limit.min(len.max(target) / dd);
            }
        }
        limit
    }
}

/// Unsigned distance of a point to a line equals `d`.
///
/// Layout: `[p.x, p.y, l.p1.x, l.p1.y, l.p2.x, l.p2.y, d]`.
#[derive(Debug, Clone)]
pub struct DistancePointLine {
    base: ConstraintBase,
}

impl DistancePointLine {
    pub fn new(p: &Point, line: &Line, d: ParamId) -> Self {
        let params = vec![p.x, p.y, line.p1.x, line.p1.y, line.p2.x, line.p2.y, d];
        Self { base: ConstraintBase::new(params) }
    }

    fn coords(&self, store: &ParamStore) -> [f64; 6] {
        let mut out = [0.0; 6];
        for (i, value) in out.iter_mut().enumerate() {
            *value = store.get(self.base.at(i));
        }
        out
    }
}

impl Constraint for DistancePointLine {
    constraint_base!(DistancePointLine);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let [x0, y0, x1, y1, x2, y2] = self.coords(store);
        let d = store.get(self.base.at(6));
        let dx = x2 - x1;
        let dy = y2 - y1;
        let len2 = dx * dx + dy * dy;
        let len = len2.sqrt();
        let area = -x0 * dy + y0 * dx + x1 * y2 - x2 * y1;
        if len == 0.0 {
            return (-d, -seed(self.base.at(6), wrt));
        }
        let err = area.abs() / len - d;

        let partials = [
            (y1 - y2) / len,
            (x2 - x1) / len,
            ((y2 - y0) * len + (dx / len) * area) / len2,
            ((x0 - x2) * len + (dy / len) * area) / len2,
            ((y0 - y1) * len - (dx / len) * area) / len2,
            ((x1 - x0) * len - (dy / len) * area) / len2,
        ];
        let sign = if area < 0.0 { -1.0 } else { 1.0 };
        let mut grad = -seed(self.base.at(6), wrt);
        for (i, p) in partials.iter().enumerate() {
            grad += sign * p * seed(self.base.at(i), wrt);
        }
        (err, grad)
    }

    fn max_step(&self, store: &ParamStore, dir: &StepDirection, limit: f64) -> f64 {
        let mut limit = limit_non_negative(store, dir, self.base.at(6), limit);

        let [x0, y0, x1, y1, x2, y2] = self.coords(store);
        let s = |i: usize| step_of(dir, self.base.at(i)).unwrap_or(0.0);
        let darea = ((y1 - y2) * s(0)
            + (x2 - x1) * s(1)
            + (y2 - y0) * s(2)
            + (x0 - x2) * s(3)
            + (y0 - y1) * s(4)
            + (x1 - x0) * s(5))
            .abs();
        if darea > 0.0 {
            let dx = x2 - x1;
            let dy = y2 - y1;
            let len = (dx * dx + dy * dy).sqrt();
            let area = (-x0 * dy + y0 * dx + x1 * y2 - x2 * y1).abs();
            let mut area_limit = 0.3 * store.get(self.base.at(6)) * len;
            if darea > area_limit {
                area_limit = area_limit.max(0.3 * area);
                if darea > area_limit {
                    limit = limit.min(area_limit / darea);
                }
            }
        }
        limit
    }
}

/// Gap between two circle outlines equals `d`.
///
/// Layout: `[d, c1.center (2), c1.rad, c2.center (2), c2.rad]`.
#[derive(Debug, Clone)]
pub struct DistanceCircleCircle {
    base: ConstraintBase,
    c1: Circle,
    c2: Circle,
}

impl DistanceCircleCircle {
    pub fn new(c1: &Circle, c2: &Circle, d: ParamId) -> Self {
        let mut params = vec![d];
        c1.push_params(&mut params);
        c2.push_params(&mut params);
        Self { base: ConstraintBase::new(params), c1: *c1, c2: *c2 }
    }
}

impl Constraint for DistanceCircleCircle {
    constraint_base!(DistanceCircleCircle);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let d = store.dual(self.base.at(0), wrt);
        let r1 = store.dual(self.c1.rad, wrt);
        let r2 = store.dual(self.c2.rad, wrt);
        let len = (store.dual_point(&self.c2.center, wrt) - store.dual_point(&self.c1.center, wrt)).length();

        let err = if len.v >= r1.v && len.v >= r2.v {
            len - (r1 + r2 + d)
        } else {
            let (big, small) = if r1.v >= r2.v { (r1, r2) } else { (r2, r1) };
            big - (small + len + d)
        };
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 1;
        self.c1.rebuild(params, &mut cursor);
        self.c2.rebuild(params, &mut cursor);
    }
}

/// Gap between a circle outline and a line equals `d`.
///
/// Layout: `[d, c.center (2), c.rad, l (4)]`.
#[derive(Debug, Clone)]
pub struct DistanceCircleLine {
    base: ConstraintBase,
    circle: Circle,
    line: Line,
}

impl DistanceCircleLine {
    pub fn new(circle: &Circle, line: &Line, d: ParamId) -> Self {
        let mut params = vec![d];
        circle.push_params(&mut params);
        line.push_params(&mut params);
        Self { base: ConstraintBase::new(params), circle: *circle, line: *line }
    }
}

impl Constraint for DistanceCircleLine {
    constraint_base!(DistanceCircleLine);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let d = store.dual(self.base.at(0), wrt);
        let r = store.dual(self.circle.rad, wrt);
        let center = store.dual_point(&self.circle.center, wrt);
        let p1 = store.dual_point(&self.line.p1, wrt);
        let dir = self.line.direction(store, wrt);
        let len = dir.length();
        let h = if len.v > 0.0 { (dir.cross(&(center - p1)) / len).abs() } else { (center - p1).length() };

        let err = if h.v < r.v { r - h - d } else { h - r - d };
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 1;
        self.circle.rebuild(params, &mut cursor);
        self.line.rebuild(params, &mut cursor);
    }
}

/// Gap between a point and a circle outline equals `d`.
///
/// Layout: `[d, p.x, p.y, c.center (2), c.rad]`.
#[derive(Debug, Clone)]
pub struct DistancePointCircle {
    base: ConstraintBase,
    point: Point,
    circle: Circle,
}

impl DistancePointCircle {
    pub fn new(point: &Point, circle: &Circle, d: ParamId) -> Self {
        let mut params = vec![d];
        point.push_params(&mut params);
        circle.push_params(&mut params);
        Self { base: ConstraintBase::new(params), point: *point, circle: *circle }
    }
}

impl Constraint for DistancePointCircle {
    constraint_base!(DistancePointCircle);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let d = store.dual(self.base.at(0), wrt);
        let r = store.dual(self.circle.rad, wrt);
        let len = (store.dual_point(&self.point, wrt) - store.dual_point(&self.circle.center, wrt)).length();

        let err = if len.v < r.v { r - len - d } else { len - r - d };
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 1;
        self.point.rebuild(params, &mut cursor);
        self.circle.rebuild(params, &mut cursor);
    }
}

/// `|l1| = |l2|`
///
/// Layout: `[l1 (4), l2 (4)]`.
#[derive(Debug, Clone)]
pub struct EqualLineLength {
    base: ConstraintBase,
    l1: Line,
    l2: Line,
}

impl EqualLineLength {
    pub fn new(l1: &Line, l2: &Line) -> Self {
        let mut params = Vec::with_capacity(8);
        l1.push_params(&mut params);
        l2.push_params(&mut params);
        Self { base: ConstraintBase::new(params), l1: *l1, l2: *l2 }
    }
}

impl Constraint for EqualLineLength {
    constraint_base!(EqualLineLength);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let err = self.l2.direction(store, wrt).length() - self.l1.direction(store, wrt).length();
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 0;
        self.l1.rebuild(params, &mut cursor);
        self.l2.rebuild(params, &mut cursor);
    }
}

/// Length of a circular arc equals `d`.
///
/// Layout: `[d, arc (9)]`.
#[derive(Debug, Clone)]
pub struct ArcLength {
    base: ConstraintBase,
    arc: Arc,
}

impl ArcLength {
    pub fn new(arc: &Arc, d: ParamId) -> Self {
        let mut params = vec![d];
        arc.push_params(&mut params);
        Self { base: ConstraintBase::new(params), arc: arc.clone() }
    }
}

impl Constraint for ArcLength {
    constraint_base!(ArcLength);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let d = store.dual(self.base.at(0), wrt);
        let r = store.dual(self.arc.curve.rad, wrt);
        let sweep: Dual = store.dual(self.arc.end_angle, wrt) - store.dual(self.arc.start_angle, wrt);
        let err = r * sweep - d;
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 1;
        self.arc.rebuild(params, &mut cursor);
    }
}

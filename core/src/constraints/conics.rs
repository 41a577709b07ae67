//! Circle tangency and relations on ellipses, hyperbolas and parabolas.

use super::{
    assert_synced, constraint_base, Constraint, ConstraintBase, ConstraintError, ConstraintKind, ConstraintResult,
};
use crate::dual::{Dual, DualVec2};
use crate::geometry::{Circle, Curve, Ellipse, Hyperbola, Line, ParamLayout, Parabola, Point};
use crate::params::{seed, ParamId, ParamStore};
use serde::{Deserialize, Serialize};

/// Ellipse whose five handles start at `offset` in `base`.
fn ellipse_at(base: &ConstraintBase, offset: usize) -> Ellipse {
    Ellipse::new(
        Point::new(base.at(offset), base.at(offset + 1)),
        Point::new(base.at(offset + 2), base.at(offset + 3)),
        base.at(offset + 4),
    )
}

/// Two circles touch, externally or (with `internal`) one inside the other.
///
/// Layout: `[c1.x, c1.y, c2.x, c2.y, r1, r2]`.
#[derive(Debug, Clone)]
pub struct TangentCircles {
    base: ConstraintBase,
    internal: bool,
}

impl TangentCircles {
    pub fn new(c1: &Circle, c2: &Circle, internal: bool) -> Self {
        let params = vec![c1.center.x, c1.center.y, c2.center.x, c2.center.y, c1.rad, c2.rad];
        Self { base: ConstraintBase::new(params), internal }
    }

    pub fn internal(&self) -> bool {
        self.internal
    }
}

impl Constraint for TangentCircles {
    constraint_base!(TangentCircles);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let ids = self.base.params();
        let v = |i: usize| store.get(ids[i]);
        let dx = v(0) - v(2);
        let dy = v(1) - v(3);
        let len = (dx * dx + dy * dy).sqrt();
        let (r1, r2) = (v(4), v(5));

        let (err, g1, g2) = if self.internal {
            let sign = if r1 >= r2 { 1.0 } else { -1.0 };
            (len - (r1 - r2).abs(), -sign, sign)
        } else {
            (len - (r1 + r2), -1.0, -1.0)
        };

        let mut grad = g1 * seed(ids[4], wrt) + g2 * seed(ids[5], wrt);
        if len > 0.0 {
            let (ux, uy) = (dx / len, dy / len);
            grad += ux * seed(ids[0], wrt) + uy * seed(ids[1], wrt) - ux * seed(ids[2], wrt) - uy * seed(ids[3], wrt);
        }
        (err, grad)
    }
}

/// Sum of focal distances equals the major axis.
///
/// Layout: `[p.x, p.y, center (2), focus1 (2), radmin]`.
#[derive(Debug, Clone)]
pub struct PointOnEllipse {
    base: ConstraintBase,
}

impl PointOnEllipse {
    pub fn new(p: &Point, ellipse: &Ellipse) -> Self {
        let mut params = vec![p.x, p.y];
        ellipse.push_params(&mut params);
        Self { base: ConstraintBase::new(params) }
    }
}

impl Constraint for PointOnEllipse {
    constraint_base!(PointOnEllipse);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let p = store.dual_point(&Point::new(self.base.at(0), self.base.at(1)), wrt);
        let f = ellipse_at(&self.base, 2).frame(store, wrt);
        let err = (p - f.focus1).length() + (p - f.focus2()).length() - f.major * 2.0;
        (err.v, err.d)
    }
}

/// Difference of focal distances equals the major axis (branch around `focus1`).
///
/// Layout: `[p.x, p.y, center (2), focus1 (2), radmin]`.
#[derive(Debug, Clone)]
pub struct PointOnHyperbola {
    base: ConstraintBase,
}

impl PointOnHyperbola {
    pub fn new(p: &Point, hyperbola: &Hyperbola) -> Self {
        let mut params = vec![p.x, p.y];
        hyperbola.push_params(&mut params);
        Self { base: ConstraintBase::new(params) }
    }
}

impl Constraint for PointOnHyperbola {
    constraint_base!(PointOnHyperbola);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let b = &self.base;
        let p = store.dual_point(&Point::new(b.at(0), b.at(1)), wrt);
        let hyperbola = Hyperbola::new(Point::new(b.at(2), b.at(3)), Point::new(b.at(4), b.at(5)), b.at(6));
        let f = hyperbola.frame(store, wrt);
        let err = (p - f.focus2()).length() - (p - f.focus1).length() - f.major * 2.0;
        (err.v, err.d)
    }
}

/// Focus distance equals directrix distance.
///
/// Layout: `[p.x, p.y, vertex (2), focus1 (2)]`.
#[derive(Debug, Clone)]
pub struct PointOnParabola {
    base: ConstraintBase,
    point: Point,
    parabola: Parabola,
}

impl PointOnParabola {
    pub fn new(p: &Point, parabola: &Parabola) -> Self {
        let mut params = vec![p.x, p.y];
        parabola.push_params(&mut params);
        Self { base: ConstraintBase::new(params), point: *p, parabola: *parabola }
    }
}

impl Constraint for PointOnParabola {
    constraint_base!(PointOnParabola);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let p = store.dual_point(&self.point, wrt);
        let vertex = store.dual_point(&self.parabola.vertex, wrt);
        let focus = store.dual_point(&self.parabola.focus1, wrt);
        let axis = (focus - vertex).normalized();
        let directrix_point = vertex * 2.0 - focus;
        let err = (p - focus).length() - (p - directrix_point).dot(&axis);
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 0;
        self.point.rebuild(params, &mut cursor);
        self.parabola.rebuild(params, &mut cursor);
    }
}

/// Line touches an ellipse: the first focus mirrored in the line lies at `2a`
/// from the second focus.
///
/// Layout: `[l (4), center (2), focus1 (2), radmin]`.
#[derive(Debug, Clone)]
pub struct TangentEllipseLine {
    base: ConstraintBase,
    line: Line,
    ellipse: Ellipse,
}

impl TangentEllipseLine {
    pub fn new(line: &Line, ellipse: &Ellipse) -> Self {
        let mut params = Vec::with_capacity(9);
        line.push_params(&mut params);
        ellipse.push_params(&mut params);
        Self { base: ConstraintBase::new(params), line: *line, ellipse: *ellipse }
    }
}

impl Constraint for TangentEllipseLine {
    constraint_base!(TangentEllipseLine);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let p1 = store.dual_point(&self.line.p1, wrt);
        let normal = self.line.direction(store, wrt).rot90ccw().normalized();
        let f = self.ellipse.frame(store, wrt);
        let dist = (f.focus1 - p1).dot(&normal);
        let mirrored = f.focus1 - normal.scale(dist * 2.0);
        let err = (f.focus2() - mirrored).length() - f.major * 2.0;
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 0;
        self.line.rebuild(params, &mut cursor);
        self.ellipse.rebuild(params, &mut cursor);
    }
}

/// Which characteristic point (and which coordinate of it) an ellipse alignment pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EllipseAlignment {
    PositiveMajorX,
    PositiveMajorY,
    NegativeMajorX,
    NegativeMajorY,
    PositiveMinorX,
    PositiveMinorY,
    NegativeMinorX,
    NegativeMinorY,
    Focus2X,
    Focus2Y,
}

/// Which characteristic point (and which coordinate of it) a hyperbola alignment pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HyperbolaAlignment {
    PositiveMajorX,
    PositiveMajorY,
    NegativeMajorX,
    NegativeMajorY,
    PositiveMinorX,
    PositiveMinorY,
    NegativeMinorX,
    NegativeMinorY,
}

fn coordinate(v: DualVec2, x_axis: bool) -> Dual {
    if x_axis {
        v.x()
    } else {
        v.y()
    }
}

/// Pins one coordinate of a point to a vertex or the second focus of an ellipse.
///
/// Layout: `[center (2), focus1 (2), radmin, p.x, p.y]`.
#[derive(Debug, Clone)]
pub struct InternalAlignmentPointEllipse {
    base: ConstraintBase,
    ellipse: Ellipse,
    point: Point,
    alignment: EllipseAlignment,
}

impl InternalAlignmentPointEllipse {
    pub fn new(ellipse: &Ellipse, point: &Point, alignment: EllipseAlignment) -> Self {
        let mut params = Vec::with_capacity(7);
        ellipse.push_params(&mut params);
        point.push_params(&mut params);
        Self { base: ConstraintBase::internal(params), ellipse: *ellipse, point: *point, alignment }
    }

    pub fn alignment(&self) -> EllipseAlignment {
        self.alignment
    }
}

impl Constraint for InternalAlignmentPointEllipse {
    constraint_base!(InternalAlignmentPointEllipse);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        use EllipseAlignment::*;
        assert_synced(&self.base);
        let p = store.dual_point(&self.point, wrt);
        let f = self.ellipse.frame(store, wrt);
        let major = f.major_dir.scale(f.major);
        let minor = f.minor_dir.scale(f.minor);
        let target = match self.alignment {
            PositiveMajorX | PositiveMajorY => f.center + major,
            NegativeMajorX | NegativeMajorY => f.center - major,
            PositiveMinorX | PositiveMinorY => f.center + minor,
            NegativeMinorX | NegativeMinorY => f.center - minor,
            Focus2X | Focus2Y => f.focus2(),
        };
        let x_axis = matches!(
            self.alignment,
            PositiveMajorX | NegativeMajorX | PositiveMinorX | NegativeMinorX | Focus2X
        );
        let err = coordinate(p, x_axis) - coordinate(target, x_axis);
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 0;
        self.ellipse.rebuild(params, &mut cursor);
        self.point.rebuild(params, &mut cursor);
    }
}

/// Pins one coordinate of a point to a vertex (or the end of the minor half-axis
/// drawn at the major vertex) of a hyperbola.
///
/// Layout: `[center (2), focus1 (2), radmin, p.x, p.y]`.
#[derive(Debug, Clone)]
pub struct InternalAlignmentPointHyperbola {
    base: ConstraintBase,
    hyperbola: Hyperbola,
    point: Point,
    alignment: HyperbolaAlignment,
}

impl InternalAlignmentPointHyperbola {
    pub fn new(hyperbola: &Hyperbola, point: &Point, alignment: HyperbolaAlignment) -> Self {
        let mut params = Vec::with_capacity(7);
        hyperbola.push_params(&mut params);
        point.push_params(&mut params);
        Self { base: ConstraintBase::internal(params), hyperbola: *hyperbola, point: *point, alignment }
    }

    pub fn alignment(&self) -> HyperbolaAlignment {
        self.alignment
    }
}

impl Constraint for InternalAlignmentPointHyperbola {
    constraint_base!(InternalAlignmentPointHyperbola);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        use HyperbolaAlignment::*;
        assert_synced(&self.base);
        let p = store.dual_point(&self.point, wrt);
        let f = self.hyperbola.frame(store, wrt);
        let major = f.major_dir.scale(f.major);
        let minor = f.minor_dir.scale(f.minor);
        let target = match self.alignment {
            PositiveMajorX | PositiveMajorY => f.center + major,
            NegativeMajorX | NegativeMajorY => f.center - major,
            PositiveMinorX | PositiveMinorY => f.center + major + minor,
            NegativeMinorX | NegativeMinorY => f.center + major - minor,
        };
        let x_axis = matches!(self.alignment, PositiveMajorX | NegativeMajorX | PositiveMinorX | NegativeMinorX);
        let err = coordinate(p, x_axis) - coordinate(target, x_axis);
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        let params = self.base.params();
        let mut cursor = 0;
        self.hyperbola.rebuild(params, &mut cursor);
        self.point.rebuild(params, &mut cursor);
    }
}

fn curve_pair_params(c1: &Curve, c2: &Curve) -> Vec<ParamId> {
    let mut params = Vec::new();
    c1.push_params(&mut params);
    c2.push_params(&mut params);
    params
}

fn rebuild_pair(params: &[ParamId], c1: &mut Curve, c2: &mut Curve) {
    let mut cursor = 0;
    c1.rebuild(params, &mut cursor);
    c2.rebuild(params, &mut cursor);
}

/// Two ellipses/hyperbolas (or arcs of them) share the major radius.
///
/// Layout: `[curve1, curve2]`.
#[derive(Debug, Clone)]
pub struct EqualMajorAxesConic {
    base: ConstraintBase,
    c1: Curve,
    c2: Curve,
}

impl EqualMajorAxesConic {
    pub fn new(c1: &Curve, c2: &Curve) -> ConstraintResult<Self> {
        for c in [c1, c2] {
            if !matches!(
                c,
                Curve::Ellipse(_) | Curve::ArcOfEllipse(_) | Curve::Hyperbola(_) | Curve::ArcOfHyperbola(_)
            ) {
                return Err(ConstraintError::UnsupportedCurve {
                    constraint: ConstraintKind::EqualMajorAxesConic,
                    curve: c.name(),
                });
            }
        }
        let params = curve_pair_params(c1, c2);
        Ok(Self { base: ConstraintBase::new(params), c1: c1.clone(), c2: c2.clone() })
    }
}

impl Constraint for EqualMajorAxesConic {
    constraint_base!(EqualMajorAxesConic);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let a1 = self.c1.major_radius(store, wrt).unwrap_or_default();
        let a2 = self.c2.major_radius(store, wrt).unwrap_or_default();
        let err = a1 - a2;
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        rebuild_pair(self.base.params(), &mut self.c1, &mut self.c2);
    }
}

/// Two parabolas (or arcs of them) share the focal length.
///
/// Layout: `[curve1, curve2]`.
#[derive(Debug, Clone)]
pub struct EqualFocalDistance {
    base: ConstraintBase,
    c1: Curve,
    c2: Curve,
}

impl EqualFocalDistance {
    pub fn new(c1: &Curve, c2: &Curve) -> ConstraintResult<Self> {
        for c in [c1, c2] {
            if !matches!(c, Curve::Parabola(_) | Curve::ArcOfParabola(_)) {
                return Err(ConstraintError::UnsupportedCurve {
                    constraint: ConstraintKind::EqualFocalDistance,
                    curve: c.name(),
                });
            }
        }
        let params = curve_pair_params(c1, c2);
        Ok(Self { base: ConstraintBase::new(params), c1: c1.clone(), c2: c2.clone() })
    }
}

impl Constraint for EqualFocalDistance {
    constraint_base!(EqualFocalDistance);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        assert_synced(&self.base);
        let f1 = self.c1.focal_length(store, wrt).unwrap_or_default();
        let f2 = self.c2.focal_length(store, wrt).unwrap_or_default();
        let err = f1 - f2;
        (err.v, err.d)
    }

    fn rebuild_geometry(&mut self) {
        rebuild_pair(self.base.params(), &mut self.c1, &mut self.c2);
    }
}

/// Parametric (eccentric) angle of a point on an ellipse equals `t`.
///
/// Layout: `[p.x, p.y, t, center (2), focus1 (2), radmin]`.
#[derive(Debug, Clone)]
pub struct EllipticalArcRangeToEndPoints {
    base: ConstraintBase,
}

impl EllipticalArcRangeToEndPoints {
    pub fn new(p: &Point, ellipse: &Ellipse, angle_t: ParamId) -> Self {
        let mut params = vec![p.x, p.y, angle_t];
        ellipse.push_params(&mut params);
        Self { base: ConstraintBase::new(params) }
    }
}

impl Constraint for EllipticalArcRangeToEndPoints {
    constraint_base!(EllipticalArcRangeToEndPoints);

    fn error_grad(&self, store: &ParamStore, wrt: Option<ParamId>) -> (f64, f64) {
        let p = store.dual_point(&Point::new(self.base.at(0), self.base.at(1)), wrt);
        let t = store.dual(self.base.at(2), wrt);
        let f = ellipse_at(&self.base, 3).frame(store, wrt);

        let rel = p - f.center;
        let rx = rel.dot(&f.major_dir) * f.minor;
        let ry = rel.dot(&f.minor_dir) * f.major;
        // rotate by -t so the residual stays in (-pi, pi]
        let (st, ct) = (t.sin(), t.cos());
        let x = rx * ct + ry * st;
        let y = ry * ct - rx * st;
        let err = Dual::atan2(y, x);
        (err.v, err.d)
    }
}

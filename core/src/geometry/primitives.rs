use super::{take, ParamLayout, Point};
use crate::dual::{Dual, DualVec2};
use crate::params::{ParamId, ParamStore};

/// Line through two points; parameter `u` runs from `p1` (0) to `p2` (1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
}

impl Line {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    pub fn direction(&self, store: &ParamStore, wrt: Option<ParamId>) -> DualVec2 {
        store.dual_point(&self.p2, wrt) - store.dual_point(&self.p1, wrt)
    }

    pub fn value(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        store.dual_point(&self.p1, wrt) + self.direction(store, wrt).scale(u)
    }
}

impl ParamLayout for Line {
    fn push_params(&self, out: &mut Vec<ParamId>) {
        self.p1.push_params(out);
        self.p2.push_params(out);
    }

    fn rebuild(&mut self, params: &[ParamId], cursor: &mut usize) {
        self.p1.rebuild(params, cursor);
        self.p2.rebuild(params, cursor);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub rad: ParamId,
}

impl Circle {
    pub fn new(center: Point, rad: ParamId) -> Self {
        Self { center, rad }
    }

    pub fn value(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        let c = store.dual_point(&self.center, wrt);
        let r = store.dual(self.rad, wrt);
        c + DualVec2::from_duals(u.cos(), u.sin()).scale(r)
    }

    pub fn tangent(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        let r = store.dual(self.rad, wrt);
        DualVec2::from_duals(-u.sin(), u.cos()).scale(r)
    }

    /// Points from `p` towards the center.
    pub fn normal_at(&self, store: &ParamStore, p: &Point, wrt: Option<ParamId>) -> DualVec2 {
        store.dual_point(&self.center, wrt) - store.dual_point(p, wrt)
    }
}

impl ParamLayout for Circle {
    fn push_params(&self, out: &mut Vec<ParamId>) {
        self.center.push_params(out);
        out.push(self.rad);
    }

    fn rebuild(&mut self, params: &[ParamId], cursor: &mut usize) {
        self.center.rebuild(params, cursor);
        self.rad = take(params, cursor);
    }
}

/// Center, first focus and minor radius, evaluated for one differentiation target.
#[derive(Debug, Clone, Copy)]
pub struct ConicFrame {
    pub center: DualVec2,
    pub focus1: DualVec2,
    /// Unit vector from center towards the first focus.
    pub major_dir: DualVec2,
    pub minor_dir: DualVec2,
    pub major: Dual,
    pub minor: Dual,
}

impl ConicFrame {
    pub fn focus2(&self) -> DualVec2 {
        self.center * 2.0 - self.focus1
    }
}

fn conic_frame(
    store: &ParamStore,
    center: &Point,
    focus1: &Point,
    radmin: ParamId,
    hyperbolic: bool,
    wrt: Option<ParamId>,
) -> ConicFrame {
    let c = store.dual_point(center, wrt);
    let f1 = store.dual_point(focus1, wrt);
    let b = store.dual(radmin, wrt);
    let cf = f1 - c;
    let cf2 = cf.dot(&cf);
    let a = if hyperbolic { (cf2 - b * b).sqrt() } else { (cf2 + b * b).sqrt() };
    let major_dir = cf.normalized();
    ConicFrame {
        center: c,
        focus1: f1,
        major_dir,
        minor_dir: major_dir.rot90ccw(),
        major: a,
        minor: b,
    }
}

/// Ellipse by center, first focus and minor radius; the major radius is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Point,
    pub focus1: Point,
    pub radmin: ParamId,
}

impl Ellipse {
    pub fn new(center: Point, focus1: Point, radmin: ParamId) -> Self {
        Self { center, focus1, radmin }
    }

    pub fn frame(&self, store: &ParamStore, wrt: Option<ParamId>) -> ConicFrame {
        conic_frame(store, &self.center, &self.focus1, self.radmin, false, wrt)
    }

    pub fn value(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        let f = self.frame(store, wrt);
        f.center + f.major_dir.scale(f.major * u.cos()) + f.minor_dir.scale(f.minor * u.sin())
    }

    pub fn tangent(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        let f = self.frame(store, wrt);
        f.major_dir.scale(-(f.major * u.sin())) + f.minor_dir.scale(f.minor * u.cos())
    }

    /// Inward normal: bisector of the directions towards both foci.
    pub fn normal_at(&self, store: &ParamStore, p: &Point, wrt: Option<ParamId>) -> DualVec2 {
        let f = self.frame(store, wrt);
        let pv = store.dual_point(p, wrt);
        (f.focus1 - pv).normalized() + (f.focus2() - pv).normalized()
    }
}

impl ParamLayout for Ellipse {
    fn push_params(&self, out: &mut Vec<ParamId>) {
        self.center.push_params(out);
        self.focus1.push_params(out);
        out.push(self.radmin);
    }

    fn rebuild(&mut self, params: &[ParamId], cursor: &mut usize) {
        self.center.rebuild(params, cursor);
        self.focus1.rebuild(params, cursor);
        self.radmin = take(params, cursor);
    }
}

/// Hyperbola branch nearest to `focus1`, same layout as [`Ellipse`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperbola {
    pub center: Point,
    pub focus1: Point,
    pub radmin: ParamId,
}

impl Hyperbola {
    pub fn new(center: Point, focus1: Point, radmin: ParamId) -> Self {
        Self { center, focus1, radmin }
    }

    pub fn frame(&self, store: &ParamStore, wrt: Option<ParamId>) -> ConicFrame {
        conic_frame(store, &self.center, &self.focus1, self.radmin, true, wrt)
    }

    pub fn value(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        let f = self.frame(store, wrt);
        f.center + f.major_dir.scale(f.major * u.cosh()) + f.minor_dir.scale(f.minor * u.sinh())
    }

    pub fn tangent(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        let f = self.frame(store, wrt);
        f.major_dir.scale(f.major * u.sinh()) + f.minor_dir.scale(f.minor * u.cosh())
    }

    pub fn normal_at(&self, store: &ParamStore, p: &Point, wrt: Option<ParamId>) -> DualVec2 {
        let f = self.frame(store, wrt);
        let pv = store.dual_point(p, wrt);
        (f.focus2() - pv).normalized() - (f.focus1 - pv).normalized()
    }
}

impl ParamLayout for Hyperbola {
    fn push_params(&self, out: &mut Vec<ParamId>) {
        self.center.push_params(out);
        self.focus1.push_params(out);
        out.push(self.radmin);
    }

    fn rebuild(&mut self, params: &[ParamId], cursor: &mut usize) {
        self.center.rebuild(params, cursor);
        self.focus1.rebuild(params, cursor);
        self.radmin = take(params, cursor);
    }
}

/// Parabola by vertex and focus; `u` is the signed offset along the directrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parabola {
    pub vertex: Point,
    pub focus1: Point,
}

impl Parabola {
    pub fn new(vertex: Point, focus1: Point) -> Self {
        Self { vertex, focus1 }
    }

    /// Vertex-to-focus distance.
    pub fn focal_length(&self, store: &ParamStore, wrt: Option<ParamId>) -> Dual {
        (store.dual_point(&self.focus1, wrt) - store.dual_point(&self.vertex, wrt)).length()
    }

    fn axes(&self, store: &ParamStore, wrt: Option<ParamId>) -> (DualVec2, DualVec2, Dual) {
        let v = store.dual_point(&self.vertex, wrt);
        let axis = store.dual_point(&self.focus1, wrt) - v;
        let dir = axis.normalized();
        (v, dir, axis.length())
    }

    pub fn value(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        let (v, dir, f) = self.axes(store, wrt);
        v + dir.scale(u * u / (f * 4.0)) + dir.rot90ccw().scale(u)
    }

    pub fn tangent(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        let (_, dir, f) = self.axes(store, wrt);
        dir.scale(u / (f * 2.0)) + dir.rot90ccw()
    }

    pub fn normal_at(&self, store: &ParamStore, p: &Point, wrt: Option<ParamId>) -> DualVec2 {
        let (_, dir, _) = self.axes(store, wrt);
        let to_focus = (store.dual_point(&self.focus1, wrt) - store.dual_point(p, wrt)).normalized();
        (to_focus + dir) * -1.0
    }
}

impl ParamLayout for Parabola {
    fn push_params(&self, out: &mut Vec<ParamId>) {
        self.vertex.push_params(out);
        self.focus1.push_params(out);
    }

    fn rebuild(&mut self, params: &[ParamId], cursor: &mut usize) {
        self.vertex.rebuild(params, cursor);
        self.focus1.rebuild(params, cursor);
    }
}

/// Bounded piece of a curve between two parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcOf<C> {
    pub curve: C,
    pub start: Point,
    pub end: Point,
    pub start_angle: ParamId,
    pub end_angle: ParamId,
}

pub type Arc = ArcOf<Circle>;
pub type ArcOfEllipse = ArcOf<Ellipse>;
pub type ArcOfHyperbola = ArcOf<Hyperbola>;
pub type ArcOfParabola = ArcOf<Parabola>;

impl<C> ArcOf<C> {
    pub fn new(curve: C, start: Point, end: Point, start_angle: ParamId, end_angle: ParamId) -> Self {
        Self { curve, start, end, start_angle, end_angle }
    }
}

impl<C: ParamLayout> ParamLayout for ArcOf<C> {
    fn push_params(&self, out: &mut Vec<ParamId>) {
        self.curve.push_params(out);
        self.start.push_params(out);
        self.end.push_params(out);
        out.push(self.start_angle);
        out.push(self.end_angle);
    }

    fn rebuild(&mut self, params: &[ParamId], cursor: &mut usize) {
        self.curve.rebuild(params, cursor);
        self.start.rebuild(params, cursor);
        self.end.rebuild(params, cursor);
        self.start_angle = take(params, cursor);
        self.end_angle = take(params, cursor);
    }
}

use super::{
    Arc, ArcOfEllipse, ArcOfHyperbola, ArcOfParabola, BSpline, Circle, Ellipse, Hyperbola, Line, ParamLayout,
    Parabola, Point,
};
use crate::dual::{Dual, DualVec2};
use crate::params::{ParamId, ParamStore};

/// Any curve a curve-generic constraint can be built on.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Ellipse(Ellipse),
    ArcOfEllipse(ArcOfEllipse),
    Hyperbola(Hyperbola),
    ArcOfHyperbola(ArcOfHyperbola),
    Parabola(Parabola),
    ArcOfParabola(ArcOfParabola),
    BSpline(BSpline),
}

impl Curve {
    /// Point of the curve at parameter `u`.
    pub fn value(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        match self {
            Curve::Line(l) => l.value(store, u, wrt),
            Curve::Circle(c) => c.value(store, u, wrt),
            Curve::Arc(a) => a.curve.value(store, u, wrt),
            Curve::Ellipse(e) => e.value(store, u, wrt),
            Curve::ArcOfEllipse(a) => a.curve.value(store, u, wrt),
            Curve::Hyperbola(h) => h.value(store, u, wrt),
            Curve::ArcOfHyperbola(a) => a.curve.value(store, u, wrt),
            Curve::Parabola(p) => p.value(store, u, wrt),
            Curve::ArcOfParabola(a) => a.curve.value(store, u, wrt),
            Curve::BSpline(b) => b.value(store, u, wrt),
        }
    }

    /// First derivative of [`Curve::value`] with respect to `u`.
    pub fn tangent(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        match self {
            Curve::Line(l) => l.direction(store, wrt),
            Curve::Circle(c) => c.tangent(store, u, wrt),
            Curve::Arc(a) => a.curve.tangent(store, u, wrt),
            Curve::Ellipse(e) => e.tangent(store, u, wrt),
            Curve::ArcOfEllipse(a) => a.curve.tangent(store, u, wrt),
            Curve::Hyperbola(h) => h.tangent(store, u, wrt),
            Curve::ArcOfHyperbola(a) => a.curve.tangent(store, u, wrt),
            Curve::Parabola(p) => p.tangent(store, u, wrt),
            Curve::ArcOfParabola(a) => a.curve.tangent(store, u, wrt),
            Curve::BSpline(b) => b.tangent(store, u, wrt),
        }
    }

    /// Normal at a point assumed to lie on the curve; the direction agrees with
    /// the tangent rotated a quarter turn counter-clockwise. Length is arbitrary.
    pub fn normal_at(&self, store: &ParamStore, p: &Point, wrt: Option<ParamId>) -> DualVec2 {
        match self {
            Curve::Line(l) => l.direction(store, wrt).rot90ccw(),
            Curve::Circle(c) => c.normal_at(store, p, wrt),
            Curve::Arc(a) => a.curve.normal_at(store, p, wrt),
            Curve::Ellipse(e) => e.normal_at(store, p, wrt),
            Curve::ArcOfEllipse(a) => a.curve.normal_at(store, p, wrt),
            Curve::Hyperbola(h) => h.normal_at(store, p, wrt),
            Curve::ArcOfHyperbola(a) => a.curve.normal_at(store, p, wrt),
            Curve::Parabola(pb) => pb.normal_at(store, p, wrt),
            Curve::ArcOfParabola(a) => a.curve.normal_at(store, p, wrt),
            Curve::BSpline(b) => b.normal_at(store, p, wrt),
        }
    }

    pub fn normal_at_param(&self, store: &ParamStore, u: Dual, wrt: Option<ParamId>) -> DualVec2 {
        self.tangent(store, u, wrt).rot90ccw()
    }

    /// Major radius of ellipses and hyperbolas (and their arcs).
    pub fn major_radius(&self, store: &ParamStore, wrt: Option<ParamId>) -> Option<Dual> {
        match self {
            Curve::Ellipse(e) => Some(e.frame(store, wrt).major),
            Curve::ArcOfEllipse(a) => Some(a.curve.frame(store, wrt).major),
            Curve::Hyperbola(h) => Some(h.frame(store, wrt).major),
            Curve::ArcOfHyperbola(a) => Some(a.curve.frame(store, wrt).major),
            _ => None,
        }
    }

    /// Vertex-to-focus distance of parabolas (and their arcs).
    pub fn focal_length(&self, store: &ParamStore, wrt: Option<ParamId>) -> Option<Dual> {
        match self {
            Curve::Parabola(p) => Some(p.focal_length(store, wrt)),
            Curve::ArcOfParabola(a) => Some(a.curve.focal_length(store, wrt)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Curve::Line(_) => "line",
            Curve::Circle(_) => "circle",
            Curve::Arc(_) => "arc",
            Curve::Ellipse(_) => "ellipse",
            Curve::ArcOfEllipse(_) => "arc of ellipse",
            Curve::Hyperbola(_) => "hyperbola",
            Curve::ArcOfHyperbola(_) => "arc of hyperbola",
            Curve::Parabola(_) => "parabola",
            Curve::ArcOfParabola(_) => "arc of parabola",
            Curve::BSpline(_) => "B-spline",
        }
    }

    fn layout(&self) -> &dyn ParamLayout {
        match self {
            Curve::Line(c) => c,
            Curve::Circle(c) => c,
            Curve::Arc(c) => c,
            Curve::Ellipse(c) => c,
            Curve::ArcOfEllipse(c) => c,
            Curve::Hyperbola(c) => c,
            Curve::ArcOfHyperbola(c) => c,
            Curve::Parabola(c) => c,
            Curve::ArcOfParabola(c) => c,
            Curve::BSpline(c) => c,
        }
    }

    fn layout_mut(&mut self) -> &mut dyn ParamLayout {
        match self {
            Curve::Line(c) => c,
            Curve::Circle(c) => c,
            Curve::Arc(c) => c,
            Curve::Ellipse(c) => c,
            Curve::ArcOfEllipse(c) => c,
            Curve::Hyperbola(c) => c,
            Curve::ArcOfHyperbola(c) => c,
            Curve::Parabola(c) => c,
            Curve::ArcOfParabola(c) => c,
            Curve::BSpline(c) => c,
        }
    }
}

impl ParamLayout for Curve {
    fn push_params(&self, out: &mut Vec<ParamId>) {
        self.layout().push_params(out);
    }

    fn rebuild(&mut self, params: &[ParamId], cursor: &mut usize) {
        self.layout_mut().rebuild(params, cursor);
    }
}

macro_rules! curve_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Curve {
                fn from(c: $ty) -> Self {
                    Curve::$variant(c)
                }
            }
        )*
    };
}

curve_from! {
    Line => Line,
    Circle => Circle,
    Arc => Arc,
    Ellipse => Ellipse,
    ArcOfEllipse => ArcOfEllipse,
    Hyperbola => Hyperbola,
    ArcOfHyperbola => ArcOfHyperbola,
    Parabola => Parabola,
    ArcOfParabola => ArcOfParabola,
    BSpline => BSpline,
}

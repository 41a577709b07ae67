use super::test_support::{approx, assert_contract, circle, ellipse, set};
use super::*;
use crate::geometry::{Curve, Hyperbola, Line, Parabola};
use crate::params::ParamStore;

fn hyperbola(store: &mut ParamStore, cx: f64, cy: f64, a: f64, b: f64) -> Hyperbola {
    let c = (a * a + b * b).sqrt();
    Hyperbola::new(store.alloc_point(cx, cy), store.alloc_point(cx + c, cy), store.alloc(b))
}

fn parabola(store: &mut ParamStore, vx: f64, vy: f64, fx: f64, fy: f64) -> Parabola {
    Parabola::new(store.alloc_point(vx, vy), store.alloc_point(fx, fy))
}

#[test]
fn test_tangent_circles_external() {
    let mut store = ParamStore::new();
    let c1 = circle(&mut store, 0.0, 0.0, 1.0);
    let c2 = circle(&mut store, 3.0, 0.0, 2.0);
    let mut c = TangentCircles::new(&c1, &c2, false);
    assert!(!c.internal());
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &c2.center, 2.5, 1.0);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_tangent_circles_internal() {
    let mut store = ParamStore::new();
    let c1 = circle(&mut store, 0.0, 0.0, 3.0);
    let c2 = circle(&mut store, 1.0, 0.0, 2.0);
    let mut c = TangentCircles::new(&c1, &c2, true);
    assert!(approx(c.residual(&store), 0.0));

    store.set(c2.rad, 4.5);
    set(&mut store, &c2.center, 1.0, 0.5);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_point_on_ellipse() {
    let mut store = ParamStore::new();
    let e = ellipse(&mut store, 0.0, 0.0, 5.0, 3.0, 0.0);
    let p = store.alloc_point(0.0, 3.0);
    let mut c = PointOnEllipse::new(&p, &e);
    assert!(approx(c.residual(&store), 0.0));
    set(&mut store, &p, 5.0, 0.0);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &p, 2.0, 3.5);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_point_on_rotated_ellipse() {
    let mut store = ParamStore::new();
    let phi: f64 = 0.6;
    let e = ellipse(&mut store, 1.0, -2.0, 4.0, 2.0, phi);
    // end of the major axis
    let p = store.alloc_point(1.0 + 4.0 * phi.cos(), -2.0 + 4.0 * phi.sin());
    let mut c = PointOnEllipse::new(&p, &e);
    assert!(c.residual(&store).abs() < 1e-9);

    set(&mut store, &p, 0.0, 0.0);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_point_on_hyperbola() {
    let mut store = ParamStore::new();
    let h = hyperbola(&mut store, 0.0, 0.0, 4.0, 3.0);
    let p = store.alloc_point(4.0, 0.0);
    let mut c = PointOnHyperbola::new(&p, &h);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &p, 6.0, 2.0);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_point_on_parabola() {
    let mut store = ParamStore::new();
    let pb = parabola(&mut store, 0.0, 0.0, 0.0, 1.0);
    let p = store.alloc_point(2.0, 1.0);
    let mut c = PointOnParabola::new(&p, &pb);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &p, 3.0, 1.2);
    set(&mut store, &pb.focus1, 0.3, 1.1);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_tangent_ellipse_line() {
    let mut store = ParamStore::new();
    let e = ellipse(&mut store, 0.0, 0.0, 5.0, 3.0, 0.0);
    let l = Line::new(store.alloc_point(-10.0, 3.0), store.alloc_point(10.0, 3.0));
    let mut c = TangentEllipseLine::new(&l, &e);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &l.p2, 10.0, 5.0);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_internal_alignment_ellipse() {
    use EllipseAlignment::*;
    let cases = [
        (PositiveMajorX, [6.0, 9.0]),
        (PositiveMajorY, [9.0, 2.0]),
        (NegativeMajorX, [-4.0, 9.0]),
        (PositiveMinorY, [9.0, 5.0]),
        (NegativeMinorY, [9.0, -1.0]),
        (NegativeMinorX, [1.0, 9.0]),
        (Focus2X, [-3.0, 9.0]),
        (Focus2Y, [9.0, 2.0]),
    ];
    for (alignment, [x, y]) in cases {
        let mut store = ParamStore::new();
        let e = ellipse(&mut store, 1.0, 2.0, 5.0, 3.0, 0.0);
        let p = store.alloc_point(x, y);
        let mut c = InternalAlignmentPointEllipse::new(&e, &p, alignment);
        assert!(c.is_internal_alignment());
        assert_eq!(c.alignment(), alignment);
        assert!(approx(c.residual(&store), 0.0), "{alignment:?}");

        store.set(e.radmin, 2.5);
        set(&mut store, &e.focus1, 4.0, 3.0);
        assert_contract(&mut c, &mut store);
    }
}

#[test]
fn test_internal_alignment_hyperbola() {
    use HyperbolaAlignment::*;
    let cases = [
        (PositiveMajorX, [4.0, 7.0]),
        (NegativeMajorX, [-4.0, 7.0]),
        (PositiveMinorX, [4.0, 7.0]),
        (PositiveMinorY, [7.0, 3.0]),
        (NegativeMinorY, [7.0, -3.0]),
    ];
    for (alignment, [x, y]) in cases {
        let mut store = ParamStore::new();
        let h = hyperbola(&mut store, 0.0, 0.0, 4.0, 3.0);
        let p = store.alloc_point(x, y);
        let mut c = InternalAlignmentPointHyperbola::new(&h, &p, alignment);
        assert!(c.is_internal_alignment());
        assert!(approx(c.residual(&store), 0.0), "{alignment:?}");

        set(&mut store, &h.focus1, 5.0, 1.0);
        assert_contract(&mut c, &mut store);
    }
}

#[test]
fn test_equal_major_axes_conic() {
    let mut store = ParamStore::new();
    let e: Curve = ellipse(&mut store, 0.0, 0.0, 5.0, 3.0, 0.0).into();
    let h: Curve = hyperbola(&mut store, 10.0, 0.0, 5.0, 2.0).into();
    let mut c = EqualMajorAxesConic::new(&e, &h).unwrap();
    assert!(approx(c.residual(&store), 0.0));

    if let Curve::Ellipse(inner) = &e {
        store.set(inner.radmin, 3.5);
    }
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_equal_major_axes_rejects_line() {
    let mut store = ParamStore::new();
    let e: Curve = ellipse(&mut store, 0.0, 0.0, 5.0, 3.0, 0.0).into();
    let l: Curve = Line::new(store.alloc_point(0.0, 0.0), store.alloc_point(1.0, 0.0)).into();
    let err = EqualMajorAxesConic::new(&e, &l).unwrap_err();
    assert_eq!(
        err,
        ConstraintError::UnsupportedCurve { constraint: ConstraintKind::EqualMajorAxesConic, curve: "line" }
    );
}

#[test]
fn test_equal_focal_distance() {
    let mut store = ParamStore::new();
    let p1 = parabola(&mut store, 0.0, 0.0, 0.0, 1.0);
    let p2 = parabola(&mut store, 5.0, 5.0, 6.0, 5.0);
    let mut c = EqualFocalDistance::new(&p1.into(), &p2.into()).unwrap();
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &p2.focus1, 7.0, 6.0);
    assert!(c.residual(&store) < 0.0);
    assert_contract(&mut c, &mut store);

    let e: Curve = ellipse(&mut store, 0.0, 0.0, 5.0, 3.0, 0.0).into();
    assert!(EqualFocalDistance::new(&p1.into(), &e).is_err());
}

#[test]
fn test_elliptical_arc_range_to_end_points() {
    let mut store = ParamStore::new();
    let e = ellipse(&mut store, 0.0, 0.0, 5.0, 3.0, 0.0);
    let t0: f64 = 0.7;
    let p = store.alloc_point(5.0 * t0.cos(), 3.0 * t0.sin());
    let t = store.alloc(t0);
    let mut c = EllipticalArcRangeToEndPoints::new(&p, &e, t);
    assert!(approx(c.residual(&store), 0.0));
    assert!(approx(c.partial_derivative(&store, t), -1.0));

    set(&mut store, &p, 1.0, 2.0);
    set(&mut store, &e.focus1, 3.5, 1.0);
    assert_contract(&mut c, &mut store);
}

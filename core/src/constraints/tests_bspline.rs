use super::test_support::{approx, assert_contract, line, set};
use super::*;
use crate::geometry::{BSpline, BSplineBasis, Point};
use crate::params::ParamStore;

fn spline(store: &mut ParamStore, basis: BSplineBasis, poles: &[[f64; 2]]) -> BSpline {
    let poles: Vec<Point> = poles.iter().map(|[x, y]| store.alloc_point(*x, *y)).collect();
    let weights = poles.iter().map(|_| store.alloc(1.0)).collect();
    let start = store.alloc_point(0.0, 0.0);
    let end = store.alloc_point(0.0, 0.0);
    BSpline::new(poles, weights, basis, start, end).unwrap()
}

/// Closed quartic over five poles; each span is blended from all five.
fn closed_quartic(store: &mut ParamStore) -> BSpline {
    let basis = BSplineBasis::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], vec![1; 6], 4, true).unwrap();
    spline(store, basis, &[[0.0, 0.0], [2.0, -1.0], [4.0, 1.0], [3.0, 4.0], [0.0, 3.0]])
}

#[test]
fn test_point_on_bspline_cyclic_window() {
    let mut store = ParamStore::new();
    let curve = closed_quartic(&mut store);
    let q = store.alloc(0.0);
    let u = store.alloc(3.5);
    let c = PointOnBSpline::new(q, u, Axis::X, &curve);
    assert_eq!(c.start_pole(&store), 3);
    assert_eq!(c.window(&store), vec![3, 4, 0, 1, 2]);
    assert_eq!(c.axis(), Axis::X);
}

#[test]
fn test_point_on_bspline_closed() {
    let mut store = ParamStore::new();
    let curve = closed_quartic(&mut store);
    let q = store.alloc(1.0);
    let u = store.alloc(3.5);
    let mut c = PointOnBSpline::new(q, u, Axis::Y, &curve);

    store.set(curve.weights[4], 1.7);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_point_on_bspline_clamped() {
    let mut store = ParamStore::new();
    let basis = BSplineBasis::new(vec![0.0, 1.0], vec![3, 3], 2, false).unwrap();
    let curve = spline(&mut store, basis, &[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]]);
    let qx = store.alloc(1.0);
    let qy = store.alloc(0.5);
    let u = store.alloc(0.5);
    let mut cx = PointOnBSpline::new(qx, u, Axis::X, &curve);
    let mut cy = PointOnBSpline::new(qy, u, Axis::Y, &curve);
    assert!(approx(cx.residual(&store), 0.0));
    assert!(approx(cy.residual(&store), 0.0));

    // a heavier middle pole pulls the curve towards it
    store.set(curve.weights[1], 3.0);
    assert!(cy.residual(&store) < 0.0);

    store.set(u, 0.3);
    assert_contract(&mut cx, &mut store);
    assert_contract(&mut cy, &mut store);
}

#[test]
fn test_slope_at_bspline_knot() {
    let mut store = ParamStore::new();
    let basis = BSplineBasis::new(vec![0.0, 1.0, 2.0], vec![4, 1, 4], 3, false).unwrap();
    let curve = spline(&mut store, basis, &[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]]);
    let l = line(&mut store, 0.0, 0.0, 1.0, 1.0);
    let mut c = SlopeAtBSplineKnot::new(&curve, &l, 1).unwrap();
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &curve.poles[2], 2.5, 1.0);
    store.set(curve.weights[1], 1.4);
    assert!(c.residual(&store).abs() > 1e-3);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_slope_at_bspline_knot_out_of_range() {
    let mut store = ParamStore::new();
    let basis = BSplineBasis::new(vec![0.0, 1.0, 2.0], vec![4, 1, 4], 3, false).unwrap();
    let curve = spline(&mut store, basis, &[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]]);
    let l = line(&mut store, 0.0, 0.0, 1.0, 1.0);
    let err = SlopeAtBSplineKnot::new(&curve, &l, 3).unwrap_err();
    assert_eq!(err, ConstraintError::KnotOutOfRange { index: 3, knots: 3 });
}

#[test]
fn test_knot_point_from_blending_factors() {
    let mut store = ParamStore::new();
    let basis = BSplineBasis::new(vec![0.0, 1.0, 2.0], vec![4, 1, 4], 3, false).unwrap();
    let curve = spline(&mut store, basis, &[[0.0, 0.0], [1.0, 2.0], [2.0, -1.0], [3.0, 3.0], [4.0, 0.0]]);
    let (factors, _) = curve.basis.factors(1.0);
    let expected: f64 = factors.iter().zip(&curve.poles).map(|(f, p)| f * store.get(p.y)).sum();
    let q = store.alloc(expected);

    let poles: Vec<_> = curve.poles.iter().map(|p| p.y).collect();
    let mut c = WeightedLinearCombination::new(q, &poles, &curve.weights, factors).unwrap();
    assert!(approx(c.residual(&store), 0.0));

    store.set(curve.weights[2], 2.0);
    assert_contract(&mut c, &mut store);
}

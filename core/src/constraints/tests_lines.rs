use super::test_support::{approx, assert_contract, direction, line, set};
use super::*;
use crate::params::ParamStore;

#[test]
fn test_distance_point_point_scenario() {
    let mut store = ParamStore::new();
    let p1 = store.alloc_point(0.0, 0.0);
    let p2 = store.alloc_point(3.0, 0.0);
    let d = store.alloc(5.0);
    let mut c = DistancePointPoint::new(&p1, &p2, d);
    assert!(approx(c.residual(&store), -2.0));

    set(&mut store, &p2, 5.0, 0.0);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &p2, 2.0, 1.5);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_distance_point_point_max_step() {
    let mut store = ParamStore::new();
    let p1 = store.alloc_point(0.0, 0.0);
    let p2 = store.alloc_point(3.0, 0.0);
    let d = store.alloc(1.0);
    let c = DistancePointPoint::new(&p1, &p2, d);

    // target distance may not go negative
    let dir = direction(&[(d, -2.0)]);
    let f = c.max_step(&store, &dir, 1.0);
    assert!(approx(f, 0.5));
    assert!(store.get(d) + f * -2.0 >= 0.0);

    // the points may not jump further than the current separation
    store.set(d, 5.0);
    let dir = direction(&[(p2.x, -10.0)]);
    assert!(approx(c.max_step(&store, &dir, 1.0), 0.5));

    // small steps are unrestricted
    let dir = direction(&[(p2.x, 0.1)]);
    assert_eq!(c.max_step(&store, &dir, 1.0), 1.0);
}

#[test]
fn test_distance_point_line() {
    let mut store = ParamStore::new();
    let p = store.alloc_point(5.0, 5.0);
    let l = line(&mut store, 0.0, 0.0, 10.0, 0.0);
    let d = store.alloc(5.0);
    let mut c = DistancePointLine::new(&p, &l, d);
    assert!(approx(c.residual(&store), 0.0));

    // unsigned: the other side of the line is just as far
    set(&mut store, &p, 5.0, -5.0);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &p, 2.0, -3.0);
    store.set(d, 1.0);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_distance_point_line_max_step() {
    let mut store = ParamStore::new();
    let p = store.alloc_point(5.0, 5.0);
    let l = line(&mut store, 0.0, 0.0, 10.0, 0.0);
    let d = store.alloc(2.0);
    let c = DistancePointLine::new(&p, &l, d);

    let dir = direction(&[(p.y, -10.0)]);
    assert!(approx(c.max_step(&store, &dir, 1.0), 0.15));

    let dir = direction(&[(d, -4.0)]);
    assert!(approx(c.max_step(&store, &dir, 1.0), 0.5));
}

#[test]
fn test_point_on_line() {
    let mut store = ParamStore::new();
    let p = store.alloc_point(2.0, 2.0);
    let l = line(&mut store, 0.0, 0.0, 4.0, 4.0);
    let mut c = PointOnLine::new(&p, &l);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &p, 1.0, 3.0);
    assert!(c.residual(&store).abs() > 1.0);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_point_on_line_degenerate_line() {
    let mut store = ParamStore::new();
    let p = store.alloc_point(2.0, 2.0);
    let l = line(&mut store, 1.0, 1.0, 1.0, 1.0);
    let c = PointOnLine::new(&p, &l);
    assert_eq!(c.residual(&store), 0.0);
    assert_eq!(c.partial_derivative(&store, p.x), 0.0);
}

#[test]
fn test_point_on_perp_bisector() {
    let mut store = ParamStore::new();
    let p = store.alloc_point(1.0, 5.0);
    let l = line(&mut store, 0.0, 0.0, 2.0, 0.0);
    let mut c = PointOnPerpBisector::new(&p, &l);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &p, 1.7, 2.0);
    set(&mut store, &l.p2, 2.5, 0.8);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_parallel() {
    let mut store = ParamStore::new();
    let l1 = line(&mut store, 0.0, 0.0, 2.0, 0.0);
    let l2 = line(&mut store, 0.0, 1.0, 3.0, 1.0);
    let mut c = Parallel::new(&l1, &l2);
    assert!(approx(c.residual(&store), 0.0));

    c.rescale(&store, 1.0);
    assert!(approx(c.base().scale(), 1.0 / 6.0));

    set(&mut store, &l2.p2, 3.0, 2.0);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_parallel_rescale_degenerate_line() {
    let mut store = ParamStore::new();
    let l1 = line(&mut store, 0.0, 0.0, 0.0, 0.0);
    let l2 = line(&mut store, 0.0, 1.0, 3.0, 1.0);
    let mut c = Parallel::new(&l1, &l2);
    c.rescale(&store, 2.0);
    assert!(approx(c.base().scale(), 2.0));
}

#[test]
fn test_perpendicular() {
    let mut store = ParamStore::new();
    let l1 = line(&mut store, 0.0, 0.0, 2.0, 0.0);
    let l2 = line(&mut store, 1.0, 1.0, 1.0, 4.0);
    let mut c = Perpendicular::new(&l1, &l2);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &l2.p2, 2.0, 4.0);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_angle_point_point() {
    let mut store = ParamStore::new();
    let p1 = store.alloc_point(1.0, 1.0);
    let p2 = store.alloc_point(2.0, 2.0);
    let angle = store.alloc(std::f64::consts::FRAC_PI_4);
    let mut c = AnglePointPoint::new(&p1, &p2, angle);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &p2, 4.0, 3.0);
    store.set(angle, 0.5);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_angle_point_point_wraps() {
    let mut store = ParamStore::new();
    let p1 = store.alloc_point(0.0, 0.0);
    let p2 = store.alloc_point(-1.0, 0.0);
    let angle = store.alloc(-std::f64::consts::PI);
    let offset = AnglePointPoint::with_offset(&p1, &p2, angle, 2.0 * std::f64::consts::PI);
    // pi and -pi + 2pi describe the same direction
    assert!(offset.residual(&store).abs() < 1e-9);
}

#[test]
fn test_angle_point_point_max_step() {
    let mut store = ParamStore::new();
    let p1 = store.alloc_point(0.0, 0.0);
    let p2 = store.alloc_point(1.0, 0.0);
    let angle = store.alloc(0.0);
    let c = AnglePointPoint::new(&p1, &p2, angle);

    let dir = direction(&[(angle, 1.0)]);
    let f = c.max_step(&store, &dir, 1.0);
    assert!(approx(f, MAX_ANGLE_STEP));
    assert!(f * 1.0 <= MAX_ANGLE_STEP + 1e-12);

    let dir = direction(&[(angle, 0.01)]);
    assert_eq!(c.max_step(&store, &dir, 0.8), 0.8);
}

#[test]
fn test_angle_line_line() {
    let mut store = ParamStore::new();
    let l1 = line(&mut store, 0.0, 0.0, 1.0, 0.0);
    let l2 = line(&mut store, 0.0, 0.0, 0.0, 1.0);
    let angle = store.alloc(std::f64::consts::FRAC_PI_2);
    let mut c = AngleLineLine::new(&l1, &l2, angle);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &l1.p2, 2.0, 1.0);
    set(&mut store, &l2.p1, 1.0, 1.0);
    set(&mut store, &l2.p2, 0.0, 3.0);
    store.set(angle, 1.0);
    assert_contract(&mut c, &mut store);

    let dir = direction(&[(angle, -2.0)]);
    assert!(approx(c.max_step(&store, &dir, 1.0), MAX_ANGLE_STEP / 2.0));
}

#[test]
fn test_midpoint_on_line() {
    let mut store = ParamStore::new();
    let l1 = line(&mut store, 0.0, 0.0, 2.0, 2.0);
    let l2 = line(&mut store, 0.0, 1.0, 5.0, 1.0);
    let mut c = MidpointOnLine::new(&l1, &l2);
    assert!(approx(c.residual(&store), 0.0));

    set(&mut store, &l1.p2, 3.0, 4.0);
    set(&mut store, &l2.p2, 5.0, 2.0);
    assert_contract(&mut c, &mut store);
}

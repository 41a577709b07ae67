use super::test_support::{approx, assert_contract};
use super::*;
use crate::params::ParamStore;

#[test]
fn test_equal_scenario() {
    let mut store = ParamStore::new();
    let a = store.alloc(2.0);
    let b = store.alloc(2.0);
    let c = Equal::new(a, b);
    assert_eq!(c.residual(&store), 0.0);

    store.set(b, 3.0);
    assert!(approx(c.residual(&store), -1.0));
    assert_eq!(c.partial_derivative(&store, a), 1.0);
    assert_eq!(c.partial_derivative(&store, b), -1.0);
}

#[test]
fn test_equal_with_ratio() {
    let mut store = ParamStore::new();
    let a = store.alloc(6.0);
    let b = store.alloc(2.0);
    let mut c = Equal::with_ratio(a, b, 3.0);
    assert!(approx(c.residual(&store), 0.0));
    assert!(approx(c.partial_derivative(&store, b), -3.0));
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_equal_same_cell_twice() {
    let mut store = ParamStore::new();
    let a = store.alloc(4.0);
    let c = Equal::with_ratio(a, a, 0.5);
    assert!(approx(c.residual(&store), 2.0));
    // both positions hold the queried handle
    assert!(approx(c.partial_derivative(&store, a), 0.5));
}

#[test]
fn test_difference() {
    let mut store = ParamStore::new();
    let p1 = store.alloc(1.0);
    let p2 = store.alloc(4.0);
    let d = store.alloc(3.0);
    let mut c = Difference::new(p1, p2, d);
    assert!(approx(c.residual(&store), 0.0));
    store.set(d, 2.5);
    assert!(approx(c.residual(&store), 0.5));
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_center_of_gravity() {
    let mut store = ParamStore::new();
    let q = store.alloc(2.0);
    let p = [store.alloc(0.0), store.alloc(3.0), store.alloc(6.0)];
    let mut c = CenterOfGravity::new(q, &p, vec![0.5, 0.5, 0.0]).unwrap();
    assert!(approx(c.residual(&store), 0.5));
    assert!(approx(c.partial_derivative(&store, p[1]), -0.5));
    assert_eq!(c.partial_derivative(&store, p[2]), 0.0);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_center_of_gravity_count_mismatch() {
    let mut store = ParamStore::new();
    let q = store.alloc(0.0);
    let p = [store.alloc(0.0), store.alloc(1.0)];
    let err = CenterOfGravity::new(q, &p, vec![1.0]).unwrap_err();
    assert_eq!(err, ConstraintError::CountMismatch { what: "center of gravity weights", expected: 2, got: 1 });
}

#[test]
fn test_weighted_linear_combination() {
    let mut store = ParamStore::new();
    let q = store.alloc(1.5);
    let poles = [store.alloc(1.0), store.alloc(2.0)];
    let weights = [store.alloc(1.0), store.alloc(1.0)];
    let mut c = WeightedLinearCombination::new(q, &poles, &weights, vec![0.5, 0.5]).unwrap();
    assert!(approx(c.residual(&store), 0.0));

    store.set(weights[1], 3.0);
    store.set(q, 0.7);
    assert_contract(&mut c, &mut store);
}

#[test]
fn test_weighted_linear_combination_count_mismatch() {
    let mut store = ParamStore::new();
    let q = store.alloc(0.0);
    let poles = [store.alloc(0.0), store.alloc(1.0)];
    let weights = [store.alloc(1.0)];
    assert!(matches!(
        WeightedLinearCombination::new(q, &poles, &weights, vec![1.0, 0.0]),
        Err(ConstraintError::CountMismatch { what: "pole weights", .. })
    ));
}

#[test]
fn test_rescale_scales_residual_and_derivative() {
    let mut store = ParamStore::new();
    let a = store.alloc(3.0);
    let b = store.alloc(1.0);
    let mut c = Equal::new(a, b);
    c.rescale(&store, 4.0);
    assert!(approx(c.residual(&store), 8.0));
    assert!(approx(c.partial_derivative(&store, b), -4.0));

    // rescale sets the scale rather than compounding it
    c.rescale(&store, 4.0);
    assert!(approx(c.base().scale(), 4.0));

    c.rescale(&store, -1.0);
    assert!(approx(c.base().scale(), 4.0));
}

#[test]
fn test_metadata_setters() {
    let mut store = ParamStore::new();
    let a = store.alloc(0.0);
    let b = store.alloc(0.0);
    let mut c = Equal::new(a, b);
    assert!(c.is_driving());
    assert!(!c.is_internal_alignment());
    c.set_tag(7);
    c.set_driving(false);
    c.set_internal_alignment(true);
    assert_eq!(c.tag(), 7);
    assert!(!c.is_driving());
    assert!(c.is_internal_alignment());
    assert_eq!(c.kind(), ConstraintKind::Equal);
}

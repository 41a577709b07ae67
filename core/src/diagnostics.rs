//! Bookkeeping read by DOF analysis and gradient verification.

use crate::config::Settings;
use crate::constraints::{Constraint, ConstraintKind};
use crate::params::{ParamId, ParamStore};
use crate::redirect::ConstraintSet;
use serde::Serialize;
use std::collections::HashSet;

/// Snapshot of one constraint's metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintInfo {
    pub index: usize,
    pub tag: i32,
    pub kind: ConstraintKind,
    pub driving: bool,
    pub internal_alignment: bool,
    pub param_count: usize,
}

impl ConstraintInfo {
    pub fn new(index: usize, constraint: &dyn Constraint) -> Self {
        Self {
            index,
            tag: constraint.tag(),
            kind: constraint.kind(),
            driving: constraint.is_driving(),
            internal_alignment: constraint.is_internal_alignment(),
            param_count: constraint.params().len(),
        }
    }
}

impl ConstraintSet {
    pub fn infos(&self) -> Vec<ConstraintInfo> {
        self.iter().enumerate().map(|(i, c)| ConstraintInfo::new(i, c)).collect()
    }

    /// Members that take part in the active equation set.
    pub fn driving(&self) -> impl Iterator<Item = &dyn Constraint> {
        self.iter().filter(|c| c.is_driving())
    }

    pub fn by_tag(&self, tag: i32) -> impl Iterator<Item = &dyn Constraint> {
        self.iter().filter(move |c| c.tag() == tag)
    }

    /// Equations that count against user-facing degrees of freedom.
    pub fn dof_equation_count(&self) -> usize {
        self.iter().filter(|c| c.is_driving() && !c.is_internal_alignment()).count()
    }
}

/// Analytic derivative that disagrees with its finite-difference estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientMismatch {
    pub param: ParamId,
    pub analytic: f64,
    pub numeric: f64,
}

/// Compares every partial derivative of `constraint` with a centered difference.
///
/// Cell values are restored before returning.
pub fn check_gradients(
    constraint: &dyn Constraint,
    store: &mut ParamStore,
    settings: &Settings,
) -> Vec<GradientMismatch> {
    let h = settings.finite_difference_step;
    let mut seen = HashSet::new();
    let mut mismatches = Vec::new();
    for &param in constraint.params() {
        if !seen.insert(param) {
            continue;
        }
        let value = store.get(param);
        store.set(param, value + h);
        let plus = constraint.residual(store);
        store.set(param, value - h);
        let minus = constraint.residual(store);
        store.set(param, value);

        let numeric = (plus - minus) / (2.0 * h);
        let analytic = constraint.partial_derivative(store, param);
        let scale = 1.0_f64.max(analytic.abs()).max(numeric.abs());
        if (analytic - numeric).abs() > settings.gradient_tolerance * scale {
            mismatches.push(GradientMismatch { param, analytic, numeric });
        }
    }
    if !mismatches.is_empty() {
        tracing::debug!(kind = %constraint.kind(), count = mismatches.len(), "gradient mismatches");
    }
    mismatches
}

//! Whole-set redirection of constraint handles.
//!
//! A solver that wants to work on private copies of some cells mirrors them
//! (see [`ParamStore::mirror`](crate::params::ParamStore::mirror)) and redirects
//! the entire working set at once. The returned [`Redirected`] guard reverts
//! every constraint when it goes out of scope, so no constraint outlives the
//! batch in a redirected state. The buffer cells can then be handed back with
//! [`ParamStore::release`](crate::params::ParamStore::release).

use crate::constraints::Constraint;
use crate::params::{ParamId, ParamStore, StepDirection, SubstitutionMap};
use std::collections::HashSet;
use std::ops::Deref;

/// Owned working set of constraints.
#[derive(Debug, Default)]
pub struct ConstraintSet {
    constraints: Vec<Box<dyn Constraint>>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint and returns its index in the set.
    pub fn push<C: Constraint + 'static>(&mut self, constraint: C) -> usize {
        self.push_boxed(Box::new(constraint))
    }

    pub fn push_boxed(&mut self, constraint: Box<dyn Constraint>) -> usize {
        tracing::trace!(kind = %constraint.kind(), params = constraint.params().len(), "added constraint");
        self.constraints.push(constraint);
        self.constraints.len() - 1
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Constraint> {
        self.constraints.get(index).map(|c| c.as_ref())
    }

    /// Marks a member as driving or reference-only. Returns `false` for an unknown index.
    pub fn set_driving(&mut self, index: usize, driving: bool) -> bool {
        match self.constraints.get_mut(index) {
            Some(c) => {
                c.set_driving(driving);
                true
            }
            None => false,
        }
    }

    /// Retags a member. Returns `false` for an unknown index.
    pub fn set_tag(&mut self, index: usize, tag: i32) -> bool {
        match self.constraints.get_mut(index) {
            Some(c) => {
                c.set_tag(tag);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Constraint> {
        self.constraints.iter().map(|c| c.as_ref())
    }

    /// Distinct handles of all members, in order of first use.
    pub fn params(&self) -> Vec<ParamId> {
        let mut seen = HashSet::new();
        self.iter()
            .flat_map(|c| c.params().iter().copied())
            .filter(|p| seen.insert(*p))
            .collect()
    }

    pub fn residuals(&self, store: &ParamStore) -> Vec<f64> {
        self.iter().map(|c| c.residual(store)).collect()
    }

    pub fn rescale_all(&mut self, store: &ParamStore, coef: f64) {
        for c in self.constraints.iter_mut() {
            c.rescale(store, coef);
        }
    }

    /// Smallest step fraction any member allows.
    pub fn max_step(&self, store: &ParamStore, dir: &StepDirection, limit: f64) -> f64 {
        self.iter().fold(limit, |lim, c| c.max_step(store, dir, lim))
    }

    /// Redirects every member through `map` and resynchronizes it.
    pub fn redirect(&mut self, map: &SubstitutionMap) -> Redirected<'_> {
        tracing::debug!(constraints = self.len(), substitutions = map.len(), "redirecting constraint set");
        for c in self.constraints.iter_mut() {
            c.redirect_params(map);
            c.resynchronize();
        }
        Redirected { set: self, active: true }
    }

    fn revert_all(&mut self) {
        tracing::debug!(constraints = self.len(), "reverting constraint set");
        for c in self.constraints.iter_mut() {
            c.revert_params();
            c.resynchronize();
        }
    }
}

/// Read-only view of a redirected [`ConstraintSet`]; reverts on drop.
#[derive(Debug)]
pub struct Redirected<'a> {
    set: &'a mut ConstraintSet,
    active: bool,
}

impl Redirected<'_> {
    /// Ends the redirection now.
    pub fn revert(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if self.active {
            self.set.revert_all();
            self.active = false;
        }
    }
}

impl Deref for Redirected<'_> {
    type Target = ConstraintSet;

    fn deref(&self) -> &ConstraintSet {
        self.set
    }
}

impl Drop for Redirected<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}

//! Parameter cells and their handles.
//!
//! Every numeric value a constraint reads lives in a [`ParamStore`] cell and is
//! addressed by a [`ParamId`]. Aliasing between constraints is decided on the
//! handle, never on the value: two cells holding the same number are different
//! cells.

use crate::dual::{Dual, DualVec2};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable identity of one parameter cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamId(u32);

impl ParamId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Canonical handle -> replacement handle.
pub type SubstitutionMap = HashMap<ParamId, ParamId>;

/// Per-cell delta of a proposed solver step.
pub type StepDirection = HashMap<ParamId, f64>;

/// Owner of all parameter cells of a sketch (and of any private solver buffers).
#[derive(Debug, Clone, Default)]
pub struct ParamStore {
    values: Vec<f64>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, value: f64) -> ParamId {
        let id = ParamId(self.values.len() as u32);
        self.values.push(value);
        id
    }

    pub fn alloc_point(&mut self, x: f64, y: f64) -> Point {
        Point { x: self.alloc(x), y: self.alloc(y) }
    }

    /// Panics if `id` was not allocated by this store.
    pub fn get(&self, id: ParamId) -> f64 {
        self.values[id.index()]
    }

    pub fn set(&mut self, id: ParamId, value: f64) {
        self.values[id.index()] = value;
    }

    pub fn set_point(&mut self, point: &Point, x: f64, y: f64) {
        self.set(point.x, x);
        self.set(point.y, y);
    }

    pub fn point(&self, point: &Point) -> [f64; 2] {
        [self.get(point.x), self.get(point.y)]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of `id` seeded with derivative 1 when `id` is the differentiation target.
    pub fn dual(&self, id: ParamId, wrt: Option<ParamId>) -> Dual {
        Dual::new(self.get(id), seed(id, wrt))
    }

    pub fn dual_point(&self, point: &Point, wrt: Option<ParamId>) -> DualVec2 {
        DualVec2::new(
            self.get(point.x),
            seed(point.x, wrt),
            self.get(point.y),
            seed(point.y, wrt),
        )
    }

    /// Allocates a private buffer cell for every distinct handle in `ids`, initialised
    /// with the canonical value, and returns the canonical -> buffer map.
    pub fn mirror(&mut self, ids: &[ParamId]) -> SubstitutionMap {
        let mut map = SubstitutionMap::with_capacity(ids.len());
        for &id in ids {
            if !map.contains_key(&id) {
                let copy = self.alloc(self.get(id));
                map.insert(id, copy);
            }
        }
        map
    }

    /// Writes buffer values back into their canonical cells.
    pub fn commit(&mut self, map: &SubstitutionMap) {
        for (&canonical, &buffer) in map {
            let value = self.get(buffer);
            self.set(canonical, value);
        }
    }

    /// Position of the next cell to be allocated; pass it to [`ParamStore::truncate`]
    /// to drop every cell allocated after this call.
    pub fn mark(&self) -> usize {
        self.values.len()
    }

    /// Frees every cell allocated since `mark`. Handles to those cells must not be
    /// used afterwards.
    pub fn truncate(&mut self, mark: usize) {
        self.values.truncate(mark);
    }

    /// Frees the buffer cells of `map` when they sit at the end of the store, as
    /// they do right after [`ParamStore::mirror`]. Returns whether anything was freed.
    pub fn release(&mut self, map: &SubstitutionMap) -> bool {
        let Some(first) = map.values().map(|id| id.index()).min() else {
            return false;
        };
        if first + map.len() != self.values.len() {
            return false;
        }
        self.truncate(first);
        true
    }

    /// Re-seeds buffer cells from the canonical cells.
    pub fn refresh(&mut self, map: &SubstitutionMap) {
        for (&canonical, &buffer) in map {
            let value = self.get(canonical);
            self.set(buffer, value);
        }
    }
}

/// 1.0 when `id` is the differentiation target, else 0.0.
#[inline]
pub fn seed(id: ParamId, wrt: Option<ParamId>) -> f64 {
    if wrt == Some(id) {
        1.0
    } else {
        0.0
    }
}

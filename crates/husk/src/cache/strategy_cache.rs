// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent cache of construction procedures.
//!
//! Lookups first peek under the read lock. On a miss the write lock is taken,
//! the map is checked again, and the procedure is built and stored while the
//! lock is held, so concurrent first requests for one type converge on a
//! single procedure.

use crate::strategy::{ConstructionProcedure, StrategyKind};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
    pub last_hit_ns: u64,
    pub last_miss_ns: u64,
}

/// Type name -> procedure, first write wins.
#[derive(Default)]
pub struct StrategyCache {
    inner: RwLock<HashMap<String, Arc<ConstructionProcedure>>>,
    stats: RwLock<LookupStats>,
}

impl StrategyCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached procedure for `type_name`, without building.
    pub fn get(&self, type_name: &str) -> Option<Arc<ConstructionProcedure>> {
        self.inner.read().get(type_name).map(Arc::clone)
    }

    /// Return the cached procedure, or build and store one.
    ///
    /// A failed build stores nothing; the next call builds again.
    pub fn get_or_try_build<F, E>(
        &self,
        type_name: &str,
        build: F,
    ) -> Result<Arc<ConstructionProcedure>, E>
    where
        F: FnOnce() -> Result<ConstructionProcedure, E>,
    {
        let start = Instant::now();
        if let Some(hit) = self.get(type_name) {
            self.record_hit(start);
            return Ok(hit);
        }

        let mut cache = self.inner.write();
        if let Some(hit) = cache.get(type_name) {
            self.record_hit(start);
            return Ok(Arc::clone(hit));
        }

        let built = Arc::new(build()?);
        debug_assert_eq!(
            built.type_name(),
            type_name,
            "ConstructionProcedure type must match lookup key"
        );
        cache.insert(type_name.to_string(), Arc::clone(&built));
        drop(cache);

        self.record_miss(start);
        log::debug!(
            "[strategy-cache] Stored {} procedure for '{}'",
            built.kind(),
            type_name
        );
        Ok(built)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.inner.read().contains_key(type_name)
    }

    /// Strategy chosen for `type_name`, if already built.
    pub fn kind_of(&self, type_name: &str) -> Option<StrategyKind> {
        self.inner.read().get(type_name).map(|p| p.kind())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> LookupStats {
        *self.stats.read()
    }

    fn record_hit(&self, start: Instant) {
        let mut stats = self.stats.write();
        stats.hits = stats.hits.saturating_add(1);
        stats.last_hit_ns = start.elapsed().as_nanos() as u64;
    }

    fn record_miss(&self, start: Instant) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
        stats.last_miss_ns = start.elapsed().as_nanos() as u64;
    }
}

impl fmt::Debug for StrategyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyCache")
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

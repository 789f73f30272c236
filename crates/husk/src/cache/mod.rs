// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type caches owned by an [`Instantiator`](crate::Instantiator).
//!
//! Both caches are append-only maps keyed by type name. The first writer for a
//! key wins; entries are never evicted or rebuilt.

mod clone_cache;
mod strategy_cache;

pub use clone_cache::{CloneCache, ConstructionSource};
pub use strategy_cache::{LookupStats, StrategyCache};

#[cfg(test)]
mod tests;

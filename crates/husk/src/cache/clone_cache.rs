// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Clone-or-build decision per type.
//!
//! After the first successful build of a type the engine records how later
//! requests are served. Types that are cloneable and declare no duplication
//! hook keep a template; every other type is built fresh each time. The
//! template itself never leaves the cache, only structural copies of it.

use crate::types::Instance;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

/// How later requests for a type are served.
#[derive(Debug, Clone)]
pub enum ConstructionSource {
    /// Invoke the cached construction procedure every time.
    FreshBuild,
    /// Structurally copy the retained template.
    CloneOfTemplate(Instance),
}

/// Type name -> construction source, first write wins.
#[derive(Default)]
pub struct CloneCache {
    inner: RwLock<HashMap<String, ConstructionSource>>,
}

impl CloneCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Structural copy of the template for `type_name`, if one is retained.
    ///
    /// Runs no duplication hook.
    pub fn duplicate(&self, type_name: &str) -> Option<Instance> {
        match self.inner.read().get(type_name) {
            Some(ConstructionSource::CloneOfTemplate(template)) => Some(template.clone()),
            _ => None,
        }
    }

    /// True once a decision has been recorded for `type_name`.
    pub fn is_decided(&self, type_name: &str) -> bool {
        self.inner.read().contains_key(type_name)
    }

    /// True when a template is retained for `type_name`.
    pub fn is_template(&self, type_name: &str) -> bool {
        matches!(
            self.inner.read().get(type_name),
            Some(ConstructionSource::CloneOfTemplate(_))
        )
    }

    /// Record the decision for the type of a freshly built instance.
    ///
    /// The decision reads the built instance's descriptor. Returns `false`
    /// when another caller already decided for this type.
    pub fn record(&self, built: &Instance) -> bool {
        let type_name = built.type_name();
        if self.is_decided(type_name) {
            return false;
        }

        let mut cache = self.inner.write();
        if cache.contains_key(type_name) {
            return false;
        }
        let source = if built.descriptor().is_safe_to_clone() {
            ConstructionSource::CloneOfTemplate(built.clone())
        } else {
            ConstructionSource::FreshBuild
        };
        log::debug!(
            "[clone-cache] '{}' -> {}",
            type_name,
            match source {
                ConstructionSource::CloneOfTemplate(_) => "template",
                ConstructionSource::FreshBuild => "fresh build",
            }
        );
        cache.insert(type_name.to_string(), source);
        true
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl fmt::Debug for CloneCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloneCache")
            .field("len", &self.len())
            .finish()
    }
}

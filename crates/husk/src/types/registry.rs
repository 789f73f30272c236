// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry of loaded types.
//!
//! Concurrent name -> descriptor map. Registration is append-only: a type's
//! shape is assumed stable for the life of the registry, which is what lets
//! the engine cache construction procedures per name.

use crate::types::builtins;
use crate::types::TypeDescriptor;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Registry operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    AlreadyRegistered { name: String },
    ParentNotRegistered { name: String, parent: String },
    /// The parent carries a registered name but is a different descriptor.
    ParentMismatch { name: String, parent: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRegistered { name } => write!(f, "Type already registered: {}", name),
            Self::ParentNotRegistered { name, parent } => {
                write!(f, "Type {} extends unregistered type {}", name, parent)
            }
            Self::ParentMismatch { name, parent } => write!(
                f,
                "Type {} extends a descriptor of {} that is not the registered one",
                name, parent
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Thread-safe table of registered types.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: DashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the runtime builtin types.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register every builtin type not registered yet. Returns how many were added.
    pub fn register_builtins(&self) -> usize {
        let mut added = 0;
        for descriptor in builtins::descriptors() {
            if self.register(descriptor).is_ok() {
                added += 1;
            }
        }
        added
    }

    /// Register a type. Its parent, if any, must already be registered.
    pub fn register(&self, descriptor: TypeDescriptor) -> Result<Arc<TypeDescriptor>, RegistryError> {
        // Parent lookup must happen before taking the entry lock (same shard).
        if let Some(parent) = &descriptor.parent {
            let Some(registered) = self.get(&parent.name) else {
                return Err(RegistryError::ParentNotRegistered {
                    name: descriptor.name.clone(),
                    parent: parent.name.clone(),
                });
            };
            if !Arc::ptr_eq(&registered, parent) {
                return Err(RegistryError::ParentMismatch {
                    name: descriptor.name.clone(),
                    parent: parent.name.clone(),
                });
            }
        }

        match self.types.entry(descriptor.name.clone()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyRegistered {
                name: descriptor.name,
            }),
            Entry::Vacant(slot) => {
                let descriptor = Arc::new(descriptor);
                slot.insert(Arc::clone(&descriptor));
                log::debug!("[registry] registered type '{}'", descriptor.name);
                Ok(descriptor)
            }
        }
    }

    /// Look up a type by name.
    pub fn get(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

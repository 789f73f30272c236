// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.
//!
//! A descriptor is resolved once, registered, and then shared immutably as
//! `Arc<TypeDescriptor>`. Everything the strategies need to decide *how* to
//! build an instance (ancestry, builtin/final flags, declared hooks) is
//! answered here by inspecting metadata only; no hook is ever called.

use crate::types::hooks::{CloneFn, HookFault, Initializer, TypeHooks, UnserializeFn, WakeupFn};
use crate::types::{Instance, Value};
use std::fmt;
use std::sync::Arc;

/// Whether a type has a concrete layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Concrete,
    Abstract,
}

/// Declared kind of a field; decides its zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Str,
    Array,
    /// Untyped or object-typed field, zero value is null.
    Mixed,
}

impl FieldKind {
    /// Zero value for this kind.
    pub fn zero(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::Str => Value::Str(String::new()),
            Self::Array => Value::Array(Vec::new()),
            Self::Mixed => Value::Null,
        }
    }
}

/// Field descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// Declared default (part of the type's layout, not of its initializer).
    pub default: Option<Value>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Set declared default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Value a freshly allocated instance holds for this field.
    pub fn initial_value(&self) -> Value {
        self.default.clone().unwrap_or_else(|| self.kind.zero())
    }
}

/// Structural flags of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeFlags {
    /// Provided by the runtime rather than user code.
    pub builtin: bool,
    /// Cannot be extended.
    pub final_type: bool,
    /// Instances may be duplicated at all.
    pub cloneable: bool,
    /// The decoder may materialize instances of this type.
    pub deserializable: bool,
}

impl Default for TypeFlags {
    fn default() -> Self {
        Self {
            builtin: false,
            final_type: false,
            cloneable: true,
            deserializable: true,
        }
    }
}

/// A complete type descriptor.
pub struct TypeDescriptor {
    pub name: String,
    pub kind: TypeKind,
    pub parent: Option<Arc<TypeDescriptor>>,
    pub flags: TypeFlags,
    /// Fields declared on this type only (see [`TypeDescriptor::all_fields`]).
    pub fields: Vec<FieldDescriptor>,
    pub(crate) hooks: TypeHooks,
}

/// Errors from regular (initializer-running) construction.
#[derive(Debug)]
pub enum ConstructError {
    Abstract(String),
    ArityMismatch { expected: usize, got: usize },
    Initializer(HookFault),
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abstract(name) => write!(f, "Cannot instantiate abstract class {}", name),
            Self::ArityMismatch { expected, got } => write!(
                f,
                "Too few arguments: {} passed, {} expected",
                got, expected
            ),
            Self::Initializer(fault) => write!(f, "Initializer failed: {}", fault),
        }
    }
}

impl std::error::Error for ConstructError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Initializer(fault) => Some(fault),
            _ => None,
        }
    }
}

impl TypeDescriptor {
    /// Check if the type is abstract.
    pub fn is_abstract(&self) -> bool {
        self.kind == TypeKind::Abstract
    }

    pub fn is_builtin(&self) -> bool {
        self.flags.builtin
    }

    pub fn is_final(&self) -> bool {
        self.flags.final_type
    }

    /// This type followed by its parents, nearest first.
    pub fn ancestry(&self) -> Ancestry<'_> {
        Ancestry { next: Some(self) }
    }

    /// True when this type or any ancestor is a runtime builtin.
    pub fn has_builtin_ancestry(&self) -> bool {
        self.ancestry().any(TypeDescriptor::is_builtin)
    }

    /// True when `name` is this type or one of its ancestors.
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.ancestry().any(|t| t.name == name)
    }

    /// Declared fields including inherited ones, parents first. A field
    /// redeclared by a subtype replaces the inherited declaration in place.
    pub fn all_fields(&self) -> Vec<&FieldDescriptor> {
        let chain: Vec<&TypeDescriptor> = self.ancestry().collect();
        let mut fields: Vec<&FieldDescriptor> = Vec::new();
        for ty in chain.into_iter().rev() {
            for field in &ty.fields {
                match fields.iter_mut().find(|f| f.name == field.name) {
                    Some(slot) => *slot = field,
                    None => fields.push(field),
                }
            }
        }
        fields
    }

    /// Get field by name (inherited fields included).
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.ancestry()
            .find_map(|t| t.fields.iter().find(|f| f.name == name))
    }

    pub fn wakeup_hook(&self) -> Option<&Arc<WakeupFn>> {
        self.ancestry().find_map(|t| t.hooks.wakeup.as_ref())
    }

    pub fn unserialize_hook(&self) -> Option<&Arc<UnserializeFn>> {
        self.ancestry().find_map(|t| t.hooks.unserialize.as_ref())
    }

    pub fn clone_hook(&self) -> Option<&Arc<CloneFn>> {
        self.ancestry().find_map(|t| t.hooks.clone.as_ref())
    }

    pub fn initializer(&self) -> Option<&Initializer> {
        self.ancestry().find_map(|t| t.hooks.initializer.as_ref())
    }

    /// Implements the custom-serialization contract (directly or inherited).
    pub fn implements_serialization_contract(&self) -> bool {
        self.unserialize_hook().is_some()
    }

    /// Declares a custom duplication hook (directly or inherited).
    pub fn has_duplication_hook(&self) -> bool {
        self.clone_hook().is_some()
    }

    /// Every type in the chain allows duplication.
    pub fn is_cloneable(&self) -> bool {
        !self.is_abstract() && self.ancestry().all(|t| t.flags.cloneable)
    }

    /// An instance can be duplicated without running any user code.
    pub fn is_safe_to_clone(&self) -> bool {
        self.is_cloneable() && !self.has_duplication_hook()
    }

    /// Every type in the chain may be materialized by the decoder.
    pub fn is_deserializable(&self) -> bool {
        self.ancestry().all(|t| t.flags.deserializable)
    }

    /// Regular construction: allocate, then run the initializer with `args`.
    ///
    /// This is what the instantiation engine exists to avoid; it is provided
    /// for callers that do want initializer semantics.
    pub fn construct(self: &Arc<Self>, args: &[Value]) -> Result<Instance, ConstructError> {
        if self.is_abstract() {
            return Err(ConstructError::Abstract(self.name.clone()));
        }
        let mut instance = Instance::allocate(self);
        if let Some(init) = self.initializer() {
            if args.len() < init.arity {
                return Err(ConstructError::ArityMismatch {
                    expected: init.arity,
                    got: args.len(),
                });
            }
            (init.body)(&mut instance, args).map_err(ConstructError::Initializer)?;
        }
        Ok(instance)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent.as_ref().map(|p| p.name.as_str()))
            .field("flags", &self.flags)
            .field("fields", &self.fields)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Iterator over a type and its ancestors.
pub struct Ancestry<'a> {
    next: Option<&'a TypeDescriptor>,
}

impl<'a> Iterator for Ancestry<'a> {
    type Item = &'a TypeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}

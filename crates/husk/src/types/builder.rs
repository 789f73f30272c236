// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.

use crate::types::hooks::{HookContext, HookFault, Initializer, TypeHooks};
use crate::types::{
    FieldDescriptor, FieldKind, Instance, TypeDescriptor, TypeFlags, TypeKind, Value,
};
use std::sync::Arc;

/// Builder for creating TypeDescriptor instances.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    kind: TypeKind,
    parent: Option<Arc<TypeDescriptor>>,
    flags: TypeFlags,
    fields: Vec<FieldDescriptor>,
    hooks: TypeHooks,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for a concrete type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Concrete,
            parent: None,
            flags: TypeFlags::default(),
            fields: Vec::new(),
            hooks: TypeHooks::default(),
        }
    }

    /// Add a field holding its kind's zero value.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDescriptor::new(name, kind));
        self
    }

    /// Add a field with a declared default.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        default: impl Into<Value>,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, kind).with_default(default));
        self
    }

    /// Derive from `parent`.
    pub fn extends(mut self, parent: &Arc<TypeDescriptor>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.kind = TypeKind::Abstract;
        self
    }

    pub fn final_type(mut self) -> Self {
        self.flags.final_type = true;
        self
    }

    /// Mark as provided by the runtime.
    pub fn builtin(mut self) -> Self {
        self.flags.builtin = true;
        self
    }

    pub fn not_cloneable(mut self) -> Self {
        self.flags.cloneable = false;
        self
    }

    /// Forbid the decoder from materializing this type.
    pub fn forbid_deserialization(mut self) -> Self {
        self.flags.deserializable = false;
        self
    }

    /// Declare an initializer requiring `arity` arguments.
    pub fn initializer<F>(mut self, arity: usize, body: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> Result<(), HookFault> + Send + Sync + 'static,
    {
        self.hooks.initializer = Some(Initializer {
            arity,
            body: Arc::new(body),
        });
        self
    }

    /// Declare a wake-up hook.
    ///
    /// # Hook constraints
    ///
    /// When a type is built through the decoder, the first request runs its
    /// wake-up and unserialize hooks while the owning engine's strategy cache
    /// holds its write lock. Until the hook returns, no other thread can look
    /// up any type on that engine. A hook must therefore stay short and must
    /// not block on another thread that instantiates through the same engine:
    /// that wait never ends. Calling the same engine from the hook's own
    /// thread fails fast with `InstantiationError::Reentrant`. Other engines
    /// are unaffected.
    pub fn on_wakeup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Instance, &mut HookContext<'_>) -> Result<(), HookFault> + Send + Sync + 'static,
    {
        self.hooks.wakeup = Some(Arc::new(hook));
        self
    }

    /// Implement the custom-serialization contract.
    ///
    /// Subject to the same constraints as [`on_wakeup`](Self::on_wakeup).
    pub fn on_unserialize<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Instance, &str, &mut HookContext<'_>) -> Result<(), HookFault>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.unserialize = Some(Arc::new(hook));
        self
    }

    /// Declare a custom duplication hook.
    pub fn on_clone<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Instance) + Send + Sync + 'static,
    {
        self.hooks.clone = Some(Arc::new(hook));
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            name: self.name,
            kind: self.kind,
            parent: self.parent,
            flags: self.flags,
            fields: self.fields,
            hooks: self.hooks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_flags_and_fields() {
        let desc = TypeDescriptorBuilder::new("Money")
            .field("amount", FieldKind::Int)
            .field_with_default("currency", FieldKind::Str, "EUR")
            .final_type()
            .build();

        assert_eq!(desc.name, "Money");
        assert!(desc.is_final());
        assert!(!desc.is_abstract());
        assert!(!desc.is_builtin());
        assert_eq!(desc.fields.len(), 2);
        assert_eq!(
            desc.field("currency").map(FieldDescriptor::initial_value),
            Some(Value::from("EUR"))
        );
    }

    #[test]
    fn test_hooks_are_inherited() {
        let base = Arc::new(
            TypeDescriptorBuilder::new("Base")
                .on_wakeup(|_, _| Ok(()))
                .on_clone(|_| {})
                .on_unserialize(|_, _, _| Ok(()))
                .build(),
        );
        let child = TypeDescriptorBuilder::new("Child").extends(&base).build();

        assert!(child.wakeup_hook().is_some());
        assert!(child.has_duplication_hook());
        assert!(child.implements_serialization_contract());
        assert!(!child.is_safe_to_clone());
        assert!(child.is_subtype_of("Base"));
        assert!(!base.is_subtype_of("Child"));
    }

    #[test]
    fn test_inherited_fields_parent_first_with_override() {
        let base = Arc::new(
            TypeDescriptorBuilder::new("Base")
                .field("id", FieldKind::Int)
                .field("label", FieldKind::Str)
                .build(),
        );
        let child = TypeDescriptorBuilder::new("Child")
            .extends(&base)
            .field_with_default("label", FieldKind::Str, "child")
            .field("extra", FieldKind::Bool)
            .build();

        let names: Vec<&str> = child.all_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "label", "extra"]);
        assert_eq!(
            child.field("label").and_then(|f| f.default.clone()),
            Some(Value::from("child"))
        );
    }

    #[test]
    fn test_not_cloneable_propagates_to_subtypes() {
        let base = Arc::new(TypeDescriptorBuilder::new("Handle").not_cloneable().build());
        let child = TypeDescriptorBuilder::new("FileHandle").extends(&base).build();
        assert!(!child.is_cloneable());
        assert!(!child.is_safe_to_clone());
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instance container for dynamic objects.

use crate::types::{TypeDescriptor, Value};
use std::fmt;
use std::sync::Arc;

/// Errors for Instance field access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    FieldNotFound { type_name: String, field: String },
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFound { type_name, field } => {
                write!(f, "Undefined property: {}::${}", type_name, field)
            }
        }
    }
}

impl std::error::Error for InstanceError {}

/// An object of a registered type.
///
/// `Clone` is a structural copy: field values are duplicated and no
/// duplication hook declared by the type runs.
#[derive(Clone)]
pub struct Instance {
    descriptor: Arc<TypeDescriptor>,
    /// Declared fields in declaration order, then dynamic ones.
    fields: Vec<(String, Value)>,
}

impl Instance {
    /// Allocate an instance holding zero/declared-default values.
    ///
    /// Runs no initializer and no hook, for this type or any ancestor.
    pub(crate) fn allocate(descriptor: &Arc<TypeDescriptor>) -> Self {
        let fields = descriptor
            .all_fields()
            .into_iter()
            .map(|f| (f.name.clone(), f.initial_value()))
            .collect();
        Self {
            descriptor: Arc::clone(descriptor),
            fields,
        }
    }

    /// Get the type descriptor.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Get the type name.
    pub fn type_name(&self) -> &str {
        &self.descriptor.name
    }

    /// True when the instance's type is `name` or derives from it.
    pub fn is_instance_of(&self, name: &str) -> bool {
        self.descriptor.is_subtype_of(name)
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Result<&Value, InstanceError> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| self.not_found(name))
    }

    /// Set a declared field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), InstanceError> {
        if self.descriptor.field(name).is_none() {
            return Err(self.not_found(name));
        }
        self.set_property(name, value.into());
        Ok(())
    }

    /// Set a field, adding it as a dynamic property when undeclared.
    pub(crate) fn set_property(&mut self, name: &str, value: Value) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Iterate over fields.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn not_found(&self, field: &str) -> InstanceError {
        InstanceError::FieldNotFound {
            type_name: self.descriptor.name.clone(),
            field: field.to_string(),
        }
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.name == other.descriptor.name && self.fields == other.fields
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(&self.descriptor.name);
        for (name, value) in &self.fields {
            s.field(name, value);
        }
        s.finish()
    }
}

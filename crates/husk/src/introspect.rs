// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type introspection.
//!
//! Resolving a name never runs any code belonging to the type.

use crate::error::InstantiationError;
use crate::types::{TypeDescriptor, TypeRegistry};
use crate::Result;
use std::sync::Arc;

/// Resolve `type_name` to an instantiable descriptor.
///
/// Fails with `UnknownType` when nothing is registered under the name and
/// with `NotInstantiable` when the type is abstract.
pub fn resolve(registry: &TypeRegistry, type_name: &str) -> Result<Arc<TypeDescriptor>> {
    let descriptor = registry
        .get(type_name)
        .ok_or_else(|| InstantiationError::unknown(type_name))?;

    if descriptor.is_abstract() {
        return Err(InstantiationError::abstract_type(type_name));
    }
    Ok(descriptor)
}

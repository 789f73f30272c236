// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic object model.
//!
//! # Features
//!
//! - **TypeDescriptor**: runtime type description (fields, ancestry, flags, hooks)
//! - **Instance**: type-erased object with field access
//! - **Builder API**: fluent interface for building type descriptors
//! - **TypeRegistry**: concurrent table of loaded types, with the runtime builtins
//!
//! # Example
//!
//! ```rust
//! use husk::types::{FieldKind, TypeDescriptorBuilder, TypeRegistry, Value};
//!
//! let registry = TypeRegistry::new();
//! let point = registry
//!     .register(
//!         TypeDescriptorBuilder::new("Point")
//!             .field("x", FieldKind::Int)
//!             .field("y", FieldKind::Int)
//!             .initializer(2, |this, args| {
//!                 this.set("x", args[0].clone()).map_err(husk::types::HookFault::from_error)?;
//!                 this.set("y", args[1].clone()).map_err(husk::types::HookFault::from_error)
//!             })
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let p = point.construct(&[Value::Int(3), Value::Int(4)]).unwrap();
//! assert_eq!(p.get("x").unwrap(), &Value::Int(3));
//! ```

mod builder;
mod builtins;
mod descriptor;
mod hooks;
mod instance;
mod registry;
mod value;

pub use builder::TypeDescriptorBuilder;
pub use descriptor::{
    Ancestry, ConstructError, FieldDescriptor, FieldKind, TypeDescriptor, TypeFlags, TypeKind,
};
pub use hooks::{
    CloneFn, HookContext, HookFault, Initializer, InitializerFn, TypeHooks, UnserializeFn,
    WakeupFn,
};
pub use instance::{Instance, InstanceError};
pub use registry::{RegistryError, TypeRegistry};
pub use value::{ArrayKey, Value};

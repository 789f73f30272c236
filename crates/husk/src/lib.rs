// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # husk
//!
//! Constructor-bypassing instantiation for a dynamic object model.
//!
//! Given the name of a registered type, [`Instantiator`] hands back a fully
//! allocated instance whose fields hold their zero (or declared default)
//! values, without running the type's initializer. Such "husks" are what a
//! hydration or data-mapping layer fills in afterwards.
//!
//! Two strategies are available, picked per type from the emulated runtime's
//! capability table:
//!
//! - **Direct allocation**: allocate and zero the fields; no code runs.
//! - **Serialization roundtrip**: decode a synthesized empty-object string,
//!   with any notice, warning or hook failure turned into an error.
//!
//! The chosen procedure is cached per type, and types that can be duplicated
//! without user code are afterwards served by copying a retained template.
//!
//! ## Quick Start
//!
//! ```rust
//! use husk::types::{FieldKind, TypeDescriptorBuilder, TypeRegistry, Value};
//! use husk::{EngineConfig, Instantiate, Instantiator};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry
//!     .register(
//!         TypeDescriptorBuilder::new("Point")
//!             .field("x", FieldKind::Int)
//!             .field("y", FieldKind::Int)
//!             .initializer(2, |_, _| panic!("never runs"))
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let engine = Instantiator::new(registry, EngineConfig::default());
//! let point = engine.instantiate("Point").unwrap();
//! assert_eq!(point.get("x").unwrap(), &Value::Int(0));
//! assert!(engine.instantiate("Ghost").is_err());
//! ```
//!
//! ## Modules
//!
//! - [`types`]: type descriptors, instances, values and the type registry
//! - [`runtime`]: runtime versions and their capability profile
//! - [`serial`]: empty-object encoding, the generic decoder and the diagnostic trap
//! - [`strategy`]: direct allocation and serialization roundtrip procedures
//! - [`cache`]: strategy and clone-template caches
//! - [`config`]: engine configuration and constants

pub mod cache;
pub mod config;
mod engine;
mod error;
pub mod introspect;
pub mod runtime;
pub mod serial;
pub mod strategy;
pub mod types;

pub use config::{ConfigError, EngineConfig};
pub use engine::{Instantiate, Instantiator};
pub use error::{InstantiationError, NotInstantiableReason};
pub use runtime::{ConstructionCapability, RuntimeProfile, RuntimeVersion, SerializationQuirk};
pub use strategy::{ConstructionProcedure, StrategyKind};
pub use types::{Instance, TypeDescriptor, TypeRegistry, Value};

/// Result alias for instantiation operations.
pub type Result<T> = std::result::Result<T, InstantiationError>;

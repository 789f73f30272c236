// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Construction strategies.
//!
//! A type is built either by [`direct`] allocation, when the runtime
//! capability allows it, or by a [`roundtrip`] through the serialized-value
//! decoder. Either way the result is a [`ConstructionProcedure`]: a
//! zero-argument callable that is built once per type and invoked many times.

pub mod direct;
pub mod roundtrip;

use crate::runtime::RuntimeProfile;
use crate::types::{Instance, TypeDescriptor, TypeRegistry};
use crate::Result;
use std::fmt;
use std::sync::Arc;

/// Technique a procedure uses to produce instances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    DirectAllocation,
    SerializationRoundtrip,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectAllocation => write!(f, "direct allocation"),
            Self::SerializationRoundtrip => write!(f, "serialization roundtrip"),
        }
    }
}

type ProcedureFn = dyn Fn() -> Result<Instance> + Send + Sync;

/// Zero-argument instance factory for one type.
pub struct ConstructionProcedure {
    descriptor: Arc<TypeDescriptor>,
    kind: StrategyKind,
    body: Box<ProcedureFn>,
}

impl ConstructionProcedure {
    pub(crate) fn new<F>(descriptor: Arc<TypeDescriptor>, kind: StrategyKind, body: F) -> Self
    where
        F: Fn() -> Result<Instance> + Send + Sync + 'static,
    {
        Self {
            descriptor,
            kind,
            body: Box::new(body),
        }
    }

    /// Produce a new instance.
    pub fn invoke(&self) -> Result<Instance> {
        (self.body)()
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn type_name(&self) -> &str {
        &self.descriptor.name
    }
}

impl fmt::Debug for ConstructionProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructionProcedure")
            .field("type_name", &self.descriptor.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Choose the strategy for `descriptor` and build its procedure.
///
/// Direct allocation is preferred whenever the runtime capability allows it.
pub fn build(
    registry: &Arc<TypeRegistry>,
    profile: RuntimeProfile,
    descriptor: Arc<TypeDescriptor>,
) -> Result<ConstructionProcedure> {
    if direct::is_eligible(&descriptor, profile.capability) {
        log::debug!("[strategy] '{}' -> {}", descriptor.name, StrategyKind::DirectAllocation);
        Ok(direct::procedure(descriptor))
    } else {
        log::debug!(
            "[strategy] '{}' -> {} (runtime {})",
            descriptor.name,
            StrategyKind::SerializationRoundtrip,
            profile.version
        );
        roundtrip::procedure(Arc::clone(registry), profile, descriptor)
    }
}

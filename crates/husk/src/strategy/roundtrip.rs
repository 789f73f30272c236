// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization roundtrip: decode a synthesized empty-object string.
//!
//! Every decode runs inside its own [`DiagnosticTrap`]. The outcome is mapped
//! as follows, first match wins:
//!
//! | Decode outcome                         | Result                            |
//! |----------------------------------------|-----------------------------------|
//! | fault raised (hook error, hook panic)  | `DeserializationTriggeredFailure` |
//! | any diagnostic captured by the trap    | `UncleanDeserialization`          |
//! | an object                              | `Ok(instance)`                    |
//! | anything else                          | `UncleanDeserialization`          |

use crate::error::InstantiationError;
use crate::runtime::RuntimeProfile;
use crate::serial::{decode, encode_empty, select_marker, DecodeError, DiagnosticTrap, SourceLocation};
use crate::strategy::{ConstructionProcedure, StrategyKind};
use crate::types::{Instance, TypeDescriptor, TypeRegistry, Value};
use crate::Result;
use std::sync::Arc;

/// Build the roundtrip procedure for `descriptor`.
///
/// A trial decode runs first; if it fails, its error is returned and no
/// procedure is produced.
pub fn procedure(
    registry: Arc<TypeRegistry>,
    profile: RuntimeProfile,
    descriptor: Arc<TypeDescriptor>,
) -> Result<ConstructionProcedure> {
    let marker = select_marker(&profile, &descriptor);
    let encoded = encode_empty(marker, &descriptor.name);
    log::debug!("[roundtrip] '{}' encoded as {}", descriptor.name, encoded);

    decode_trapped(&registry, profile, &descriptor, &encoded)?;

    let target = Arc::clone(&descriptor);
    Ok(ConstructionProcedure::new(
        descriptor,
        StrategyKind::SerializationRoundtrip,
        move || decode_trapped(&registry, profile, &target, &encoded),
    ))
}

/// Decode `encoded` under a fresh trap and map the outcome to an instance.
pub fn decode_trapped(
    registry: &TypeRegistry,
    profile: RuntimeProfile,
    descriptor: &Arc<TypeDescriptor>,
    encoded: &str,
) -> Result<Instance> {
    let trap = DiagnosticTrap::install();
    let outcome = decode(registry, profile, encoded);
    let captured = trap.finish();

    match (outcome, captured) {
        (Err(DecodeError::Raised { fault, .. }), _) => {
            log::debug!("[roundtrip] '{}' faulted: {}", descriptor.name, fault);
            Err(InstantiationError::DeserializationTriggeredFailure {
                descriptor: Arc::clone(descriptor),
                cause: fault,
            })
        }
        (_, Some(diagnostic)) => {
            log::debug!("[roundtrip] '{}' trapped {}", descriptor.name, diagnostic);
            Err(InstantiationError::UncleanDeserialization {
                descriptor: Arc::clone(descriptor),
                message: diagnostic.message,
                location: diagnostic.location,
            })
        }
        (Ok(Value::Object(instance)), None) => Ok(*instance),
        (Ok(other), None) => Err(InstantiationError::UncleanDeserialization {
            descriptor: Arc::clone(descriptor),
            message: format!("decoder produced {} instead of an object", other.kind_name()),
            location: SourceLocation::here(),
        }),
        (Err(err), None) => Err(InstantiationError::UncleanDeserialization {
            descriptor: Arc::clone(descriptor),
            message: err.to_string(),
            location: SourceLocation::here(),
        }),
    }
}

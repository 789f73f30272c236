// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instantiation error taxonomy.

use crate::serial::SourceLocation;
use crate::types::{HookFault, TypeDescriptor};
use std::fmt;
use std::sync::Arc;

/// Why a known type cannot be instantiated at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotInstantiableReason {
    Abstract,
}

impl fmt::Display for NotInstantiableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abstract => write!(f, "abstract"),
        }
    }
}

/// Errors returned by [`Instantiate::instantiate`](crate::Instantiate::instantiate).
#[derive(Debug)]
pub enum InstantiationError {
    /// No type is registered under this name.
    UnknownType { type_name: String },
    /// The type is registered but can never be instantiated.
    NotInstantiable {
        type_name: String,
        reason: NotInstantiableReason,
    },
    /// The roundtrip decode raised a notice, warning or deprecation.
    UncleanDeserialization {
        descriptor: Arc<TypeDescriptor>,
        message: String,
        location: SourceLocation,
    },
    /// A hook (or the decoder itself) faulted while materializing the type.
    DeserializationTriggeredFailure {
        descriptor: Arc<TypeDescriptor>,
        cause: HookFault,
    },
    /// `instantiate` was re-entered from a hook on the same thread.
    Reentrant { type_name: String },
}

impl InstantiationError {
    /// Name of the type the failed request was for.
    pub fn type_name(&self) -> &str {
        match self {
            Self::UnknownType { type_name }
            | Self::NotInstantiable { type_name, .. }
            | Self::Reentrant { type_name } => type_name,
            Self::UncleanDeserialization { descriptor, .. }
            | Self::DeserializationTriggeredFailure { descriptor, .. } => &descriptor.name,
        }
    }

    /// Descriptor of the offending type, for decode-time errors.
    pub fn descriptor(&self) -> Option<&Arc<TypeDescriptor>> {
        match self {
            Self::UncleanDeserialization { descriptor, .. }
            | Self::DeserializationTriggeredFailure { descriptor, .. } => Some(descriptor),
            _ => None,
        }
    }

    pub(crate) fn unknown(type_name: &str) -> Self {
        Self::UnknownType {
            type_name: type_name.to_string(),
        }
    }

    pub(crate) fn abstract_type(type_name: &str) -> Self {
        Self::NotInstantiable {
            type_name: type_name.to_string(),
            reason: NotInstantiableReason::Abstract,
        }
    }
}

impl fmt::Display for InstantiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { type_name } => {
                write!(f, "The provided class \"{}\" does not exist", type_name)
            }
            Self::NotInstantiable { type_name, reason } => write!(
                f,
                "The provided class \"{}\" is {} and can not be instantiated",
                type_name, reason
            ),
            Self::UncleanDeserialization {
                descriptor,
                message,
                location,
            } => write!(
                f,
                "Could not produce an instance of \"{}\" via unserialization, since an error \
                 was triggered in file \"{}\" at line \"{}\": {}",
                descriptor.name, location.file, location.line, message
            ),
            Self::DeserializationTriggeredFailure { descriptor, cause } => write!(
                f,
                "An exception was raised while trying to instantiate an instance of \"{}\" \
                 via un-serialization: {}",
                descriptor.name, cause
            ),
            Self::Reentrant { type_name } => write!(
                f,
                "Instantiation of \"{}\" was requested while another instantiation is in \
                 progress on this thread",
                type_name
            ),
        }
    }
}

impl std::error::Error for InstantiationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DeserializationTriggeredFailure { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDescriptorBuilder;
    use std::error::Error as _;

    #[test]
    fn test_messages_name_the_type() {
        let err = InstantiationError::unknown("Ghost");
        assert_eq!(err.to_string(), "The provided class \"Ghost\" does not exist");
        assert_eq!(err.type_name(), "Ghost");

        let err = InstantiationError::abstract_type("AbstractShape");
        assert!(err.to_string().contains("is abstract"));
        assert!(err.descriptor().is_none());
    }

    #[test]
    fn test_failure_exposes_cause() {
        let descriptor = Arc::new(TypeDescriptorBuilder::new("Thrower").build());
        let err = InstantiationError::DeserializationTriggeredFailure {
            descriptor,
            cause: HookFault::new("boom"),
        };
        assert_eq!(err.type_name(), "Thrower");
        assert_eq!(err.source().map(|e| e.to_string()), Some("boom".to_string()));
    }
}

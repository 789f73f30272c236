// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! User code attached to a type.
//!
//! Hooks are plain closures. The engine never runs a type's initializer or
//! duplication hook; the decoder runs wake-up and unserialize hooks, which is
//! why their failures are trapped (see [`crate::serial::trap`]).

use crate::serial::trap::{self, Diagnostic, Severity, SourceLocation};
use crate::types::{Instance, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Wake-up hook, run by the decoder after an object's fields are restored.
pub type WakeupFn = dyn Fn(&mut Instance, &mut HookContext<'_>) -> Result<(), HookFault> + Send + Sync;

/// Custom deserialization hook (`C` marker), receives the raw payload.
pub type UnserializeFn =
    dyn Fn(&mut Instance, &str, &mut HookContext<'_>) -> Result<(), HookFault> + Send + Sync;

/// Custom duplication hook. Never invoked by the engine.
pub type CloneFn = dyn Fn(&mut Instance) + Send + Sync;

/// User initializer body.
pub type InitializerFn = dyn Fn(&mut Instance, &[Value]) -> Result<(), HookFault> + Send + Sync;

/// Initializer with its required argument count.
#[derive(Clone)]
pub struct Initializer {
    pub arity: usize,
    pub body: Arc<InitializerFn>,
}

/// Hooks declared directly on one type (inheritance is resolved by the
/// descriptor).
#[derive(Clone, Default)]
pub struct TypeHooks {
    pub wakeup: Option<Arc<WakeupFn>>,
    pub unserialize: Option<Arc<UnserializeFn>>,
    pub clone: Option<Arc<CloneFn>>,
    pub initializer: Option<Initializer>,
}

impl fmt::Debug for TypeHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHooks")
            .field("wakeup", &self.wakeup.is_some())
            .field("unserialize", &self.unserialize.is_some())
            .field("clone", &self.clone.is_some())
            .field("initializer", &self.initializer.as_ref().map(|i| i.arity))
            .finish()
    }
}

/// Handle given to hooks for raising non-fatal diagnostics.
pub struct HookContext<'a> {
    type_name: &'a str,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(type_name: &'a str) -> Self {
        Self { type_name }
    }

    /// Name of the type whose hook is running.
    pub fn type_name(&self) -> &str {
        self.type_name
    }

    #[track_caller]
    pub fn notice(&mut self, message: impl Into<String>) {
        self.raise(Severity::Notice, message.into(), SourceLocation::here());
    }

    #[track_caller]
    pub fn warn(&mut self, message: impl Into<String>) {
        self.raise(Severity::Warning, message.into(), SourceLocation::here());
    }

    #[track_caller]
    pub fn deprecated(&mut self, message: impl Into<String>) {
        self.raise(Severity::Deprecated, message.into(), SourceLocation::here());
    }

    fn raise(&mut self, severity: Severity, message: String, location: SourceLocation) {
        trap::raise(Diagnostic::new(severity, message, location));
    }
}

/// Failure reported by a hook, either returned or caught from a panic.
#[derive(Debug)]
pub struct HookFault {
    message: String,
    panicked: bool,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HookFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            panicked: false,
            source: None,
        }
    }

    /// Wrap an arbitrary error raised inside a hook.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            panicked: false,
            source: Some(Box::new(error)),
        }
    }

    pub(crate) fn panicked(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "hook panicked".to_string()
        };
        Self {
            message,
            panicked: true,
            source: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when the fault was a caught panic rather than a returned error.
    pub fn is_panic(&self) -> bool {
        self.panicked
    }
}

impl fmt::Display for HookFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.panicked {
            write!(f, "hook panicked: {}", self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for HookFault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug)]
    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "broken invariant")
        }
    }

    impl std::error::Error for Broken {}

    #[test]
    fn test_fault_from_error_keeps_source() {
        let fault = HookFault::from_error(Broken);
        assert_eq!(fault.message(), "broken invariant");
        assert!(!fault.is_panic());
        assert!(fault.source().is_some());
    }

    #[test]
    fn test_fault_from_panic_payload() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let fault = HookFault::panicked(payload.as_ref());
        assert!(fault.is_panic());
        assert_eq!(fault.to_string(), "hook panicked: boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(HookFault::panicked(payload.as_ref()).message(), "owned boom");
    }
}

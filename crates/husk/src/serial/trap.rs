// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scoped diagnostic trap.
//!
//! The decoder and the hooks it runs report non-fatal problems through
//! [`raise`]. Without a trap installed on the current thread those diagnostics
//! are only logged. While a [`DiagnosticTrap`] is alive they are captured
//! instead, so a single decode attempt can turn them into an error value.
//!
//! The trap is thread-local and restored by `Drop`, including during unwind:
//! it never outlives the scope that installed it.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::panic::Location;

/// Severity of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Notice,
    Warning,
    Deprecated,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notice => write!(f, "Notice"),
            Self::Warning => write!(f, "Warning"),
            Self::Deprecated => write!(f, "Deprecated"),
        }
    }
}

/// Where a diagnostic was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Location of the caller (propagates through `#[track_caller]` frames).
    #[track_caller]
    pub fn here() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(loc: &'static Location<'static>) -> Self {
        Self {
            file: loc.file(),
            line: loc.line(),
            column: loc.column(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A non-fatal diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            severity,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} in {}", self.severity, self.message, self.location)
    }
}

#[derive(Default)]
struct TrapState {
    captured: Option<Diagnostic>,
}

thread_local! {
    static ACTIVE_TRAP: RefCell<Option<TrapState>> = const { RefCell::new(None) };
}

/// Report a diagnostic to the active trap, or log it when none is installed.
pub fn raise(diagnostic: Diagnostic) {
    let unhandled = ACTIVE_TRAP.with(|slot| match slot.borrow_mut().as_mut() {
        Some(state) => {
            // Last diagnostic wins, matching a handler that overwrites its capture.
            state.captured = Some(diagnostic);
            None
        }
        None => Some(diagnostic),
    });

    if let Some(diagnostic) = unhandled {
        log::warn!("[decoder] {}", diagnostic);
    }
}

/// True when a trap is installed on the current thread.
pub fn is_active() -> bool {
    ACTIVE_TRAP.with(|slot| slot.borrow().is_some())
}

/// RAII guard capturing diagnostics raised on this thread.
///
/// Not `Send`: the trap belongs to the thread that installed it.
pub struct DiagnosticTrap {
    previous: Option<TrapState>,
    _thread_bound: PhantomData<*const ()>,
}

impl DiagnosticTrap {
    /// Install a fresh trap, remembering whatever was installed before.
    #[must_use = "the trap is removed as soon as the guard is dropped"]
    pub fn install() -> Self {
        let previous = ACTIVE_TRAP.with(|slot| slot.borrow_mut().replace(TrapState::default()));
        Self {
            previous,
            _thread_bound: PhantomData,
        }
    }

    /// Remove the trap and return the captured diagnostic, if any.
    pub fn finish(self) -> Option<Diagnostic> {
        ACTIVE_TRAP.with(|slot| {
            slot.borrow_mut()
                .as_mut()
                .and_then(|state| state.captured.take())
        })
        // `self` drops here and restores the previous state.
    }
}

impl Drop for DiagnosticTrap {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE_TRAP.with(|slot| *slot.borrow_mut() = previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trap_captures_and_restores() {
        assert!(!is_active());
        let trap = DiagnosticTrap::install();
        assert!(is_active());
        raise(Diagnostic::new(Severity::Notice, "first", SourceLocation::here()));
        raise(Diagnostic::new(Severity::Warning, "second", SourceLocation::here()));
        let captured = trap.finish().expect("captured");
        assert_eq!(captured.message, "second");
        assert_eq!(captured.severity, Severity::Warning);
        assert!(!is_active());
    }

    #[test]
    fn test_nested_trap_restores_outer() {
        let outer = DiagnosticTrap::install();
        {
            let inner = DiagnosticTrap::install();
            raise(Diagnostic::new(Severity::Notice, "inner", SourceLocation::here()));
            assert_eq!(inner.finish().map(|d| d.message), Some("inner".to_string()));
        }
        assert!(is_active());
        assert!(outer.finish().is_none());
        assert!(!is_active());
    }

    #[test]
    fn test_trap_removed_on_unwind() {
        let result = std::panic::catch_unwind(|| {
            let _trap = DiagnosticTrap::install();
            panic!("unwinding through an installed trap");
        });
        assert!(result.is_err());
        assert!(!is_active());
    }

    #[test]
    fn test_location_points_at_caller() {
        let loc = SourceLocation::here();
        assert!(loc.file.ends_with("trap.rs"));
        assert!(loc.line > 0);
    }
}

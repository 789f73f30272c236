// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic decoder for the serialized value format.
//!
//! Grammar:
//!
//! ```text
//! N;                                    null
//! b:<0|1>;                              bool
//! i:<int>;                              integer
//! d:<float>;                            float
//! s:<len>:"<bytes>";                    string (len in bytes)
//! a:<count>:{<key><value>...}           ordered array, keys are i or s
//! O:<len>:"<class>":<count>:{<name><value>...}
//! C:<len>:"<class>":<len>:{<payload>}
//! ```
//!
//! Objects are allocated without running their initializer. An `O` object
//! then runs its wake-up hook; a `C` object hands its payload to the type's
//! unserialize hook. Nesting of arrays and objects is limited to
//! [`MAX_DECODE_DEPTH`] levels; deeper input is treated as malformed.
//! Soft problems are reported through
//! [`trap::raise`](crate::serial::trap::raise), hard ones are returned.

use crate::config::MAX_DECODE_DEPTH;
use crate::runtime::{RuntimeProfile, SerializationQuirk};
use crate::serial::trap::{self, Diagnostic, Severity, SourceLocation};
use crate::types::{
    ArrayKey, HookContext, HookFault, Instance, TypeDescriptor, TypeRegistry, Value,
};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Errors for decode operations.
#[derive(Debug)]
pub enum DecodeError {
    /// Input does not follow the grammar.
    Malformed { offset: usize, length: usize },
    /// Class name not registered.
    UnknownClass(String),
    /// Class known but the marker/format is refused for it.
    Rejected { class: String, reason: String },
    /// A fault was raised while materializing `class` (by the decoder or a hook).
    Raised { class: String, fault: HookFault },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { offset, length } => {
                write!(f, "Error at offset {} of {} bytes", offset, length)
            }
            Self::UnknownClass(name) => write!(f, "Class '{}' not found", name),
            Self::Rejected { reason, .. } => write!(f, "{}", reason),
            Self::Raised { class, fault } => {
                write!(f, "Fault while unserializing '{}': {}", class, fault)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Raised { fault, .. } => Some(fault),
            _ => None,
        }
    }
}

/// Decode `input` against `registry` with the quirks of `profile`.
pub fn decode(
    registry: &TypeRegistry,
    profile: RuntimeProfile,
    input: &str,
) -> Result<Value, DecodeError> {
    Decoder::new(registry, profile, input).decode()
}

/// Single-use decoder over one input string.
pub struct Decoder<'a> {
    registry: &'a TypeRegistry,
    profile: RuntimeProfile,
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(registry: &'a TypeRegistry, profile: RuntimeProfile, input: &'a str) -> Self {
        Self {
            registry,
            profile,
            input: input.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    /// Decode exactly one value spanning the whole input.
    pub fn decode(mut self) -> Result<Value, DecodeError> {
        let value = self.value()?;
        if self.pos != self.input.len() {
            return Err(self.malformed());
        }
        Ok(value)
    }

    fn value(&mut self) -> Result<Value, DecodeError> {
        let tag = self.peek().ok_or_else(|| self.malformed())?;
        match tag {
            b'N' => {
                self.expect(b"N;")?;
                Ok(Value::Null)
            }
            b'b' => {
                self.expect(b"b:")?;
                match self.read_int(b';')? {
                    0 => Ok(Value::Bool(false)),
                    1 => Ok(Value::Bool(true)),
                    _ => Err(self.malformed()),
                }
            }
            b'i' => {
                self.expect(b"i:")?;
                Ok(Value::Int(self.read_int(b';')?))
            }
            b'd' => {
                self.expect(b"d:")?;
                let raw = self.read_until(b';')?;
                raw.parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| self.malformed())
            }
            b's' => {
                self.expect(b"s:")?;
                let len = self.read_len(b':')?;
                let s = self.read_quoted(len)?;
                self.expect(b";")?;
                Ok(Value::Str(s))
            }
            b'a' | b'O' => {
                if self.depth >= MAX_DECODE_DEPTH {
                    return Err(self.malformed());
                }
                self.depth += 1;
                let nested = if tag == b'a' {
                    self.array()
                } else {
                    self.object()
                };
                self.depth -= 1;
                nested
            }
            b'C' => self.custom_object(),
            _ => Err(self.malformed()),
        }
    }

    fn array(&mut self) -> Result<Value, DecodeError> {
        self.expect(b"a:")?;
        let count = self.read_len(b':')?;
        self.expect(b"{")?;
        let mut entries = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let key = match self.value()? {
                Value::Int(i) => ArrayKey::Int(i),
                Value::Str(s) => ArrayKey::Str(s),
                _ => return Err(self.malformed()),
            };
            let value = self.value()?;
            entries.push((key, value));
        }
        self.expect(b"}")?;
        Ok(Value::Array(entries))
    }

    fn object(&mut self) -> Result<Value, DecodeError> {
        self.expect(b"O:")?;
        let name_len = self.read_len(b':')?;
        let name = self.read_quoted(name_len)?;
        self.expect(b":")?;
        let descriptor = self.resolve_class(&name)?;

        if self.profile.quirk == SerializationQuirk::BrokenSerializableEncoder
            && descriptor.implements_serialization_contract()
        {
            let reason = format!("Erroneous data format for unserializing '{}'", name);
            self.warn(reason.clone());
            return Err(DecodeError::Rejected {
                class: name,
                reason,
            });
        }

        let count = self.read_len(b':')?;
        self.expect(b"{")?;
        let mut instance = Instance::allocate(&descriptor);
        for _ in 0..count {
            let key = match self.value()? {
                Value::Str(s) => s,
                Value::Int(i) => i.to_string(),
                _ => return Err(self.malformed()),
            };
            let value = self.value()?;
            instance.set_property(&key, value);
        }
        self.expect(b"}")?;

        if let Some(hook) = descriptor.wakeup_hook() {
            run_hook(&name, || hook(&mut instance, &mut HookContext::new(&name)))?;
        }
        Ok(Value::Object(Box::new(instance)))
    }

    fn custom_object(&mut self) -> Result<Value, DecodeError> {
        self.expect(b"C:")?;
        let name_len = self.read_len(b':')?;
        let name = self.read_quoted(name_len)?;
        self.expect(b":")?;
        let payload_len = self.read_len(b':')?;
        self.expect(b"{")?;
        let payload = self.read_bytes(payload_len)?;
        self.expect(b"}")?;
        let descriptor = self.resolve_class(&name)?;

        let mut instance = Instance::allocate(&descriptor);
        match descriptor.unserialize_hook() {
            Some(hook) => {
                run_hook(&name, || {
                    hook(&mut instance, payload, &mut HookContext::new(&name))
                })?;
            }
            None => self.warn(format!("Class {} has no unserializer", name)),
        }
        Ok(Value::Object(Box::new(instance)))
    }

    fn resolve_class(&self, name: &str) -> Result<Arc<TypeDescriptor>, DecodeError> {
        let Some(descriptor) = self.registry.get(name) else {
            self.warn(format!("Class '{}' not found", name));
            return Err(DecodeError::UnknownClass(name.to_string()));
        };
        if descriptor.is_abstract() {
            return Err(DecodeError::Raised {
                class: name.to_string(),
                fault: HookFault::new(format!("Cannot instantiate abstract class {}", name)),
            });
        }
        if !descriptor.is_deserializable() {
            return Err(DecodeError::Raised {
                class: name.to_string(),
                fault: HookFault::new(format!("Unserialization of '{}' is not allowed", name)),
            });
        }
        Ok(descriptor)
    }

    // --- low-level readers ---------------------------------------------

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn expect(&mut self, literal: &[u8]) -> Result<(), DecodeError> {
        if self.input[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.malformed())
        }
    }

    /// Read up to (and consume) `delim`, returning the text before it.
    fn read_until(&mut self, delim: u8) -> Result<&'a str, DecodeError> {
        let input: &'a [u8] = self.input;
        let rest = &input[self.pos..];
        let Some(end) = rest.iter().position(|&b| b == delim) else {
            return Err(self.malformed());
        };
        let text = std::str::from_utf8(&rest[..end]).map_err(|_| self.malformed())?;
        self.pos += end + 1;
        Ok(text)
    }

    fn read_int(&mut self, delim: u8) -> Result<i64, DecodeError> {
        let start = self.pos;
        let raw = self.read_until(delim)?;
        raw.parse().map_err(|_| {
            self.pos = start;
            self.malformed()
        })
    }

    fn read_len(&mut self, delim: u8) -> Result<usize, DecodeError> {
        let start = self.pos;
        let raw = self.read_until(delim)?;
        raw.parse().map_err(|_| {
            self.pos = start;
            self.malformed()
        })
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a str, DecodeError> {
        let input: &'a [u8] = self.input;
        let end = self.pos.checked_add(len).filter(|&end| end <= input.len());
        let Some(end) = end else {
            return Err(self.malformed());
        };
        let text = std::str::from_utf8(&input[self.pos..end]).map_err(|_| self.malformed())?;
        self.pos = end;
        Ok(text)
    }

    fn read_quoted(&mut self, len: usize) -> Result<String, DecodeError> {
        self.expect(b"\"")?;
        let text = self.read_bytes(len)?.to_string();
        self.expect(b"\"")?;
        Ok(text)
    }

    // --- diagnostics ----------------------------------------------------

    #[track_caller]
    fn malformed(&self) -> DecodeError {
        let length = self.input.len();
        trap::raise(Diagnostic::new(
            Severity::Notice,
            format!("Error at offset {} of {} bytes", self.pos, length),
            SourceLocation::here(),
        ));
        DecodeError::Malformed {
            offset: self.pos,
            length,
        }
    }

    #[track_caller]
    fn warn(&self, message: String) {
        trap::raise(Diagnostic::new(
            Severity::Warning,
            message,
            SourceLocation::here(),
        ));
    }
}

/// Run user hook code, converting returned faults and panics alike.
fn run_hook<F>(class: &str, hook: F) -> Result<(), DecodeError>
where
    F: FnOnce() -> Result<(), HookFault>,
{
    match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(fault)) => Err(DecodeError::Raised {
            class: class.to_string(),
            fault,
        }),
        Err(payload) => {
            log::debug!("[decoder] Hook of '{}' panicked during decode", class);
            Err(DecodeError::Raised {
                class: class.to_string(),
                fault: HookFault::panicked(payload.as_ref()),
            })
        }
    }
}

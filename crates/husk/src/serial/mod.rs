// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialized-value format.
//!
//! - [`encoder`]: synthesis of the empty-object string for a type
//! - [`decoder`]: generic decoder materializing values from that format
//! - [`trap`]: scoped capture of non-fatal diagnostics raised while decoding

pub mod decoder;
pub mod encoder;
pub mod trap;

pub use decoder::{decode, DecodeError, Decoder};
pub use encoder::{encode_empty, select_marker};
pub use trap::{Diagnostic, DiagnosticTrap, Severity, SourceLocation};

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime capability table.
//!
//! Which construction techniques are available, and which serialization
//! marker the decoder accepts, depends on the runtime release the object model
//! emulates. Instead of scattering version comparisons through the strategies,
//! a [`RuntimeVersion`] is resolved once into a [`RuntimeProfile`] and every
//! decision reads from that profile.
//!
//! | Release range        | Capability                   | Serialization quirk          |
//! |----------------------|------------------------------|------------------------------|
//! | `< 5.4.0`            | [`Unavailable`]              | standard                     |
//! | `5.4.0 ..= 5.5.x`    | [`LegacyReflection`]         | broken at 5.4.29 and 5.5.13  |
//! | `>= 5.6.0`           | [`Reflection`]               | standard                     |
//!
//! [`Unavailable`]: ConstructionCapability::Unavailable
//! [`LegacyReflection`]: ConstructionCapability::LegacyReflection
//! [`Reflection`]: ConstructionCapability::Reflection

use crate::config::{BROKEN_SERIALIZATION_RELEASES, LEGACY_REFLECTION_SINCE, REFLECTION_SINCE};
use std::fmt;
use std::str::FromStr;

/// A `major.minor.patch` runtime release.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RuntimeVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl RuntimeVersion {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Packed numeric id (`50429` for 5.4.29).
    pub const fn id(&self) -> u32 {
        self.major as u32 * 10_000 + self.minor as u32 * 100 + self.patch as u32
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Error parsing a dotted version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError {
    input: String,
}

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid runtime version '{}': expected major.minor[.patch]",
            self.input
        )
    }
}

impl std::error::Error for ParseVersionError {}

impl FromStr for RuntimeVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError {
            input: s.to_string(),
        };
        let mut parts = s.trim().split('.');
        let major = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        let minor = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        let patch = match parts.next() {
            Some(p) => p.parse().map_err(|_| err())?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self::new(major, minor, patch))
    }
}

/// How far direct (initializer-free) allocation reaches on a runtime.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ConstructionCapability {
    /// No initializer-free allocation; every type goes through the decoder.
    Unavailable,
    /// Allowed only when no type in the ancestry chain is a runtime builtin.
    LegacyReflection,
    /// Allowed unless the type is final and has a builtin ancestor.
    Reflection,
}

/// Which leading marker the decoder accepts for serializable-contract types.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SerializationQuirk {
    /// `O` works for every type.
    Standard,
    /// `O` is rejected for types implementing the custom-serialization
    /// contract; `C` must be used for them.
    BrokenSerializableEncoder,
}

/// Capabilities of one runtime release, resolved once per engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RuntimeProfile {
    pub version: RuntimeVersion,
    pub capability: ConstructionCapability,
    pub quirk: SerializationQuirk,
}

impl RuntimeProfile {
    pub fn resolve(version: RuntimeVersion) -> Self {
        let capability = if version >= REFLECTION_SINCE {
            ConstructionCapability::Reflection
        } else if version >= LEGACY_REFLECTION_SINCE {
            ConstructionCapability::LegacyReflection
        } else {
            ConstructionCapability::Unavailable
        };

        let quirk = if BROKEN_SERIALIZATION_RELEASES.contains(&version) {
            SerializationQuirk::BrokenSerializableEncoder
        } else {
            SerializationQuirk::Standard
        };

        Self {
            version,
            capability,
            quirk,
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine configuration - single source of truth for constants.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: serialization markers and runtime release
//!   boundaries used by the capability table.
//! - **Level 2 (Dynamic)**: [`EngineConfig`], chosen when an
//!   [`Instantiator`](crate::Instantiator) is created (programmatically or from
//!   YAML with the `config-loaders` feature).
//!
//! # Example YAML
//!
//! ```yaml
//! runtime: "5.5.13"
//! clone_templates: true
//! preload_builtins: true
//! ```

use crate::runtime::RuntimeVersion;
use std::fmt;
#[cfg(feature = "config-loaders")]
use std::path::Path;

// =======================================================================
// Serialization markers
// =======================================================================

/// Marker meaning "construct directly from fields, no post-construction hook".
pub const MARKER_AVOID_UNSERIALIZER: char = 'O';

/// Marker meaning "invoke the type's custom deserialization hook".
pub const MARKER_USE_UNSERIALIZER: char = 'C';

// =======================================================================
// Runtime release boundaries
// =======================================================================

/// First release able to allocate a type without running its initializer.
pub const LEGACY_REFLECTION_SINCE: RuntimeVersion = RuntimeVersion::new(5, 4, 0);

/// First release where initializer-free allocation also covers user types
/// extending builtins (only final builtin descendants stay excluded).
pub const REFLECTION_SINCE: RuntimeVersion = RuntimeVersion::new(5, 6, 0);

/// Point releases whose encoder rejects `O` for serializable-contract types.
pub const BROKEN_SERIALIZATION_RELEASES: [RuntimeVersion; 2] =
    [RuntimeVersion::new(5, 4, 29), RuntimeVersion::new(5, 5, 13)];

/// Deepest nesting of arrays and objects the decoder accepts.
pub const MAX_DECODE_DEPTH: usize = 512;

/// Runtime emulated when nothing else is configured.
pub const DEFAULT_RUNTIME: RuntimeVersion = RuntimeVersion::new(8, 2, 0);

// =======================================================================
// Runtime configuration
// =======================================================================

/// Configuration for one [`Instantiator`](crate::Instantiator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Runtime release whose capabilities and quirks are emulated.
    pub runtime: RuntimeVersion,
    /// Keep clone templates for types without a duplication hook.
    pub clone_templates: bool,
    /// Register the runtime builtin types in a freshly created registry.
    pub preload_builtins: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            runtime: DEFAULT_RUNTIME,
            clone_templates: true,
            preload_builtins: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the emulated runtime release.
    pub fn with_runtime(mut self, runtime: RuntimeVersion) -> Self {
        self.runtime = runtime;
        self
    }

    /// Enable or disable the clone-template cache.
    pub fn with_clone_templates(mut self, enabled: bool) -> Self {
        self.clone_templates = enabled;
        self
    }

    /// Enable or disable builtin preloading.
    pub fn with_builtins(mut self, enabled: bool) -> Self {
        self.preload_builtins = enabled;
        self
    }

    /// Parse a YAML document.
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let doc: YamlEngineConfig =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        doc.into_config()
    }

    /// Load a YAML file.
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }
}

/// Root YAML document.
#[cfg(feature = "config-loaders")]
#[derive(Debug, serde::Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct YamlEngineConfig {
    /// Dotted runtime release, e.g. "5.4.29".
    runtime: Option<String>,
    clone_templates: Option<bool>,
    preload_builtins: Option<bool>,
}

#[cfg(feature = "config-loaders")]
impl YamlEngineConfig {
    fn into_config(self) -> Result<EngineConfig, ConfigError> {
        let defaults = EngineConfig::default();
        let runtime = match self.runtime {
            Some(raw) => raw
                .parse()
                .map_err(|e: crate::runtime::ParseVersionError| {
                    ConfigError::InvalidValue {
                        key: "runtime",
                        reason: e.to_string(),
                    }
                })?,
            None => defaults.runtime,
        };
        Ok(EngineConfig {
            runtime,
            clone_templates: self.clone_templates.unwrap_or(defaults.clone_templates),
            preload_builtins: self.preload_builtins.unwrap_or(defaults.preload_builtins),
        })
    }
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: String, reason: String },
    Parse(String),
    InvalidValue { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => write!(f, "Failed to read {}: {}", path, reason),
            Self::Parse(msg) => write!(f, "YAML parse error: {}", msg),
            Self::InvalidValue { key, reason } => {
                write!(f, "Invalid value for '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.runtime, DEFAULT_RUNTIME);
        assert!(config.clone_templates);
        assert!(config.preload_builtins);
    }

    #[test]
    fn test_builder_methods() {
        let config = EngineConfig::new()
            .with_runtime(RuntimeVersion::new(5, 5, 13))
            .with_clone_templates(false)
            .with_builtins(false);
        assert_eq!(config.runtime, RuntimeVersion::new(5, 5, 13));
        assert!(!config.clone_templates);
        assert!(!config.preload_builtins);
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_yaml_partial_document_keeps_defaults() {
        let config = EngineConfig::from_yaml_str("runtime: \"5.4.29\"\n").expect("parse");
        assert_eq!(config.runtime, RuntimeVersion::new(5, 4, 29));
        assert!(config.clone_templates);
        assert!(config.preload_builtins);
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_yaml_rejects_bad_runtime() {
        let err = EngineConfig::from_yaml_str("runtime: \"five\"\n").expect_err("bad runtime");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "runtime", .. }
        ));
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_yaml_rejects_unknown_keys() {
        let err = EngineConfig::from_yaml_str("runtmie: \"8.0\"\n").expect_err("typo");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instantiation engine.
//!
//! Request flow for a type `T`:
//!
//! 1. clone cache: a retained template for `T` is copied and returned;
//! 2. strategy cache: the procedure for `T` is fetched, or built on a miss
//!    (introspect, pick direct allocation or the decoder roundtrip);
//! 3. the procedure is invoked;
//! 4. after the first successful build the clone-or-build decision for `T`
//!    is recorded.

use crate::cache::{CloneCache, StrategyCache};
use crate::config::EngineConfig;
use crate::error::InstantiationError;
use crate::introspect;
use crate::runtime::RuntimeProfile;
use crate::strategy::{self, ConstructionProcedure};
use crate::types::{Instance, TypeRegistry};
use crate::Result;
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

/// Produces constructor-untouched instances by type name.
pub trait Instantiate {
    fn instantiate(&self, type_name: &str) -> Result<Instance>;
}

thread_local! {
    static IN_PROGRESS: Cell<bool> = const { Cell::new(false) };
}

/// Marks an instantiation in progress on the current thread.
struct ActiveCall;

impl ActiveCall {
    fn enter(type_name: &str) -> Result<Self> {
        if IN_PROGRESS.with(|flag| flag.replace(true)) {
            log::warn!(
                "[engine] Rejected nested instantiation of '{}' from inside a hook",
                type_name
            );
            return Err(InstantiationError::Reentrant {
                type_name: type_name.to_string(),
            });
        }
        Ok(Self)
    }
}

impl Drop for ActiveCall {
    fn drop(&mut self) {
        IN_PROGRESS.with(|flag| flag.set(false));
    }
}

/// Engine context owning the per-type caches.
///
/// Share it across threads behind an `Arc`; all methods take `&self`.
pub struct Instantiator {
    registry: Arc<TypeRegistry>,
    profile: RuntimeProfile,
    config: EngineConfig,
    strategies: StrategyCache,
    clones: CloneCache,
}

impl Instantiator {
    /// Create an engine over `registry`.
    ///
    /// Registers the runtime builtins first when `config.preload_builtins`
    /// is set; names already present are left alone.
    pub fn new(registry: Arc<TypeRegistry>, config: EngineConfig) -> Self {
        if config.preload_builtins {
            let added = registry.register_builtins();
            log::debug!("[engine] Preloaded {} builtin types", added);
        }
        let profile = RuntimeProfile::resolve(config.runtime);
        log::info!(
            "[engine] Runtime {} ({:?}, {:?})",
            profile.version,
            profile.capability,
            profile.quirk
        );
        Self {
            registry,
            profile,
            config,
            strategies: StrategyCache::new(),
            clones: CloneCache::new(),
        }
    }

    /// Engine with the default configuration.
    pub fn with_defaults(registry: Arc<TypeRegistry>) -> Self {
        Self::new(registry, EngineConfig::default())
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn profile(&self) -> RuntimeProfile {
        self.profile
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn strategy_cache(&self) -> &StrategyCache {
        &self.strategies
    }

    pub fn clone_cache(&self) -> &CloneCache {
        &self.clones
    }

    /// Cached procedure for `type_name`, building it on first use.
    pub fn procedure(&self, type_name: &str) -> Result<Arc<ConstructionProcedure>> {
        let _call = ActiveCall::enter(type_name)?;
        self.procedure_for(type_name)
    }

    fn procedure_for(&self, type_name: &str) -> Result<Arc<ConstructionProcedure>> {
        self.strategies.get_or_try_build(type_name, || {
            let descriptor = introspect::resolve(&self.registry, type_name)?;
            strategy::build(&self.registry, self.profile, descriptor)
        })
    }
}

impl Instantiate for Instantiator {
    fn instantiate(&self, type_name: &str) -> Result<Instance> {
        let _call = ActiveCall::enter(type_name)?;

        if self.config.clone_templates {
            if let Some(copy) = self.clones.duplicate(type_name) {
                return Ok(copy);
            }
        }

        let instance = self.procedure_for(type_name)?.invoke()?;

        if self.config.clone_templates && !self.clones.is_decided(type_name) {
            self.clones.record(&instance);
        }
        Ok(instance)
    }
}

impl fmt::Debug for Instantiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instantiator")
            .field("profile", &self.profile)
            .field("config", &self.config)
            .field("strategies", &self.strategies)
            .field("clones", &self.clones)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RuntimeVersion;
    use crate::strategy::StrategyKind;
    use crate::types::{FieldKind, HookFault, TypeDescriptorBuilder, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn engine(runtime: RuntimeVersion) -> Instantiator {
        let registry = Arc::new(TypeRegistry::new());
        registry
            .register(
                TypeDescriptorBuilder::new("Point")
                    .field("x", FieldKind::Int)
                    .field("y", FieldKind::Int)
                    .build(),
            )
            .expect("register");
        Instantiator::new(registry, EngineConfig::new().with_runtime(runtime))
    }

    #[test]
    fn test_builtins_preloaded_by_default() {
        let engine = engine(RuntimeVersion::new(8, 0, 0));
        assert!(engine.registry().contains("ArrayObject"));
        assert_eq!(engine.profile().version, RuntimeVersion::new(8, 0, 0));
    }

    #[test]
    fn test_second_request_served_from_template() {
        let engine = engine(RuntimeVersion::new(8, 0, 0));
        let mut first = engine.instantiate("Point").expect("first");
        first.set("x", 3).expect("set");
        assert!(engine.clone_cache().is_template("Point"));

        let second = engine.instantiate("Point").expect("second");
        assert_eq!(second.get("x").expect("x"), &Value::Int(0));
        assert_eq!(engine.strategy_cache().stats().misses, 1);
    }

    #[test]
    fn test_templates_disabled_invokes_procedure() {
        let registry = Arc::new(TypeRegistry::new());
        registry
            .register(TypeDescriptorBuilder::new("Point").build())
            .expect("register");
        let engine = Instantiator::new(
            registry,
            EngineConfig::new().with_clone_templates(false).with_builtins(false),
        );

        engine.instantiate("Point").expect("first");
        engine.instantiate("Point").expect("second");
        assert!(engine.clone_cache().is_empty());
        assert_eq!(engine.strategy_cache().stats().hits, 1);
        assert!(!engine.registry().contains("stdClass"));
    }

    #[test]
    fn test_nested_instantiation_is_rejected() {
        static NESTED: AtomicUsize = AtomicUsize::new(0);
        let registry = Arc::new(TypeRegistry::new());
        let engine = Arc::new(Instantiator::new(
            Arc::clone(&registry),
            EngineConfig::new().with_runtime(RuntimeVersion::new(5, 3, 0)),
        ));
        let inner = Arc::downgrade(&engine);
        registry
            .register(
                TypeDescriptorBuilder::new("Recursive")
                    .on_wakeup(move |_, _| {
                        let Some(engine) = inner.upgrade() else {
                            return Ok(());
                        };
                        match engine.instantiate("Recursive") {
                            Err(InstantiationError::Reentrant { .. }) => {
                                NESTED.fetch_add(1, Ordering::SeqCst);
                                Ok(())
                            }
                            _ => Err(HookFault::new("nested call was not rejected")),
                        }
                    })
                    .build(),
            )
            .expect("register");

        let instance = engine.instantiate("Recursive").expect("outer call");
        assert_eq!(instance.type_name(), "Recursive");
        assert!(NESTED.load(Ordering::SeqCst) >= 1);
        assert_eq!(
            engine.strategy_cache().kind_of("Recursive"),
            Some(StrategyKind::SerializationRoundtrip)
        );
    }

    #[test]
    fn test_hook_may_use_another_engine_from_another_thread() {
        let other = Arc::new(engine(RuntimeVersion::new(8, 0, 0)));
        let registry = Arc::new(TypeRegistry::new());
        let helper = Arc::clone(&other);
        registry
            .register(
                TypeDescriptorBuilder::new("Delegating")
                    .on_wakeup(move |_, _| {
                        let helper = Arc::clone(&helper);
                        std::thread::spawn(move || helper.instantiate("Point").map(|_| ()))
                            .join()
                            .map_err(|_| HookFault::new("helper thread panicked"))?
                            .map_err(HookFault::from_error)
                    })
                    .build(),
            )
            .expect("register");

        let engine = Instantiator::new(
            registry,
            EngineConfig::new().with_runtime(RuntimeVersion::new(5, 3, 0)),
        );
        let instance = engine.instantiate("Delegating").expect("instantiate");
        assert_eq!(instance.type_name(), "Delegating");
        assert!(other.strategy_cache().contains("Point"));
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent first-time requests against one shared engine.

use husk::types::{FieldKind, TypeDescriptorBuilder, TypeRegistry};
use husk::{EngineConfig, Instantiate, Instantiator, RuntimeVersion};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const THREADS: usize = 16;

fn registry() -> Arc<TypeRegistry> {
    let registry = Arc::new(TypeRegistry::new());
    for name in ["Point", "Line", "Polygon"] {
        registry
            .register(
                TypeDescriptorBuilder::new(name)
                    .field("id", FieldKind::Int)
                    .build(),
            )
            .expect("register");
    }
    registry
}

fn hammer(engine: Arc<Instantiator>, names: &'static [&'static str]) {
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..4 {
                    let name = names[(i + fastrand::usize(..names.len())) % names.len()];
                    let instance = engine.instantiate(name).expect("instantiate");
                    assert_eq!(instance.type_name(), name);
                    thread::sleep(Duration::from_micros(fastrand::u64(0..50)));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }
}

#[test]
fn test_concurrent_first_requests_register_one_procedure() {
    let engine = Arc::new(Instantiator::with_defaults(registry()));
    hammer(Arc::clone(&engine), &["Point"]);

    assert_eq!(engine.strategy_cache().len(), 1);
    assert_eq!(engine.strategy_cache().stats().misses, 1);
    assert!(engine.clone_cache().is_template("Point"));
}

#[test]
fn test_concurrent_roundtrip_builds_converge() {
    let engine = Arc::new(Instantiator::new(
        registry(),
        EngineConfig::new()
            .with_runtime(RuntimeVersion::new(5, 3, 0))
            .with_clone_templates(false),
    ));
    hammer(Arc::clone(&engine), &["Point", "Line", "Polygon"]);

    let cache = engine.strategy_cache();
    assert!(cache.len() <= 3);
    assert_eq!(cache.stats().misses as usize, cache.len());
    let stats = cache.stats();
    assert_eq!((stats.hits + stats.misses) as usize, THREADS * 4);
}

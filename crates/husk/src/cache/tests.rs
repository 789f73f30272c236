// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//! Tests for StrategyCache and CloneCache.

use super::*;
use crate::strategy::{direct, ConstructionProcedure, StrategyKind};
use crate::types::{FieldKind, Instance, TypeDescriptor, TypeDescriptorBuilder, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn point() -> Arc<TypeDescriptor> {
    Arc::new(
        TypeDescriptorBuilder::new("Point")
            .field("x", FieldKind::Int)
            .field("y", FieldKind::Int)
            .build(),
    )
}

fn build_point() -> Result<ConstructionProcedure, ()> {
    Ok(direct::procedure(point()))
}

#[test]
fn test_strategy_cache_builds_once() {
    let cache = StrategyCache::new();
    let builds = AtomicUsize::new(0);

    let first = cache
        .get_or_try_build("Point", || {
            builds.fetch_add(1, Ordering::SeqCst);
            build_point()
        })
        .expect("build");
    let second = cache
        .get_or_try_build("Point", || {
            builds.fetch_add(1, Ordering::SeqCst);
            build_point()
        })
        .expect("hit");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(cache.kind_of("Point"), Some(StrategyKind::DirectAllocation));

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[test]
fn test_failed_build_is_not_cached() {
    let cache = StrategyCache::new();
    let err = cache.get_or_try_build("Point", || Err::<ConstructionProcedure, _>("nope"));
    assert_eq!(err.unwrap_err(), "nope");
    assert!(!cache.contains("Point"));
    assert!(cache.is_empty());

    cache
        .get_or_try_build("Point", build_point)
        .expect("second attempt builds");
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_concurrent_first_requests_store_one_procedure() {
    const THREADS: usize = 8;
    let cache = Arc::new(StrategyCache::new());
    let builds = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let builds = Arc::clone(&builds);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                thread::sleep(Duration::from_micros(fastrand::u64(0..200)));
                cache
                    .get_or_try_build("Point", || {
                        builds.fetch_add(1, Ordering::SeqCst);
                        build_point()
                    })
                    .expect("build")
            })
        })
        .collect();

    let procs: Vec<Arc<ConstructionProcedure>> = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .collect();

    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
    assert!(procs.iter().all(|p| Arc::ptr_eq(p, &procs[0])));
}

#[test]
fn test_clone_cache_keeps_template_private() {
    let cache = CloneCache::new();
    let mut built = Instance::allocate(&point());
    assert!(cache.record(&built));
    assert!(cache.is_template("Point"));

    // Mutating what the caller got back never reaches the template.
    built.set("x", 9).expect("set");
    let copy = cache.duplicate("Point").expect("template");
    assert_eq!(copy.get("x").expect("x"), &Value::Int(0));
}

#[test]
fn test_clone_cache_first_writer_wins() {
    let cache = CloneCache::new();
    let desc = point();
    let mut first = Instance::allocate(&desc);
    first.set("y", 1).expect("set");
    let second = Instance::allocate(&desc);

    assert!(cache.record(&first));
    assert!(!cache.record(&second));
    assert_eq!(
        cache.duplicate("Point").expect("template").get("y").expect("y"),
        &Value::Int(1)
    );
}

#[test]
fn test_clone_cache_fresh_build_for_hooked_or_uncloneable() {
    let cache = CloneCache::new();
    let hooked = Arc::new(TypeDescriptorBuilder::new("Hooked").on_clone(|_| {}).build());
    let pinned = Arc::new(TypeDescriptorBuilder::new("Pinned").not_cloneable().build());

    assert!(cache.record(&Instance::allocate(&hooked)));
    assert!(cache.record(&Instance::allocate(&pinned)));
    assert!(cache.is_decided("Hooked"));
    assert!(!cache.is_template("Hooked"));
    assert!(cache.duplicate("Pinned").is_none());
    assert_eq!(cache.len(), 2);
}

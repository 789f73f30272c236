// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Direct allocation: zeroed instance, no initializer, no hook.

use crate::runtime::ConstructionCapability;
use crate::strategy::{ConstructionProcedure, StrategyKind};
use crate::types::{Instance, TypeDescriptor};
use std::sync::Arc;

/// True when `descriptor` can be allocated directly on a runtime with `capability`.
pub fn is_eligible(descriptor: &TypeDescriptor, capability: ConstructionCapability) -> bool {
    match capability {
        ConstructionCapability::Reflection => {
            !(descriptor.has_builtin_ancestry() && descriptor.is_final())
        }
        ConstructionCapability::LegacyReflection => !descriptor.has_builtin_ancestry(),
        ConstructionCapability::Unavailable => false,
    }
}

/// Procedure allocating a fresh instance on every call.
pub fn procedure(descriptor: Arc<TypeDescriptor>) -> ConstructionProcedure {
    let target = Arc::clone(&descriptor);
    ConstructionProcedure::new(descriptor, StrategyKind::DirectAllocation, move || {
        Ok(Instance::allocate(&target))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldKind, TypeDescriptorBuilder, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_eligibility_table() {
        let builtin = Arc::new(TypeDescriptorBuilder::new("ArrayObject").builtin().build());
        let sealed_builtin = TypeDescriptorBuilder::new("Closure").builtin().final_type().build();
        let user = TypeDescriptorBuilder::new("Point").build();
        let sealed_user = TypeDescriptorBuilder::new("Money").final_type().build();
        let derived = TypeDescriptorBuilder::new("Bag").extends(&builtin).build();
        let sealed_derived = TypeDescriptorBuilder::new("Sealed")
            .extends(&builtin)
            .final_type()
            .build();

        use ConstructionCapability::*;
        for desc in [&user, &sealed_user] {
            assert!(is_eligible(desc, Reflection));
            assert!(is_eligible(desc, LegacyReflection));
            assert!(!is_eligible(desc, Unavailable));
        }
        assert!(is_eligible(&derived, Reflection));
        assert!(!is_eligible(&derived, LegacyReflection));
        assert!(!is_eligible(&sealed_derived, Reflection));
        assert!(!is_eligible(&sealed_builtin, Reflection));
        assert!(!is_eligible(&builtin, LegacyReflection));
    }

    #[test]
    fn test_procedure_runs_no_code() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let desc = Arc::new(
            TypeDescriptorBuilder::new("Counter")
                .field_with_default("count", FieldKind::Int, 5)
                .field("label", FieldKind::Str)
                .initializer(0, |_, _| {
                    CALLS.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .on_wakeup(|_, _| {
                    CALLS.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build(),
        );

        let factory = procedure(desc);
        let a = factory.invoke().expect("invoke");
        let b = factory.invoke().expect("invoke");
        assert_eq!(a.get("count").expect("count"), &Value::Int(5));
        assert_eq!(a.get("label").expect("label"), &Value::from(""));
        assert_eq!(a, b);
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    }
}

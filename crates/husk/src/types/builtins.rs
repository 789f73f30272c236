// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime builtin types.
//!
//! | Type               | Final | Serializable contract | Cloneable | Decodable |
//! |--------------------|-------|-----------------------|-----------|-----------|
//! | `stdClass`         | no    | no                    | yes       | yes       |
//! | `ArrayObject`      | no    | yes                   | yes       | yes       |
//! | `ArrayIterator`    | no    | yes                   | yes       | yes       |
//! | `SplObjectStorage` | no    | yes                   | yes       | yes       |
//! | `Exception`        | no    | no                    | yes       | yes       |
//! | `Closure`          | yes   | no                    | yes       | no        |
//! | `Generator`        | yes   | no                    | no        | no        |

use crate::types::{FieldKind, TypeDescriptor, TypeDescriptorBuilder};

struct BuiltinSpec {
    name: &'static str,
    final_type: bool,
    serializable: bool,
    cloneable: bool,
    deserializable: bool,
}

const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: "stdClass",
        final_type: false,
        serializable: false,
        cloneable: true,
        deserializable: true,
    },
    BuiltinSpec {
        name: "ArrayObject",
        final_type: false,
        serializable: true,
        cloneable: true,
        deserializable: true,
    },
    BuiltinSpec {
        name: "ArrayIterator",
        final_type: false,
        serializable: true,
        cloneable: true,
        deserializable: true,
    },
    BuiltinSpec {
        name: "SplObjectStorage",
        final_type: false,
        serializable: true,
        cloneable: true,
        deserializable: true,
    },
    BuiltinSpec {
        name: "Exception",
        final_type: false,
        serializable: false,
        cloneable: true,
        deserializable: true,
    },
    BuiltinSpec {
        name: "Closure",
        final_type: true,
        serializable: false,
        cloneable: true,
        deserializable: false,
    },
    BuiltinSpec {
        name: "Generator",
        final_type: true,
        serializable: false,
        cloneable: false,
        deserializable: false,
    },
];

/// Descriptors for every builtin type.
pub(crate) fn descriptors() -> Vec<TypeDescriptor> {
    BUILTINS.iter().map(build).collect()
}

fn build(spec: &BuiltinSpec) -> TypeDescriptor {
    let mut builder = TypeDescriptorBuilder::new(spec.name).builtin();
    if spec.final_type {
        builder = builder.final_type();
    }
    if !spec.cloneable {
        builder = builder.not_cloneable();
    }
    if !spec.deserializable {
        builder = builder.forbid_deserialization();
    }
    if spec.serializable {
        // Builtin containers restore their storage from the payload; an empty
        // payload restores an empty container.
        builder = builder.on_unserialize(|_, _, _| Ok(()));
    }
    if spec.name == "Exception" {
        builder = builder
            .field("message", FieldKind::Str)
            .field("code", FieldKind::Int)
            .field("previous", FieldKind::Mixed);
    }
    builder.build()
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Synthesis of empty-object encodings.
//!
//! The only thing ever encoded is "an instance of T with zero fields":
//!
//! ```text
//! <marker>:<nameLength>:"<typeName>":0:{}
//! ```
//!
//! `nameLength` is the byte length of the name. The string is never produced
//! by running the type, only from its name.

use crate::config::{MARKER_AVOID_UNSERIALIZER, MARKER_USE_UNSERIALIZER};
use crate::runtime::{RuntimeProfile, SerializationQuirk};
use crate::types::TypeDescriptor;

/// Pick the leading marker for `descriptor` on the given runtime.
///
/// `C` only on broken-encoder releases and only for types implementing the
/// custom-serialization contract; `O` everywhere else.
pub fn select_marker(profile: &RuntimeProfile, descriptor: &TypeDescriptor) -> char {
    match profile.quirk {
        SerializationQuirk::BrokenSerializableEncoder
            if descriptor.implements_serialization_contract() =>
        {
            MARKER_USE_UNSERIALIZER
        }
        _ => MARKER_AVOID_UNSERIALIZER,
    }
}

/// Encode an empty instance of `type_name` with the given marker.
pub fn encode_empty(marker: char, type_name: &str) -> String {
    format!("{}:{}:\"{}\":0:{{}}", marker, type_name.len(), type_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RuntimeVersion;
    use crate::types::TypeDescriptorBuilder;

    #[test]
    fn test_encode_empty_is_bit_exact() {
        assert_eq!(encode_empty('O', "Point"), "O:5:\"Point\":0:{}");
        assert_eq!(encode_empty('C', "ArrayObject"), "C:11:\"ArrayObject\":0:{}");
        assert_eq!(
            encode_empty('O', "App\\Entity\\User"),
            "O:15:\"App\\Entity\\User\":0:{}"
        );
    }

    #[test]
    fn test_name_length_counts_bytes() {
        assert_eq!(encode_empty('O', "Caf\u{e9}"), "O:5:\"Caf\u{e9}\":0:{}");
    }

    #[test]
    fn test_marker_selection() {
        let plain = TypeDescriptorBuilder::new("Plain").build();
        let serializable = TypeDescriptorBuilder::new("Packed")
            .on_unserialize(|_, _, _| Ok(()))
            .build();

        let broken = RuntimeProfile::resolve(RuntimeVersion::new(5, 4, 29));
        let fixed = RuntimeProfile::resolve(RuntimeVersion::new(5, 4, 30));

        assert_eq!(select_marker(&broken, &serializable), 'C');
        assert_eq!(select_marker(&broken, &plain), 'O');
        assert_eq!(select_marker(&fixed, &serializable), 'O');
        assert_eq!(select_marker(&fixed, &plain), 'O');
    }
}

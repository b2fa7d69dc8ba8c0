// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed list codec
//!
//! Converts between an in-memory list of element-type instances and the
//! list of strings a storage slot persists.
//!
//! # Operation
//!
//! 1. `validate` -- check untyped candidates are all of the element type
//! 2. `to_storage` -- encode each item, enforce the per-value ceiling
//! 3. `from_storage` -- decode each stored string, in order
//!
//! Each call is pure and all-or-nothing; the codec holds no state besides
//! its immutable configuration.

use crate::element::{ElementType, StrategyKind};
use crate::error::CodecError;
use crate::field::{FieldOptions, StorageHooks, ValueKind};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Codec construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodecOptions {
    /// Refuse element types registered with the field-dump strategy.
    pub require_custom_serialization: bool,

    /// Passthrough options for the storage slot.
    pub field: FieldOptions,
}

impl CodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a custom serialize/deserialize pair on the element type
    pub fn require_custom_serialization(mut self, require: bool) -> Self {
        self.require_custom_serialization = require;
        self
    }

    /// Set storage indexing
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.field.indexed = indexed;
        self
    }

    /// Set stored value representation
    pub fn value_kind(mut self, kind: ValueKind) -> Self {
        self.field.value_kind = kind;
        self
    }
}

/// Validated, bidirectional conversion for one object-list field.
pub struct TypedListCodec<T> {
    field: String,
    element: ElementType<T>,
    options: CodecOptions,
}

impl<T: 'static> TypedListCodec<T> {
    /// Build a codec for `field` holding items described by `element`.
    ///
    /// Fails with [`CodecError::Configuration`] when custom serialization is
    /// required but `element` was registered with the field-dump strategy.
    pub fn new(
        field: impl Into<String>,
        element: ElementType<T>,
        options: CodecOptions,
    ) -> Result<Self, CodecError> {
        let field = field.into();

        if options.require_custom_serialization
            && element.strategy_kind() != StrategyKind::Custom
        {
            return Err(CodecError::Configuration {
                field,
                type_name: element.type_name().to_string(),
            });
        }

        Ok(Self {
            field,
            element,
            options,
        })
    }

    /// Field name
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Element type descriptor
    pub fn element(&self) -> &ElementType<T> {
        &self.element
    }

    /// Construction options
    pub fn codec_options(&self) -> CodecOptions {
        self.options
    }

    /// Check that every candidate is an instance of the element type.
    ///
    /// Returns the items, in order, as `T` on success. The first foreign item
    /// fails the whole call.
    pub fn validate(&self, items: Vec<Box<dyn Any>>) -> Result<Vec<T>, CodecError> {
        if let Some(index) = items.iter().position(|item| !item.is::<T>()) {
            return Err(self.type_mismatch(index));
        }

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                item.downcast::<T>()
                    .map(|item| *item)
                    .map_err(|_| self.type_mismatch(index))
            })
            .collect()
    }

    /// Encode a list for storage. `None` and empty lists encode to `[]`.
    pub fn to_storage(&self, items: Option<&[T]>) -> Result<Vec<String>, CodecError> {
        let Some(items) = items else {
            return Ok(Vec::new());
        };

        let limit = self.options.field.value_kind.max_chars();
        let strategy = self.element.strategy();

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let encoded = strategy
                    .encode(item)
                    .map_err(|source| CodecError::Serialization {
                        field: self.field.clone(),
                        index,
                        source,
                    })?;

                if let Some(limit) = limit {
                    let length = encoded.chars().count();
                    if length > limit {
                        return Err(CodecError::EncodingOverflow {
                            field: self.field.clone(),
                            length,
                            limit,
                        });
                    }
                }

                Ok(encoded)
            })
            .collect()
    }

    /// Decode a stored list. `None` decodes to an empty list.
    pub fn from_storage(&self, stored: Option<&[String]>) -> Result<Vec<T>, CodecError> {
        let Some(stored) = stored else {
            return Ok(Vec::new());
        };

        let strategy = self.element.strategy();

        stored
            .iter()
            .map(|raw| {
                strategy.decode(raw).map_err(|source| CodecError::Decoding {
                    field: self.field.clone(),
                    raw: raw.clone(),
                    source,
                })
            })
            .collect()
    }

    fn type_mismatch(&self, index: usize) -> CodecError {
        CodecError::TypeMismatch {
            field: self.field.clone(),
            expected: self.element.type_name().to_string(),
            index,
        }
    }
}

impl<T: 'static> StorageHooks<T> for TypedListCodec<T> {
    fn field_name(&self) -> &str {
        &self.field
    }

    fn options(&self) -> FieldOptions {
        self.options.field
    }

    fn encode_for_storage(&self, items: Option<&[T]>) -> Result<Vec<String>, CodecError> {
        self.to_storage(items)
    }

    fn decode_from_storage(&self, stored: Option<&[String]>) -> Result<Vec<T>, CodecError> {
        self.from_storage(stored)
    }
}

impl<T> Clone for TypedListCodec<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            element: self.element.clone(),
            options: self.options,
        }
    }
}

impl<T> fmt::Debug for TypedListCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedListCodec")
            .field("field", &self.field)
            .field("element", &self.element)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::CustomSerialization;
    use crate::error::ItemError;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i64,
        y: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Other {
        name: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Labelled {
        #[serde(alias = "label")]
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        labels: Vec<String>,
    }

    /// Stored form is the payload verbatim, so tests control its length.
    #[derive(Debug, Clone, PartialEq)]
    struct Blob(String);

    impl CustomSerialization for Blob {
        fn serialize_item(&self) -> String {
            self.0.clone()
        }

        fn deserialize_item(raw: &str) -> Result<Self, ItemError> {
            if raw.is_empty() {
                return Err(ItemError::custom("empty blob"));
            }
            Ok(Blob(raw.to_string()))
        }
    }

    fn point(x: i64, y: &str) -> Point {
        Point {
            x,
            y: y.to_string(),
        }
    }

    fn points_codec() -> TypedListCodec<Point> {
        TypedListCodec::new("points", ElementType::field_dump(), CodecOptions::new()).unwrap()
    }

    fn blob_codec(options: CodecOptions) -> TypedListCodec<Blob> {
        TypedListCodec::new("blobs", ElementType::custom(), options).unwrap()
    }

    #[test]
    fn test_strict_policy_rejects_field_dump() {
        let err = TypedListCodec::<Point>::new(
            "points",
            ElementType::field_dump(),
            CodecOptions::new().require_custom_serialization(true),
        )
        .unwrap_err();

        assert!(matches!(err, CodecError::Configuration { .. }));
        assert_eq!(err.field(), "points");
        assert!(err.to_string().contains("Point"));
    }

    #[test]
    fn test_strict_policy_accepts_custom() {
        let codec = blob_codec(CodecOptions::new().require_custom_serialization(true));
        assert_eq!(codec.element().strategy_kind(), StrategyKind::Custom);
    }

    #[test]
    fn test_validate_accepts_matching_items() {
        let codec = points_codec();
        let items: Vec<Box<dyn Any>> = vec![Box::new(point(1, "a")), Box::new(point(2, "b"))];

        let validated = codec.validate(items).unwrap();
        assert_eq!(validated, vec![point(1, "a"), point(2, "b")]);
    }

    #[test]
    fn test_validate_rejects_foreign_type() {
        let codec = points_codec();
        let items: Vec<Box<dyn Any>> = vec![
            Box::new(point(1, "a")),
            Box::new(Other {
                name: "x".to_string(),
            }),
        ];

        match codec.validate(items) {
            Err(CodecError::TypeMismatch {
                field,
                expected,
                index,
            }) => {
                assert_eq!(field, "points");
                assert_eq!(expected, "Point");
                assert_eq!(index, 1);
            }
            other => panic!("expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_absent_and_empty_input() {
        let codec = points_codec();
        assert!(codec.to_storage(None).unwrap().is_empty());
        assert!(codec.to_storage(Some(&[])).unwrap().is_empty());
        assert!(codec.from_storage(None).unwrap().is_empty());
        assert!(codec.from_storage(Some(&[])).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let codec = points_codec();
        let items = vec![point(3, "c"), point(1, "a"), point(2, "b")];

        let stored = codec.to_storage(Some(&items)).unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0], r#"{"x":3,"y":"c"}"#);

        let decoded = codec.from_storage(Some(&stored)).unwrap();
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_reordered_storage_decodes_in_stored_order() {
        let codec = points_codec();
        let items = vec![point(1, "a"), point(2, "b"), point(3, "c")];

        let mut stored = codec.to_storage(Some(&items)).unwrap();
        stored.reverse();

        let decoded = codec.from_storage(Some(&stored)).unwrap();
        assert_eq!(decoded, vec![point(3, "c"), point(2, "b"), point(1, "a")]);
    }

    #[test]
    fn test_overflow_boundary() {
        let codec = blob_codec(CodecOptions::new());

        let exact = Blob("x".repeat(500));
        let stored = codec.to_storage(Some(&[exact.clone()])).unwrap();
        assert_eq!(stored[0].len(), 500);

        let over = Blob("x".repeat(501));
        match codec.to_storage(Some(&[exact, over])) {
            Err(CodecError::EncodingOverflow {
                field,
                length,
                limit,
            }) => {
                assert_eq!(field, "blobs");
                assert_eq!(length, 501);
                assert_eq!(limit, 500);
            }
            other => panic!("expected EncodingOverflow, got {:?}", other),
        }
    }

    #[test]
    fn test_overflow_counts_characters_not_bytes() {
        let codec = blob_codec(CodecOptions::new());
        // 500 characters, 1000 bytes
        let wide = Blob("é".repeat(500));
        assert!(codec.to_storage(Some(&[wide])).is_ok());
    }

    #[test]
    fn test_text_kind_has_no_ceiling() {
        let codec = blob_codec(CodecOptions::new().value_kind(ValueKind::Text));
        let large = Blob("x".repeat(10_000));
        let stored = codec.to_storage(Some(&[large.clone()])).unwrap();
        assert_eq!(codec.from_storage(Some(&stored)).unwrap(), vec![large]);
    }

    #[test]
    fn test_decode_failure_names_raw_value() {
        let codec = points_codec();
        let stored = vec![r#"{"x":1,"y":"a"}"#.to_string(), "not json".to_string()];

        match codec.from_storage(Some(&stored)) {
            Err(CodecError::Decoding { field, raw, source }) => {
                assert_eq!(field, "points");
                assert_eq!(raw, "not json");
                assert!(matches!(source, ItemError::Malformed(_)));
            }
            other => panic!("expected Decoding, got {:?}", other),
        }
    }

    #[test]
    fn test_argument_mismatch_wrapped_in_decoding() {
        let codec = points_codec();
        let stored = vec![r#"{"x":1,"y":"a","z":true}"#.to_string()];

        let err = codec.from_storage(Some(&stored)).unwrap_err();
        assert!(err.is_argument_error());
    }

    #[test]
    fn test_undeclared_null_key_fails_decode() {
        let codec = points_codec();
        let stored = vec![r#"{"x":1,"y":"a","bogus":null}"#.to_string()];

        let err = codec.from_storage(Some(&stored)).unwrap_err();
        assert!(err.is_argument_error());
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_fields_skipped_on_output_round_trip() {
        let codec = TypedListCodec::<Labelled>::new(
            "labelled",
            ElementType::field_dump(),
            CodecOptions::new(),
        )
        .unwrap();
        let items = vec![
            Labelled {
                name: "a".to_string(),
                labels: Vec::new(),
            },
            Labelled {
                name: "b".to_string(),
                labels: vec!["x".to_string()],
            },
        ];

        let stored = codec.to_storage(Some(&items)).unwrap();
        assert_eq!(stored[0], r#"{"name":"a"}"#);
        assert_eq!(codec.from_storage(Some(&stored)).unwrap(), items);

        let written_by_hand = vec![
            r#"{"name":"c","labels":[]}"#.to_string(),
            r#"{"label":"d"}"#.to_string(),
        ];
        let decoded = codec.from_storage(Some(&written_by_hand)).unwrap();
        assert_eq!(decoded[0].name, "c");
        assert_eq!(decoded[1].name, "d");
    }

    #[test]
    fn test_custom_decode_failure() {
        let codec = blob_codec(CodecOptions::new());
        let stored = vec!["ok".to_string(), String::new()];
        let err = codec.from_storage(Some(&stored)).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Decoding {
                source: ItemError::Custom(_),
                ..
            }
        ));
    }

    #[test]
    fn test_hooks_forward_options() {
        let codec = blob_codec(CodecOptions::new().indexed(true));
        let hooks: &dyn StorageHooks<Blob> = &codec;
        assert_eq!(hooks.field_name(), "blobs");
        assert!(hooks.options().indexed);

        let stored = hooks
            .encode_for_storage(Some(&[Blob("a".to_string())]))
            .unwrap();
        assert_eq!(hooks.decode_from_storage(Some(&stored)).unwrap().len(), 1);
    }

    #[test]
    fn test_codec_is_shareable_across_threads() {
        let codec = std::sync::Arc::new(points_codec());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let codec = std::sync::Arc::clone(&codec);
                std::thread::spawn(move || {
                    let items = vec![point(i, "t")];
                    let stored = codec.to_storage(Some(&items)).unwrap();
                    codec.from_storage(Some(&stored)).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), vec![point(i as i64, "t")]);
        }
    }
}

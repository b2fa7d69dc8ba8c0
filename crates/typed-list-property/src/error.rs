// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the object-list codec.
//!
//! Every operation is all-or-nothing over the whole list: the first failing
//! item aborts the call and nothing is partially returned.

use thiserror::Error;

/// Failure of a single item's serialization strategy.
#[derive(Debug, Error)]
pub enum ItemError {
    /// Mapping keys do not match the element type's fields.
    #[error("argument mismatch: {0}")]
    Argument(String),

    /// Stored text could not be parsed.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// Field-dump strategy used on a type that is not a named-field struct.
    #[error("not a field mapping: {0}")]
    NotFieldMapping(String),

    /// Failure reported by a type's own `deserialize_item`.
    #[error("{0}")]
    Custom(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ItemError {
    /// Convenience constructor for custom strategies.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// True if this is an argument (field-set) mismatch.
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument(_))
    }
}

/// Errors raised by [`crate::TypedListCodec`].
#[derive(Debug, Error)]
pub enum CodecError {
    /// Strict policy: the element type has no custom serialize/deserialize pair.
    #[error(
        "field '{field}': element type {type_name} must provide custom serialization \
         (registered with the field-dump strategy)"
    )]
    Configuration { field: String, type_name: String },

    /// A candidate item is not an instance of the element type.
    #[error("field '{field}': item {index} is not of type {expected}")]
    TypeMismatch {
        field: String,
        expected: String,
        index: usize,
    },

    /// A serialized item exceeds the storage slot's per-value ceiling.
    #[error(
        "field '{field}': serialized item is {length} characters, limit is {limit}; \
         use ValueKind::Text for larger payloads"
    )]
    EncodingOverflow {
        field: String,
        length: usize,
        limit: usize,
    },

    /// An item could not be turned into its stored form.
    #[error("field '{field}': cannot serialize item {index}: {source}")]
    Serialization {
        field: String,
        index: usize,
        #[source]
        source: ItemError,
    },

    /// A stored string could not be reconstructed into an item.
    #[error("field '{field}': cannot decode {raw:?}: {source}")]
    Decoding {
        field: String,
        raw: String,
        #[source]
        source: ItemError,
    },
}

impl CodecError {
    /// Name of the field the error was raised for.
    pub fn field(&self) -> &str {
        match self {
            Self::Configuration { field, .. }
            | Self::TypeMismatch { field, .. }
            | Self::EncodingOverflow { field, .. }
            | Self::Serialization { field, .. }
            | Self::Decoding { field, .. } => field,
        }
    }

    /// True if a decode failed because the stored mapping did not match the
    /// element type's fields.
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::Decoding { source, .. } if source.is_argument())
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-field storage options and the host extension point.

use crate::error::CodecError;
use serde::{Deserialize, Serialize};

/// Per-value ceiling of [`ValueKind::ShortString`], in characters.
pub const SHORT_STRING_MAX_CHARS: usize = 500;

/// Representation of each stored list element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Bounded string, at most [`SHORT_STRING_MAX_CHARS`] characters.
    #[default]
    ShortString,
    /// Unbounded text. Cannot be indexed by most backends.
    Text,
}

impl ValueKind {
    /// Maximum characters per stored value (None = unlimited).
    pub fn max_chars(&self) -> Option<usize> {
        match self {
            ValueKind::ShortString => Some(SHORT_STRING_MAX_CHARS),
            ValueKind::Text => None,
        }
    }
}

/// Storage-layer options, forwarded unchanged to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Ask the backend to index the stored values.
    pub indexed: bool,

    /// Stored value representation.
    pub value_kind: ValueKind,
}

impl FieldOptions {
    /// Default options: unindexed short strings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set indexing
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    /// Set value representation
    pub fn value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = kind;
        self
    }
}

/// Hooks a list-of-strings field calls on write and read.
///
/// This is the whole contract between a host persistence layer and a typed
/// list field: strings go in on write, strings come out on read.
pub trait StorageHooks<T> {
    /// Name of the intercepted field.
    fn field_name(&self) -> &str;

    /// Options to forward to the storage layer.
    fn options(&self) -> FieldOptions;

    /// Convert the in-memory list to its stored form.
    fn encode_for_storage(&self, items: Option<&[T]>) -> Result<Vec<String>, CodecError>;

    /// Convert a stored list back into items.
    fn decode_from_storage(&self, stored: Option<&[String]>) -> Result<Vec<T>, CodecError>;
}

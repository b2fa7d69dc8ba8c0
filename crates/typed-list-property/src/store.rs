// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record store abstraction
//!
//! Defines the trait for storage backends holding records made of
//! string-list slots.

use crate::field::FieldOptions;
use crate::record::Record;
use anyhow::Result;

/// Record store trait
///
/// Backend-agnostic interface for persisting [`Record`]s. Backends only see
/// lists of strings; typed conversion happens in the field hooks.
///
/// # Implementations
///
/// - `SqliteStore` -- Default
pub trait RecordStore {
    /// Declare a field and its storage options.
    ///
    /// Values written to a registered [`ValueKind::ShortString`] field are
    /// length-checked by the backend; `indexed` fields can be queried with
    /// [`RecordStore::find_keys`].
    ///
    /// [`ValueKind::ShortString`]: crate::field::ValueKind::ShortString
    fn register_field(&self, field: &str, options: FieldOptions) -> Result<()>;

    /// Insert or replace a record, all slots at once.
    fn put(&self, record: &Record) -> Result<()>;

    /// Load a record by key
    fn get(&self, key: &str) -> Result<Option<Record>>;

    /// Delete a record. Returns false if it did not exist.
    fn delete(&self, key: &str) -> Result<bool>;

    /// All record keys, sorted
    fn keys(&self) -> Result<Vec<String>>;

    /// Keys of records whose `field` contains `value`.
    ///
    /// Fails if `field` was not registered as indexed.
    fn find_keys(&self, field: &str, value: &str) -> Result<Vec<String>>;

    /// Get total number of records stored
    fn count(&self) -> Result<usize>;

    /// Clear all records (fields stay registered)
    fn clear(&self) -> Result<()>;
}

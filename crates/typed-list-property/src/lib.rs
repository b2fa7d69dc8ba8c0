// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed List Property
//!
//! Lets a record field hold a list of application objects while the storage
//! layer only ever sees a list of bounded-length strings.
//!
//! # Features
//!
//! - **Type validation** -- untyped candidates are checked against the element type
//! - **Pluggable serialization** -- a type's own `serialize_item`/`deserialize_item`,
//!   or a JSON dump of its serde field mapping
//! - **Length policy** -- 500-character ceiling per stored value, or unbounded text
//! - **SQLite backend** -- order-preserving record store with optional value indexes
//!
//! # Architecture
//!
//! ```text
//! ObjectListProperty<T>   (intercepts one record field)
//! +-- TypedListCodec<T>   (validate / to_storage / from_storage)
//! |   +-- ElementType<T>  (CustomCodec or FieldDumpCodec)
//! +-- Record              (key + string-list slots)
//!     +-- RecordStore     (SQLite backend)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use typed_list_property::{CodecOptions, ElementType, ObjectListProperty, Record};
//!
//! let visits = ObjectListProperty::new("visits", ElementType::<Visit>::field_dump(),
//!     CodecOptions::new().indexed(false))?;
//!
//! let mut record = Record::new("site");
//! visits.append(&mut record, Visit::new("curl"))?;
//! store.put(&record)?;
//! ```

pub mod codec;
pub mod config;
pub mod demo;
pub mod element;
pub mod error;
pub mod field;
pub mod record;
pub mod sqlite;
pub mod store;

pub use codec::{CodecOptions, TypedListCodec};
pub use config::{Config, ConfigBuilder};
pub use element::{
    declared_fields, CustomCodec, CustomSerialization, ElementType, FieldDumpCodec,
    SerializationStrategy, StrategyKind,
};
pub use error::{CodecError, ItemError};
pub use field::{FieldOptions, StorageHooks, ValueKind, SHORT_STRING_MAX_CHARS};
pub use record::{ObjectListProperty, Record};
pub use sqlite::SqliteStore;
pub use store::RecordStore;

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Element type descriptors and per-item serialization strategies.
//!
//! An [`ElementType`] pairs a Rust type with the strategy used to turn one
//! item into one stored string and back. The strategy is picked when the
//! descriptor is built and never re-checked afterwards.
//!
//! # Strategies
//!
//! - [`CustomCodec`] -- the type implements [`CustomSerialization`]
//! - [`FieldDumpCodec`] -- the type's serde field mapping is dumped as a JSON
//!   object and rebuilt from one

use crate::error::ItemError;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Item types that know how to serialize themselves.
///
/// Implement this when the type holds values without a natural JSON
/// representation, or when a more compact stored form is wanted.
pub trait CustomSerialization: Sized {
    /// Produce the stored form of this item.
    fn serialize_item(&self) -> String;

    /// Rebuild an item from its stored form.
    fn deserialize_item(raw: &str) -> Result<Self, ItemError>;
}

/// Which strategy an [`ElementType`] was registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Type-provided `serialize_item` / `deserialize_item`.
    Custom,
    /// JSON dump of the serde field mapping.
    FieldDump,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Custom => write!(f, "custom"),
            StrategyKind::FieldDump => write!(f, "field-dump"),
        }
    }
}

/// Encode/decode pair for a single item of type `T`.
pub trait SerializationStrategy<T>: Send + Sync {
    /// Strategy variant, used for policy checks at codec construction.
    fn kind(&self) -> StrategyKind;

    /// Encode one item.
    fn encode(&self, item: &T) -> Result<String, ItemError>;

    /// Decode one stored string.
    fn decode(&self, raw: &str) -> Result<T, ItemError>;
}

/// Strategy delegating to [`CustomSerialization`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomCodec;

impl<T: CustomSerialization> SerializationStrategy<T> for CustomCodec {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Custom
    }

    fn encode(&self, item: &T) -> Result<String, ItemError> {
        Ok(item.serialize_item())
    }

    fn decode(&self, raw: &str) -> Result<T, ItemError> {
        T::deserialize_item(raw)
    }
}

/// Strategy storing the item's field mapping as a JSON object.
///
/// Decoding builds the item from the mapping. Every key in the stored object
/// must be a field name `T` declares for deserialization (aliases included)
/// and every required field of `T` must be present, otherwise decoding fails
/// with [`ItemError::Argument`]. `T` must deserialize as a named-field
/// struct.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldDumpCodec;

impl<T: Serialize + DeserializeOwned> SerializationStrategy<T> for FieldDumpCodec {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FieldDump
    }

    fn encode(&self, item: &T) -> Result<String, ItemError> {
        let value = serde_json::to_value(item)?;
        if !value.is_object() {
            return Err(ItemError::NotFieldMapping(
                "element type does not serialize to a field mapping".to_string(),
            ));
        }
        Ok(serde_json::to_string(&value)?)
    }

    fn decode(&self, raw: &str) -> Result<T, ItemError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ItemError::Malformed(e.to_string()))?;
        let Value::Object(mapping) = &value else {
            return Err(ItemError::Malformed(
                "expected a JSON object mapping".to_string(),
            ));
        };

        let fields = declared_fields::<T>().ok_or_else(|| {
            ItemError::NotFieldMapping(
                "element type does not deserialize as a named-field struct".to_string(),
            )
        })?;
        if let Some(key) = mapping.keys().find(|key| !fields.contains(&key.as_str())) {
            return Err(ItemError::Argument(format!("unexpected field `{}`", key)));
        }

        T::deserialize(&value).map_err(|e| ItemError::Argument(e.to_string()))
    }
}

/// Field names `T` accepts when deserialized as a struct, aliases included.
///
/// Fields marked `skip_deserializing` are not listed. Returns `None` for
/// types that do not deserialize through `deserialize_struct`.
pub fn declared_fields<T: DeserializeOwned>() -> Option<&'static [&'static str]> {
    let mut fields = None;
    // the capture always errors out once it has seen the field list
    let _ = T::deserialize(FieldCapture {
        fields: &mut fields,
    });
    fields
}

/// Deserializer that only records the field list handed to `deserialize_struct`.
struct FieldCapture<'a> {
    fields: &'a mut Option<&'static [&'static str]>,
}

impl<'de> de::Deserializer<'de> for FieldCapture<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: de::Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: de::Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.fields = Some(fields);
        Err(de::Error::custom("field list captured"))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

/// Descriptor of the type held by an object-list field.
///
/// Fixed for the lifetime of the field definition; cheap to clone and safe
/// to share across threads.
pub struct ElementType<T> {
    type_name: &'static str,
    strategy: Arc<dyn SerializationStrategy<T>>,
}

impl<T: 'static> ElementType<T> {
    /// Register `T` with an explicit strategy.
    pub fn with_strategy(strategy: impl SerializationStrategy<T> + 'static) -> Self {
        Self {
            type_name: short_type_name::<T>(),
            strategy: Arc::new(strategy),
        }
    }

    /// Override the display name used in error messages.
    pub fn named(mut self, type_name: &'static str) -> Self {
        self.type_name = type_name;
        self
    }

    /// Name used in error messages.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Strategy variant this type was registered with.
    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub(crate) fn strategy(&self) -> &dyn SerializationStrategy<T> {
        self.strategy.as_ref()
    }
}

impl<T: CustomSerialization + 'static> ElementType<T> {
    /// Register `T` with its own serialize/deserialize pair.
    pub fn custom() -> Self {
        Self::with_strategy(CustomCodec)
    }
}

impl<T: Serialize + DeserializeOwned + 'static> ElementType<T> {
    /// Register `T` with the JSON field-dump strategy.
    pub fn field_dump() -> Self {
        Self::with_strategy(FieldDumpCodec)
    }
}

impl<T> Clone for ElementType<T> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            strategy: Arc::clone(&self.strategy),
        }
    }
}

impl<T> fmt::Debug for ElementType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementType")
            .field("type_name", &self.type_name)
            .field("strategy", &self.strategy.kind())
            .finish()
    }
}

/// Last path segment of `std::any::type_name`, generics included.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host record and object-list property
//!
//! A [`Record`] is what the storage layer sees: a key plus named slots, each
//! holding a list of strings. An [`ObjectListProperty`] intercepts one named
//! slot and presents it as a list of typed items.

use crate::codec::{CodecOptions, TypedListCodec};
use crate::element::ElementType;
use crate::error::CodecError;
use crate::field::StorageHooks;
use crate::store::RecordStore;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;

/// A stored entity: key plus string-list slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    key: String,
    slots: BTreeMap<String, Vec<String>>,
}

impl Record {
    /// Create an empty record
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            slots: BTreeMap::new(),
        }
    }

    /// Rebuild a record from raw slots (used by storage backends).
    pub fn from_slots(key: impl Into<String>, slots: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            key: key.into(),
            slots,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw stored values of a slot, if it was ever written.
    pub fn slot(&self, field: &str) -> Option<&[String]> {
        self.slots.get(field).map(Vec::as_slice)
    }

    /// Overwrite a slot.
    pub fn set_slot(&mut self, field: impl Into<String>, values: Vec<String>) {
        self.slots.insert(field.into(), values);
    }

    /// Iterate over all slots in field-name order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// A record field holding a list of typed items.
///
/// Reads and writes go through the field's [`StorageHooks`]; the record
/// itself only ever holds strings.
#[derive(Debug, Clone)]
pub struct ObjectListProperty<T> {
    codec: TypedListCodec<T>,
}

impl<T: 'static> ObjectListProperty<T> {
    /// Define a property for `field` holding items of `element`.
    pub fn new(
        field: impl Into<String>,
        element: ElementType<T>,
        options: CodecOptions,
    ) -> Result<Self, CodecError> {
        Ok(Self {
            codec: TypedListCodec::new(field, element, options)?,
        })
    }

    pub fn codec(&self) -> &TypedListCodec<T> {
        &self.codec
    }

    pub fn field(&self) -> &str {
        self.codec.field_name()
    }

    /// Forward this field's options to a storage backend.
    pub fn register(&self, store: &impl RecordStore) -> Result<()> {
        store.register_field(self.codec.field_name(), self.codec.options())
    }

    /// Read the field. A slot that was never written reads as empty.
    pub fn get(&self, record: &Record) -> Result<Vec<T>, CodecError> {
        let items = self
            .codec
            .decode_from_storage(record.slot(self.codec.field_name()))?;
        tracing::trace!(
            "Decoded {} items from {}.{}",
            items.len(),
            record.key(),
            self.codec.field_name()
        );
        Ok(items)
    }

    /// Write the field. The record is left untouched if encoding fails.
    pub fn set(&self, record: &mut Record, items: &[T]) -> Result<(), CodecError> {
        let stored = self.codec.encode_for_storage(Some(items))?;
        tracing::trace!(
            "Encoded {} items into {}.{}",
            stored.len(),
            record.key(),
            self.codec.field_name()
        );
        record.set_slot(self.codec.field_name(), stored);
        Ok(())
    }

    /// Validate untyped values, then write them.
    pub fn set_untyped(
        &self,
        record: &mut Record,
        items: Vec<Box<dyn Any>>,
    ) -> Result<(), CodecError> {
        let items = self.codec.validate(items)?;
        self.set(record, &items)
    }

    /// Append one item to the field.
    pub fn append(&self, record: &mut Record, item: T) -> Result<(), CodecError> {
        let mut items = self.get(record)?;
        items.push(item);
        self.set(record, &items)
    }

    /// Clear the field.
    pub fn clear(&self, record: &mut Record) {
        record.set_slot(self.codec.field_name(), Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ValueKind;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Tag {
        label: String,
    }

    fn tag(label: &str) -> Tag {
        Tag {
            label: label.to_string(),
        }
    }

    fn tags_property() -> ObjectListProperty<Tag> {
        ObjectListProperty::new("tags", ElementType::field_dump(), CodecOptions::new()).unwrap()
    }

    #[test]
    fn test_get_unwritten_field_is_empty() {
        let record = Record::new("r1");
        assert!(tags_property().get(&record).unwrap().is_empty());
    }

    #[test]
    fn test_set_then_get() {
        let prop = tags_property();
        let mut record = Record::new("r1");

        prop.set(&mut record, &[tag("a"), tag("b")]).unwrap();
        assert_eq!(
            record.slot("tags").unwrap(),
            &[r#"{"label":"a"}"#.to_string(), r#"{"label":"b"}"#.to_string()]
        );
        assert_eq!(prop.get(&record).unwrap(), vec![tag("a"), tag("b")]);
    }

    #[test]
    fn test_append() {
        let prop = tags_property();
        let mut record = Record::new("r1");

        prop.append(&mut record, tag("first")).unwrap();
        prop.append(&mut record, tag("second")).unwrap();

        assert_eq!(
            prop.get(&record).unwrap(),
            vec![tag("first"), tag("second")]
        );
    }

    #[test]
    fn test_failed_set_leaves_record_untouched() {
        let prop = tags_property();
        let mut record = Record::new("r1");
        prop.set(&mut record, &[tag("keep")]).unwrap();

        let err = prop.set(&mut record, &[tag(&"x".repeat(600))]).unwrap_err();
        assert!(matches!(err, CodecError::EncodingOverflow { .. }));
        assert_eq!(prop.get(&record).unwrap(), vec![tag("keep")]);
    }

    #[test]
    fn test_text_property_accepts_large_items() {
        let prop = ObjectListProperty::<Tag>::new(
            "notes",
            ElementType::field_dump(),
            CodecOptions::new().value_kind(ValueKind::Text),
        )
        .unwrap();
        let mut record = Record::new("r1");
        prop.set(&mut record, &[tag(&"x".repeat(600))]).unwrap();
        assert_eq!(prop.get(&record).unwrap()[0].label.len(), 600);
    }

    #[test]
    fn test_set_untyped_rejects_foreign_items() {
        let prop = tags_property();
        let mut record = Record::new("r1");

        let items: Vec<Box<dyn Any>> = vec![Box::new(tag("ok")), Box::new(42u32)];
        let err = prop.set_untyped(&mut record, items).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { index: 1, .. }));
        assert!(record.slot("tags").is_none());

        let items: Vec<Box<dyn Any>> = vec![Box::new(tag("ok"))];
        prop.set_untyped(&mut record, items).unwrap();
        assert_eq!(prop.get(&record).unwrap(), vec![tag("ok")]);
    }

    #[test]
    fn test_clear() {
        let prop = tags_property();
        let mut record = Record::new("r1");
        prop.set(&mut record, &[tag("a")]).unwrap();
        prop.clear(&mut record);
        assert!(prop.get(&record).unwrap().is_empty());
    }

    #[test]
    fn test_properties_do_not_share_slots() {
        let tags = tags_property();
        let labels =
            ObjectListProperty::<Tag>::new("labels", ElementType::field_dump(), CodecOptions::new())
                .unwrap();
        let mut record = Record::new("r1");

        tags.set(&mut record, &[tag("t")]).unwrap();
        labels.set(&mut record, &[tag("l1"), tag("l2")]).unwrap();

        assert_eq!(tags.get(&record).unwrap().len(), 1);
        assert_eq!(labels.get(&record).unwrap().len(), 2);
        assert_eq!(record.slots().count(), 2);
    }
}

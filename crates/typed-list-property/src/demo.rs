// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Demonstration model
//!
//! A `Requesters` record with two object-list fields:
//!
//! - `records` -- [`RequestRecord`], stored with the field-dump strategy
//! - `salts` -- [`Salt`], stored with its own `@`-separated form

use crate::config::Config;
use crate::element::{CustomSerialization, ElementType};
use crate::error::{CodecError, ItemError};
use crate::record::{ObjectListProperty, Record};
use crate::store::RecordStore;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Key of the single demo record.
pub const REQUESTERS_KEY: &str = "requesters";

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// One observed request. Every field has a JSON form, so the default
/// strategy is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub user_agent: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub referer: Option<String>,
    /// Unix seconds
    pub timestamp: f64,
}

impl RequestRecord {
    /// Record a request seen now.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            email: None,
            referer: None,
            timestamp: now_secs(),
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_referer(mut self, referer: Option<String>) -> Self {
        self.referer = referer;
        self
    }
}

/// A growing list of four-digit values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt {
    values: Vec<u32>,
}

impl Salt {
    /// Start a salt with one fresh value.
    pub fn generate() -> Self {
        Self::from_values(Vec::new()).extended()
    }

    pub fn from_values(values: Vec<u32>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Append one fresh value in `1000..=9999`.
    pub fn extended(mut self) -> Self {
        self.values.push(fastrand::u32(1000..=9999));
        self
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join(" "))
    }
}

impl CustomSerialization for Salt {
    fn serialize_item(&self) -> String {
        let parts: Vec<String> = self.values.iter().map(u32::to_string).collect();
        parts.join("@")
    }

    fn deserialize_item(raw: &str) -> Result<Self, ItemError> {
        if raw.is_empty() {
            return Ok(Self::from_values(Vec::new()));
        }
        let values = raw
            .split('@')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|e| ItemError::custom(format!("bad salt value '{}': {}", part, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_values(values))
    }
}

/// Field definitions of the demo model.
#[derive(Debug, Clone)]
pub struct Requesters {
    pub records: ObjectListProperty<RequestRecord>,
    pub salts: ObjectListProperty<Salt>,
}

impl Requesters {
    /// Define both fields under `config`'s policy.
    ///
    /// With `require_custom_serialization` set this fails for `records`,
    /// whose element type relies on the field dump.
    pub fn define(config: &Config) -> Result<Self, CodecError> {
        let options = config.codec_options();
        Ok(Self {
            records: ObjectListProperty::new("records", ElementType::field_dump(), options)?,
            salts: ObjectListProperty::new("salts", ElementType::custom(), options)?,
        })
    }

    /// Forward field options to the store.
    pub fn register(&self, store: &impl RecordStore) -> Result<()> {
        self.records.register(store)?;
        self.salts.register(store)
    }

    /// Load the demo record, or start a fresh one.
    pub fn load(&self, store: &impl RecordStore) -> Result<Record> {
        Ok(store
            .get(REQUESTERS_KEY)?
            .unwrap_or_else(|| Record::new(REQUESTERS_KEY)))
    }

    /// Log one request: seed a salt if none exists, append the request,
    /// persist. Returns the stored record.
    pub fn visit(&self, store: &impl RecordStore, request: RequestRecord) -> Result<Record> {
        let mut record = self.load(store)?;

        if self.salts.get(&record)?.is_empty() {
            tracing::info!("Seeding salt for {}", record.key());
            self.salts.append(&mut record, Salt::generate())?;
        }
        self.records.append(&mut record, request)?;

        store.put(&record)?;
        Ok(record)
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SQLite record backend
//!
//! Stores each list element as its own row so element order survives a
//! write/read round trip exactly.

use crate::field::{FieldOptions, ValueKind};
use crate::record::Record;
use crate::store::RecordStore;
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// SQLite record store
///
/// Thread-safe via internal Mutex (SQLite Connection is not Sync).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE records (key TEXT PRIMARY KEY);
/// CREATE TABLE fields (
///     name TEXT PRIMARY KEY,
///     indexed INTEGER NOT NULL,
///     value_kind TEXT NOT NULL
/// );
/// CREATE TABLE slots (
///     record_key TEXT NOT NULL,
///     field TEXT NOT NULL,
///     PRIMARY KEY (record_key, field)
/// );
/// CREATE TABLE list_values (
///     record_key TEXT NOT NULL,
///     field TEXT NOT NULL,
///     position INTEGER NOT NULL,
///     value TEXT NOT NULL,
///     PRIMARY KEY (record_key, field, position)
/// );
/// ```
///
/// Indexed fields get a partial index on `list_values(value)`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store with a file-based database
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database at {}", path))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to create in-memory SQLite database")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection mutex poisoned"))
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY
            );
            CREATE TABLE IF NOT EXISTS fields (
                name TEXT PRIMARY KEY,
                indexed INTEGER NOT NULL,
                value_kind TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS slots (
                record_key TEXT NOT NULL,
                field TEXT NOT NULL,
                PRIMARY KEY (record_key, field)
            );
            CREATE TABLE IF NOT EXISTS list_values (
                record_key TEXT NOT NULL,
                field TEXT NOT NULL,
                position INTEGER NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (record_key, field, position)
            );",
        )
        .context("Failed to initialize schema")?;

        Ok(())
    }

    /// Registered options for a field, if any
    pub fn field_options(&self, field: &str) -> Result<Option<FieldOptions>> {
        let conn = self.lock()?;
        Self::load_field_options(&conn, field)
    }

    fn load_field_options(conn: &Connection, field: &str) -> Result<Option<FieldOptions>> {
        let row = conn
            .query_row(
                "SELECT indexed, value_kind FROM fields WHERE name = ?1",
                [field],
                |row| Ok((row.get::<_, bool>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            Some((indexed, kind)) => Ok(Some(FieldOptions {
                indexed,
                value_kind: parse_value_kind(&kind)?,
            })),
            None => Ok(None),
        }
    }
}

fn value_kind_name(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::ShortString => "short_string",
        ValueKind::Text => "text",
    }
}

fn parse_value_kind(name: &str) -> Result<ValueKind> {
    match name {
        "short_string" => Ok(ValueKind::ShortString),
        "text" => Ok(ValueKind::Text),
        other => bail!("Unknown value kind '{}' in fields table", other),
    }
}

/// Field names end up in index names, so keep them to identifier characters.
fn check_field_name(field: &str) -> Result<()> {
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!(
            "Invalid field name '{}' (expected ASCII letters, digits or '_')",
            field
        );
    }
    Ok(())
}

impl RecordStore for SqliteStore {
    fn register_field(&self, field: &str, options: FieldOptions) -> Result<()> {
        check_field_name(field)?;
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO fields (name, indexed, value_kind) VALUES (?1, ?2, ?3)",
            params![field, options.indexed, value_kind_name(options.value_kind)],
        )?;

        let index = format!("idx_values_{}", field);
        if options.indexed {
            conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS {} ON list_values(value) WHERE field = '{}'",
                    index, field
                ),
                [],
            )?;
        } else {
            conn.execute(&format!("DROP INDEX IF EXISTS {}", index), [])?;
        }

        tracing::debug!(
            "Registered field {} (indexed={}, kind={:?})",
            field,
            options.indexed,
            options.value_kind
        );
        Ok(())
    }

    fn put(&self, record: &Record) -> Result<()> {
        let mut conn = self.lock()?;

        for (field, values) in record.slots() {
            let options = Self::load_field_options(&conn, field)?.unwrap_or_default();
            if let Some(limit) = options.value_kind.max_chars() {
                if let Some(value) = values.iter().find(|v| v.chars().count() > limit) {
                    bail!(
                        "Value of {} characters exceeds the {}-character limit of field '{}'",
                        value.chars().count(),
                        limit,
                        field
                    );
                }
            }
        }

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM list_values WHERE record_key = ?1", [record.key()])?;
        tx.execute("DELETE FROM slots WHERE record_key = ?1", [record.key()])?;
        tx.execute(
            "INSERT OR IGNORE INTO records (key) VALUES (?1)",
            [record.key()],
        )?;
        {
            let mut slot_stmt =
                tx.prepare("INSERT INTO slots (record_key, field) VALUES (?1, ?2)")?;
            let mut value_stmt = tx.prepare(
                "INSERT INTO list_values (record_key, field, position, value)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;

            for (field, values) in record.slots() {
                slot_stmt.execute(params![record.key(), field])?;
                for (position, value) in values.iter().enumerate() {
                    value_stmt.execute(params![record.key(), field, position as i64, value])?;
                }
            }
        }
        tx.commit()?;

        tracing::debug!("Stored record {}", record.key());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Record>> {
        let conn = self.lock()?;

        let exists = conn
            .query_row("SELECT 1 FROM records WHERE key = ?1", [key], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Ok(None);
        }

        let mut slots: BTreeMap<String, Vec<String>> = BTreeMap::new();

        let mut stmt = conn.prepare("SELECT field FROM slots WHERE record_key = ?1")?;
        for field in stmt.query_map([key], |row| row.get::<_, String>(0))? {
            slots.insert(field?, Vec::new());
        }

        let mut stmt = conn.prepare(
            "SELECT field, value FROM list_values
             WHERE record_key = ?1
             ORDER BY field ASC, position ASC",
        )?;
        let rows = stmt.query_map([key], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (field, value) = row?;
            slots.entry(field).or_default().push(value);
        }

        Ok(Some(Record::from_slots(key, slots)))
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM list_values WHERE record_key = ?1", [key])?;
        tx.execute("DELETE FROM slots WHERE record_key = ?1", [key])?;
        let removed = tx.execute("DELETE FROM records WHERE key = ?1", [key])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM records ORDER BY key ASC")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn find_keys(&self, field: &str, value: &str) -> Result<Vec<String>> {
        let conn = self.lock()?;

        match Self::load_field_options(&conn, field)? {
            Some(options) if options.indexed => {}
            _ => bail!("Field '{}' is not indexed", field),
        }

        let mut stmt = conn.prepare(
            "SELECT DISTINCT record_key FROM list_values
             WHERE field = ?1 AND value = ?2
             ORDER BY record_key ASC",
        )?;
        let keys = stmt
            .query_map(params![field, value], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;

        Ok(count as usize)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "DELETE FROM list_values;
             DELETE FROM slots;
             DELETE FROM records;",
        )?;
        Ok(())
    }
}

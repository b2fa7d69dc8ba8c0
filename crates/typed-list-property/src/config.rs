// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object-list field configuration

use crate::codec::CodecOptions;
use crate::field::{FieldOptions, ValueKind};
use serde::{Deserialize, Serialize};

/// Deployment configuration for object-list fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path
    pub db_path: String,

    /// Refuse element types without their own serialize/deserialize pair
    pub require_custom_serialization: bool,

    /// Stored value representation
    pub value_kind: ValueKind,

    /// Ask the backend to index stored values
    pub indexed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "typed_list.db".to_string(),
            require_custom_serialization: false,
            value_kind: ValueKind::ShortString,
            indexed: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Storage options forwarded to every field
    pub fn field_options(&self) -> FieldOptions {
        FieldOptions {
            indexed: self.indexed,
            value_kind: self.value_kind,
        }
    }

    /// Codec options for every field
    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            require_custom_serialization: self.require_custom_serialization,
            field: self.field_options(),
        }
    }
}

/// Config builder for fluent API
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    db_path: Option<String>,
    require_custom_serialization: Option<bool>,
    value_kind: Option<ValueKind>,
    indexed: Option<bool>,
}

impl ConfigBuilder {
    /// Set database path
    pub fn db_path(mut self, path: impl Into<String>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// Require custom serialization on element types (default: false)
    pub fn require_custom_serialization(mut self, require: bool) -> Self {
        self.require_custom_serialization = Some(require);
        self
    }

    /// Set stored value representation
    pub fn value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = Some(kind);
        self
    }

    /// Index stored values (default: false)
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = Some(indexed);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        let defaults = Config::default();

        Config {
            db_path: self.db_path.unwrap_or(defaults.db_path),
            require_custom_serialization: self
                .require_custom_serialization
                .unwrap_or(defaults.require_custom_serialization),
            value_kind: self.value_kind.unwrap_or(defaults.value_kind),
            indexed: self.indexed.unwrap_or(defaults.indexed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .db_path("/tmp/lists.db")
            .require_custom_serialization(true)
            .value_kind(ValueKind::Text)
            .indexed(true)
            .build();

        assert_eq!(config.db_path, "/tmp/lists.db");
        assert!(config.require_custom_serialization);

        let options = config.codec_options();
        assert!(options.require_custom_serialization);
        assert!(options.field.indexed);
        assert_eq!(options.field.value_kind, ValueKind::Text);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.db_path, "typed_list.db");
        assert!(!config.require_custom_serialization);
        assert_eq!(config.field_options(), FieldOptions::default());
    }

    #[test]
    fn test_config_from_json() {
        let config: Config = serde_json::from_str(
            r#"{
                "db_path": "app.db",
                "require_custom_serialization": false,
                "value_kind": "text",
                "indexed": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.value_kind, ValueKind::Text);
        assert!(config.indexed);
    }
}

use std::path::PathBuf;

use serde::Deserialize;
use serde_tagged::Limits;
use tagged_schema::Schema;

pub mod setup;

#[derive(Debug, Deserialize)]
pub struct IntakeConfig {
    #[serde(default)]
    pub limits: LimitsConfig,
    pub schema: Schema,
    #[serde(default)]
    pub audit: AuditConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub log: log4rs::config::RawConfig,
}

/// Decoder bounds, see [`Limits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_depth: usize,
    pub max_elements: usize,
    pub max_input_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let Limits {
            max_depth,
            max_elements,
            max_input_len,
        } = Limits::DEFAULT;

        Self {
            max_depth,
            max_elements,
            max_input_len,
        }
    }
}

impl From<LimitsConfig> for Limits {
    fn from(value: LimitsConfig) -> Self {
        Self::new()
            .with_max_depth(value.max_depth)
            .with_max_elements(value.max_elements)
            .with_max_input_len(value.max_input_len)
    }
}

const fn default_preview_len() -> usize {
    48
}

fn default_source() -> String {
    "cli".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Name of the channel payloads arrive through. Each payload's source is
    /// this joined with its path.
    #[serde(default = "default_source")]
    pub source: String,
    /// How many leading payload bytes to include in audit entries.
    #[serde(default = "default_preview_len")]
    pub preview_len: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            preview_len: default_preview_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// File accepted records are appended to, one JSON object per line.
    pub path: PathBuf,
    /// Keep accepted records in memory only and leave the file untouched.
    #[serde(default)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use tagged_schema::{FieldKind, Range};

    use super::setup::{Builder, Env, TomlText};
    use super::*;

    const DEFAULT: &str = include_str!("../../assets/default_config.toml");

    #[test]
    fn default_config_loads() {
        let config: IntakeConfig = Builder::new()
            .add_layer(TomlText::new(DEFAULT))
            .build()
            .expect("default config must be valid");

        assert_eq!(Limits::from(config.limits), Limits::DEFAULT);
        assert_eq!(config.audit.source, "cli");
        assert_eq!(config.store.path, PathBuf::from("inventory.jsonl"));
        assert!(!config.store.dry_run, "records must be stored by default");

        let names: Vec<&str> = config.schema.fields.keys().map(String::as_str).collect();
        assert_eq!(names, ["sku", "name", "quantity", "price"], "fields keep file order");

        let quantity = &config.schema.fields["quantity"];
        assert_eq!(quantity.kind, FieldKind::Int);
        assert_eq!(quantity.range, Some(Range::NonNegative));
    }

    #[test]
    fn env_tightens_limits() {
        let config: IntakeConfig = Builder::new()
            .add_layer(TomlText::new(DEFAULT))
            .add_layer(Env::new("INTAKE").with_vars([
                ("INTAKE__LIMITS__MAX_DEPTH", "4"),
                ("INTAKE__AUDIT__SOURCE", "queue"),
                ("INTAKE__STORE__DRY_RUN", "true"),
            ]))
            .build()
            .expect("config must build");

        assert_eq!(config.limits.max_depth, 4);
        assert_eq!(config.limits.max_elements, Limits::DEFAULT.max_elements);
        assert_eq!(config.audit.source, "queue");
        assert!(config.store.dry_run, "bools are parsed from env values");
    }

    #[test]
    fn env_numeric_text_for_string_settings() {
        let config: IntakeConfig = Builder::new()
            .add_layer(TomlText::new(DEFAULT))
            .add_layer(Env::new("INTAKE").with_vars([
                ("INTAKE__AUDIT__SOURCE", "1"),
                ("INTAKE__STORE__PATH", "2024"),
                ("INTAKE__LIMITS__MAX_ELEMENTS", "100"),
            ]))
            .build()
            .expect("numeric text must fill string settings");

        assert_eq!(config.audit.source, "1");
        assert_eq!(config.store.path, PathBuf::from("2024"));
        assert_eq!(config.limits.max_elements, 100);
    }

    #[test]
    fn later_layers_keep_field_order() {
        let config: IntakeConfig = Builder::new()
            .add_layer(TomlText::new(DEFAULT))
            .add_layer(TomlText::new("[schema.fields.note]\nkind = \"string\"\nrequired = false"))
            .add_layer(TomlText::new("[schema.fields.sku]\nkind = \"string\"\nmax_len = 8"))
            .build()
            .expect("config must build");

        let names: Vec<&str> = config.schema.fields.keys().map(String::as_str).collect();
        assert_eq!(names, ["sku", "name", "quantity", "price", "note"], "new fields go last");
        assert_eq!(config.schema.fields["sku"].max_len, Some(8));
    }

    #[test]
    fn unknown_limit_is_rejected() {
        let res = Builder::new()
            .add_layer(TomlText::new(DEFAULT))
            .add_layer(TomlText::new("[limits]\nmax_dept = 4"))
            .build::<IntakeConfig>();

        assert!(res.is_err(), "typos in limits must not be ignored");
    }
}

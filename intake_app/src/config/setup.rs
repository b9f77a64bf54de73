use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use anyhow::{Context as _, Result};
use serde::de::DeserializeOwned;
use smallvec::SmallVec;
use toml::map::Entry;
use toml::{Table, Value};

/// Provides a layered builder for deserializing configuration files.
#[must_use]
pub struct Builder {
    table: Result<Table>,
}

impl Builder {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        Self {
            table: Ok(Table::new()),
        }
    }

    /// Adds a layer of configuration.
    ///
    /// Layers added later take precedence over earlier ones.
    pub fn add_layer<L: Layer>(mut self, source: L) -> Self {
        self.table = self.table.and_then(|mut t| {
            source.extend_table(&mut t)?;
            Ok(t)
        });
        self
    }

    /// Deserializes the configuration from the provided layers.
    pub fn build<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.table.and_then(deserialize_table)
    }
}

/// A configuration layer.
pub trait Layer {
    /// Extends a TOML table by this layer.
    fn extend_table(&self, table: &mut Table) -> Result<()>;
}

/// A TOML file configuration layer.
#[must_use]
pub struct File {
    path: PathBuf,
    required: bool,
}

impl File {
    /// Creates a new layer, loading TOML from the file at the given path.
    ///
    /// The file is required by default.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
        }
    }

    /// Sets whether the file is required.
    ///
    /// A missing optional file is treated as empty.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// A TOML text configuration layer.
#[must_use]
pub struct TomlText<'a> {
    text: &'a str,
}

impl<'a> TomlText<'a> {
    /// Creates a new layer, parsing the text as TOML.
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }
}

/// An environment variable configuration layer.
///
/// Only variables whose name starts with the prefix followed by `__` are
/// loaded. The rest of the name is lowercased and split at `__` (two
/// underscores) to address nested keys, so with the prefix `INTAKE`,
/// `INTAKE__LIMITS__MAX_DEPTH` refers to `limits.max_depth`.
///
/// A value replacing a string from an earlier layer stays a string. Other
/// values that parse as an integer or a bool are inserted as such, anything
/// else is a string. Values that are not fully valid UTF-8 are converted
/// lossily.
#[must_use]
pub struct Env {
    prefix: String,
    vars: Option<Vec<(OsString, OsString)>>,
}

impl Env {
    /// Creates a new layer reading the process environment.
    pub fn new(prefix: &str) -> Self {
        let mut prefix = prefix.to_ascii_lowercase();
        prefix.push_str("__");

        Self { prefix, vars: None }
    }

    /// Reads the given variables instead of the process environment.
    #[cfg(test)]
    pub fn with_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }
}

impl Layer for File {
    fn extend_table(&self, table: &mut Table) -> Result<()> {
        let file = match fs::read_to_string(&self.path) {
            Ok(content) => deserialize_str_to_table(&content)
                .with_context(|| format!("failed to load config {:?}", self.path))?,
            Err(why) => {
                if !self.required && why.kind() == io::ErrorKind::NotFound {
                    return Ok(());
                }

                return Err(why).context(format!("cannot read required config {:?}", self.path));
            },
        };

        merge_tables(table, file);
        Ok(())
    }
}

impl Layer for TomlText<'_> {
    fn extend_table(&self, table: &mut Table) -> Result<()> {
        let toml = deserialize_str_to_table(self.text).context("toml str literal invalid")?;
        merge_tables(table, toml);
        Ok(())
    }
}

impl Layer for Env {
    fn extend_table(&self, table: &mut Table) -> Result<()> {
        let vars: Box<dyn Iterator<Item = (OsString, OsString)> + '_> = match &self.vars {
            Some(vars) => Box::new(vars.iter().cloned()),
            None => Box::new(env::vars_os()),
        };

        for (key, value) in vars {
            // non-utf8 keys can't name any config key
            let Ok(mut key) = key.into_string() else {
                continue;
            };

            key.make_ascii_lowercase();
            let Some(key) = key.strip_prefix(&self.prefix) else {
                continue;
            };

            let value = value
                .into_string()
                .unwrap_or_else(|o| o.to_string_lossy().into_owned());

            let segments = key.split("__").collect::<SmallVec<[&str; 8]>>();
            insert_at(table, &segments, value);
        }

        Ok(())
    }
}

fn scalar_value(value: String) -> Value {
    if let Ok(int) = value.parse::<i64>() {
        Value::Integer(int)
    } else if let Ok(bool) = value.parse::<bool>() {
        Value::Boolean(bool)
    } else {
        Value::String(value)
    }
}

fn deserialize_str_to_table(text: &str) -> Result<Table> {
    toml::from_str(text).context("config toml is invalid")
}

fn deserialize_table<T>(table: Table) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(table).context("cannot deserialize config")
}

fn merge_tables(target: &mut Table, consume: Table) {
    for (key, value) in consume {
        match target.entry(key) {
            Entry::Vacant(entry) => _ = entry.insert(value),
            Entry::Occupied(mut entry) => match (entry.get_mut(), value) {
                (Value::Table(a), Value::Table(b)) => merge_tables(a, b),
                (a, b) => *a = b,
            },
        }
    }
}

fn insert_at(table: &mut Table, path: &[&str], raw: String) {
    let [first, path @ ..] = path else {
        return;
    };

    match table.entry(*first) {
        Entry::Vacant(entry) => _ = entry.insert(nested_value(path, scalar_value(raw))),
        Entry::Occupied(mut entry) => match entry.get_mut() {
            Value::Table(table) if !path.is_empty() => insert_at(table, path, raw),
            Value::String(old) if path.is_empty() => *old = raw,
            entry => *entry = nested_value(path, scalar_value(raw)),
        },
    }
}

/// Wraps `value` in one table per path segment, innermost last.
fn nested_value(path: &[&str], value: Value) -> Value {
    path.iter().rev().fold(value, |value, &segment| {
        let mut table = Table::new();
        table.insert(segment.to_owned(), value);
        Value::Table(table)
    })
}

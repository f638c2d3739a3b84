//! Key-value settings accessor contract and backends.
//!
//! The UI-building collaborator binds schema entries to an accessor; the
//! library itself only needs it for the default-value helpers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::setup::Setup;

/// Storage backend for settings values.
pub trait SettingsAccessor {
    fn contains(&self, key: &str) -> bool;

    fn load(&self, key: &str) -> Option<Value>;

    fn load_or(&self, key: &str, default: Value) -> Value {
        self.load(key).unwrap_or(default)
    }

    fn save(&mut self, key: &str, value: Value);

    fn remove(&mut self, key: &str);

    /// Flush pending changes to the underlying storage.
    fn sync(&mut self) -> Result<()>;
}

/// In-memory accessor, mainly for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsAccessor {
    values: BTreeMap<String, Value>,
}

impl MemorySettingsAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

impl SettingsAccessor for MemorySettingsAccessor {
    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn load(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Accessor persisting values as a flat JSON object in one file.
///
/// Values are kept in memory until `sync` writes them out.
#[derive(Debug)]
pub struct JsonSettingsAccessor {
    path: PathBuf,
    values: BTreeMap<String, Value>,
    dirty: bool,
}

impl JsonSettingsAccessor {
    /// Open a settings file, reading existing values if the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Settings file {} is not valid JSON", path.display()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsAccessor for JsonSettingsAccessor {
    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn load(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        self.dirty = true;
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.dirty = true;
        }
    }

    fn sync(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings file {}", self.path.display()))?;
        self.dirty = false;
        Ok(())
    }
}

/// Write the setup's entry default values into an accessor.
///
/// Only entries declaring a default are considered; existing keys are kept
/// unless `overwrite` is set. Returns the number of values written.
pub fn apply_defaults(setup: &Setup, accessor: &mut dyn SettingsAccessor, overwrite: bool) -> usize {
    let mut written = 0;
    for entry in setup.entries() {
        let Some(value) = &entry.default_value else {
            continue;
        };
        if overwrite || !accessor.contains(&entry.key) {
            accessor.save(&entry.key, value.clone());
            written += 1;
        }
    }
    written
}

/// Remove every key declared by the setup's entries. Returns the number of
/// keys removed.
pub fn reset_to_defaults(setup: &Setup, accessor: &mut dyn SettingsAccessor) -> usize {
    let mut removed = 0;
    for entry in setup.entries() {
        if accessor.contains(&entry.key) {
            accessor.remove(&entry.key);
            removed += 1;
        }
    }
    removed
}

//! Local key/value persistence for user preferences.
//!
//! Reads never fail: a missing or unparsable value means "use the default".
//! Unparsable values and unreadable files are logged at `warn`.

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::error::WeatherError;

pub const THEME_KEY: &str = "skypulse-theme";
pub const UNIT_KEY: &str = "skypulse-unit";
pub const FAVORITES_KEY: &str = "skypulse-favorites";
pub const LAST_LOCATION_KEY: &str = "skypulse-last-location";

/// String-valued storage, one entry per preference.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Volatile store, used in tests and when no data directory is available.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All entries in a single JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing or corrupt file starts out empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "settings file is corrupt, starting fresh"
                );
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "settings file is unreadable, starting fresh"
                );
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize settings")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write settings file: {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// Decode a JSON value stored under `key`, or fall back to `T::default()`.
pub fn read_json_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match try_read_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(err) => {
            tracing::warn!(%err, "using default");
            T::default()
        }
    }
}

/// `Ok(None)` when nothing is stored; `StorageParse` when something unreadable is.
pub fn try_read_json<T, S>(store: &S, key: &str) -> Result<Option<T>, WeatherError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key) else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| WeatherError::StorageParse {
            key: key.to_string(),
            message: e.to_string(),
        })
}

/// Parse a plain string value stored under `key`, or fall back to `T::default()`.
pub fn read_parsed_or_default<T, S>(store: &S, key: &str) -> T
where
    T: for<'a> TryFrom<&'a str, Error = anyhow::Error> + Default,
    S: KeyValueStore + ?Sized,
{
    match try_read_parsed(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(err) => {
            tracing::warn!(%err, "using default");
            T::default()
        }
    }
}

/// Like [`try_read_json`] for values stored as bare strings.
pub fn try_read_parsed<T, S>(store: &S, key: &str) -> Result<Option<T>, WeatherError>
where
    T: for<'a> TryFrom<&'a str, Error = anyhow::Error>,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key) else {
        return Ok(None);
    };

    T::try_from(raw.as_str())
        .map(Some)
        .map_err(|e| WeatherError::StorageParse {
            key: key.to_string(),
            message: e.to_string(),
        })
}

pub fn write_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize value for '{key}'"))?;
    store.set(key, &json)
}

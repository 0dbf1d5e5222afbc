//! `server.properties` reader and writer.
//!
//! Saving rewrites values in place and keeps comments, blank lines and any
//! line it does not understand exactly where they were. Keys that are new are
//! appended at the end, and keys removed from the set are dropped from the file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the server's key/value settings.
pub const PROPERTIES_FILE: &str = "server.properties";

/// Errors from reading or writing the properties file.
#[derive(thiserror::Error, Debug)]
pub enum PropertiesError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Ordered key/value pairs, plus the keys removed since loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
    removed: Vec<String>,
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties text. Blank lines, `#` comments and lines without
    /// `=` are skipped. Later duplicates overwrite earlier ones.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut properties = Self::new();
        for line in content.lines() {
            if let Some((key, value)) = parse_line(line) {
                properties.set(key, value);
            }
        }
        properties
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a value, keeping the key's position if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.removed.retain(|k| *k != key);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove `key`. Saving afterwards deletes its line from the file, even
    /// if this set never held the key.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        if !self.is_removed(key) {
            self.removed.push(key.to_string());
        }
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    #[must_use]
    pub fn is_removed(&self, key: &str) -> bool {
        self.removed.iter().any(|k| k == key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Key and value of a `key=value` line; `None` for comments and blanks.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// Merge `properties` into existing file text.
#[must_use]
pub fn render(existing: &str, properties: &Properties) -> String {
    let mut written: HashSet<&str> = HashSet::new();
    let mut out = String::with_capacity(existing.len());

    for line in existing.lines() {
        match parse_line(line) {
            Some((key, _)) if properties.is_removed(key) => continue,
            Some((key, _)) => match properties.get(key) {
                Some(value) => {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(value);
                    written.insert(key);
                }
                // Unknown to the caller: keep it untouched.
                None => out.push_str(line),
            },
            None => out.push_str(line),
        }
        out.push('\n');
    }

    for (key, value) in properties.iter() {
        if !written.contains(key) {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
    }
    out
}

/// The properties file of one server directory.
#[derive(Debug, Clone)]
pub struct ServerProperties {
    path: PathBuf,
}

impl ServerProperties {
    #[must_use]
    pub fn new(server_dir: &Path) -> Self {
        Self {
            path: server_dir.join(PROPERTIES_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all properties. A missing file yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self) -> Result<Properties, PropertiesError> {
        Ok(Properties::parse(&self.read_existing()?))
    }

    /// Write `properties` back, preserving comments and line order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn save(&self, properties: &Properties) -> Result<(), PropertiesError> {
        let content = render(&self.read_existing()?, properties);
        fs::write(&self.path, content).map_err(|e| PropertiesError::Write {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), count = properties.len(), "Saved properties");
        Ok(())
    }

    fn read_existing(&self) -> Result<String, PropertiesError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(PropertiesError::Read {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

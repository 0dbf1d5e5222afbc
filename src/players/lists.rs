//! Whitelist and ban list files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::PlayerError;
use super::resolver::IdentityResolver;

pub const WHITELIST_FILE: &str = "whitelist.json";
pub const BANNED_PLAYERS_FILE: &str = "banned-players.json";

/// Reason recorded when none is given.
pub const DEFAULT_BAN_REASON: &str = "Banned by operator";

const WHITELIST: &str = "whitelist";
const BAN_LIST: &str = "ban list";

/// Timestamp format used in `banned-players.json`.
const BAN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// A `whitelist.json` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub uuid: String,
    pub name: String,
}

/// A `banned-players.json` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanEntry {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub created: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_expires")]
    pub expires: String,
    #[serde(default)]
    pub reason: String,
}

fn default_source() -> String {
    "Console".to_string()
}

fn default_expires() -> String {
    "forever".to_string()
}

impl BanEntry {
    /// A permanent console ban created now.
    #[must_use]
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            created: Local::now().format(BAN_TIME_FORMAT).to_string(),
            source: default_source(),
            expires: default_expires(),
            reason: reason.into(),
        }
    }
}

/// Anything listed by player name.
trait Named {
    fn name(&self) -> &str;
}

impl Named for WhitelistEntry {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for BanEntry {
    fn name(&self) -> &str {
        &self.name
    }
}

fn position_of<T: Named>(entries: &[T], name: &str) -> Option<usize> {
    entries
        .iter()
        .position(|entry| entry.name().eq_ignore_ascii_case(name))
}

/// The whitelist and ban list of one server directory.
#[derive(Debug, Clone)]
pub struct PlayerLists {
    whitelist_path: PathBuf,
    banned_path: PathBuf,
}

impl PlayerLists {
    #[must_use]
    pub fn new(server_dir: &Path) -> Self {
        Self {
            whitelist_path: server_dir.join(WHITELIST_FILE),
            banned_path: server_dir.join(BANNED_PLAYERS_FILE),
        }
    }

    /// Current whitelist. Missing or malformed files read as empty.
    #[must_use]
    pub fn whitelist(&self) -> Vec<WhitelistEntry> {
        load_list(&self.whitelist_path)
    }

    /// Current ban list. Missing or malformed files read as empty.
    #[must_use]
    pub fn banned(&self) -> Vec<BanEntry> {
        load_list(&self.banned_path)
    }

    /// Resolve `name` and add it to the whitelist.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyListed` if present (case-insensitive), `UnresolvedName`
    /// if the resolver has no UUID for the name, or a write error.
    pub async fn add_to_whitelist(
        &self,
        resolver: &dyn IdentityResolver,
        name: &str,
    ) -> Result<WhitelistEntry, PlayerError> {
        let mut whitelist = self.whitelist();
        if position_of(&whitelist, name).is_some() {
            return Err(PlayerError::AlreadyListed {
                name: name.to_string(),
                list: WHITELIST,
            });
        }

        let uuid = resolver
            .resolve(name)
            .await
            .ok_or_else(|| PlayerError::UnresolvedName(name.to_string()))?;

        let entry = WhitelistEntry {
            uuid: uuid.hyphenated().to_string(),
            name: name.to_string(),
        };
        whitelist.push(entry.clone());
        save_list(&self.whitelist_path, &whitelist)?;
        tracing::info!(name, uuid = %entry.uuid, "Added player to whitelist");
        Ok(entry)
    }

    /// Remove `name` from the whitelist.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the player is not whitelisted, or a write error.
    pub fn remove_from_whitelist(&self, name: &str) -> Result<WhitelistEntry, PlayerError> {
        let mut whitelist = self.whitelist();
        let index = position_of(&whitelist, name).ok_or_else(|| PlayerError::NotFound {
            name: name.to_string(),
            list: WHITELIST,
        })?;

        let removed = whitelist.remove(index);
        save_list(&self.whitelist_path, &whitelist)?;
        tracing::info!(name = %removed.name, "Removed player from whitelist");
        Ok(removed)
    }

    /// Resolve `name` and add a permanent ban.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyListed` if already banned, `UnresolvedName` if the
    /// resolver has no UUID for the name, or a write error.
    pub async fn ban(
        &self,
        resolver: &dyn IdentityResolver,
        name: &str,
        reason: Option<&str>,
    ) -> Result<BanEntry, PlayerError> {
        let mut bans = self.banned();
        if position_of(&bans, name).is_some() {
            return Err(PlayerError::AlreadyListed {
                name: name.to_string(),
                list: BAN_LIST,
            });
        }

        let uuid = resolver
            .resolve(name)
            .await
            .ok_or_else(|| PlayerError::UnresolvedName(name.to_string()))?;

        let entry = BanEntry::new(
            uuid.hyphenated().to_string(),
            name,
            reason.unwrap_or(DEFAULT_BAN_REASON),
        );
        bans.push(entry.clone());
        save_list(&self.banned_path, &bans)?;
        tracing::info!(name, reason = %entry.reason, "Banned player");
        Ok(entry)
    }

    /// Lift a ban on `name`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the player is not banned, or a write error.
    pub fn unban(&self, name: &str) -> Result<BanEntry, PlayerError> {
        let mut bans = self.banned();
        let index = position_of(&bans, name).ok_or_else(|| PlayerError::NotFound {
            name: name.to_string(),
            list: BAN_LIST,
        })?;

        let removed = bans.remove(index);
        save_list(&self.banned_path, &bans)?;
        tracing::info!(name = %removed.name, "Unbanned player");
        Ok(removed)
    }
}

fn load_list<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read player list");
            return Vec::new();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Malformed player list, treating as empty");
        Vec::new()
    })
}

/// Write a list as 4-space indented JSON via a temp file and rename.
fn save_list<T: Serialize>(path: &Path, entries: &[T]) -> Result<(), PlayerError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries.serialize(&mut serializer)?;
    buf.push(b'\n');

    let io_err = |source| PlayerError::Io {
        path: path.to_path_buf(),
        source,
    };
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &buf).map_err(io_err)?;
    fs::rename(&temp_path, path).map_err(io_err)?;
    Ok(())
}

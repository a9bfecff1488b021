//! JSON documents under the data directory: identifier mapping, watchlist,
//! risk profile and last search.

use crate::domain::error::SignalError;
use crate::domain::risk_profile::ProfileName;
use crate::domain::symbol_guess::normalize_identifier;
use crate::ports::mapping_store::MappingStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const MAPPING_FILE: &str = "id_mapping.json";
pub const WATCHLIST_FILE: &str = "watchlist.json";
pub const PROFILE_FILE: &str = "profile.json";
pub const LAST_SEARCH_FILE: &str = "last_search.json";
pub const DEFAULT_LAST_SEARCH: &str = "TTE.PA";

#[derive(Debug, Serialize, Deserialize)]
struct ProfileDoc {
    profile: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LastSearchDoc {
    last: String,
}

#[derive(Debug, Clone)]
pub struct JsonStateStore {
    dir: PathBuf,
}

impl JsonStateStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the data directory and any missing document with its default content.
    pub fn init(&self) -> Result<(), SignalError> {
        fs::create_dir_all(&self.dir).map_err(|e| state_error(&self.dir, e))?;
        self.ensure(MAPPING_FILE, &BTreeMap::<String, String>::new())?;
        self.ensure(WATCHLIST_FILE, &Vec::<String>::new())?;
        self.ensure(
            PROFILE_FILE,
            &ProfileDoc {
                profile: ProfileName::default().to_string(),
            },
        )?;
        self.ensure(
            LAST_SEARCH_FILE,
            &LastSearchDoc {
                last: DEFAULT_LAST_SEARCH.to_string(),
            },
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn ensure<T: Serialize>(&self, file: &str, default: &T) -> Result<(), SignalError> {
        if self.path(file).exists() {
            return Ok(());
        }
        debug!("creating {file}");
        self.write(file, default)
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<T, SignalError> {
        let path = self.path(file);
        let content = fs::read_to_string(&path).map_err(|e| state_error(&path, e))?;
        serde_json::from_str(&content).map_err(|e| state_error(&path, e))
    }

    /// Whole-document rewrite, pretty-printed UTF-8.
    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<(), SignalError> {
        let path = self.path(file);
        let json = serde_json::to_string_pretty(value).map_err(|e| state_error(&path, e))?;
        fs::write(&path, json).map_err(|e| state_error(&path, e))
    }

    pub fn watchlist(&self) -> Result<Vec<String>, SignalError> {
        match self.read(WATCHLIST_FILE) {
            Ok(list) => Ok(list),
            Err(e) if !self.path(WATCHLIST_FILE).exists() => {
                debug!("{e}");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Adds `symbol` (uppercased) unless present. Returns whether the list changed.
    pub fn watch(&self, symbol: &str) -> Result<bool, SignalError> {
        let symbol = normalize_identifier(symbol);
        if symbol.is_empty() {
            return Ok(false);
        }
        let mut list = self.watchlist()?;
        if list.contains(&symbol) {
            return Ok(false);
        }
        list.push(symbol);
        self.write(WATCHLIST_FILE, &list)?;
        Ok(true)
    }

    /// Removes `symbol`. Returns whether it was present.
    pub fn unwatch(&self, symbol: &str) -> Result<bool, SignalError> {
        let symbol = normalize_identifier(symbol);
        let mut list = self.watchlist()?;
        let before = list.len();
        list.retain(|s| *s != symbol);
        if list.len() == before {
            return Ok(false);
        }
        self.write(WATCHLIST_FILE, &list)?;
        Ok(true)
    }

    /// Stored profile; missing, unreadable or unknown names give the default.
    pub fn profile(&self) -> ProfileName {
        match self.read::<ProfileDoc>(PROFILE_FILE) {
            Ok(doc) => ProfileName::from_name_or_default(&doc.profile),
            Err(e) => {
                debug!("{e}; using default profile");
                ProfileName::default()
            }
        }
    }

    pub fn set_profile(&self, profile: ProfileName) -> Result<(), SignalError> {
        self.write(
            PROFILE_FILE,
            &ProfileDoc {
                profile: profile.to_string(),
            },
        )
    }

    pub fn last_search(&self) -> String {
        self.read::<LastSearchDoc>(LAST_SEARCH_FILE)
            .map(|doc| doc.last)
            .unwrap_or_else(|_| DEFAULT_LAST_SEARCH.to_string())
    }

    pub fn set_last_search(&self, identifier: &str) -> Result<(), SignalError> {
        self.write(
            LAST_SEARCH_FILE,
            &LastSearchDoc {
                last: identifier.trim().to_string(),
            },
        )
    }
}

impl MappingStore for JsonStateStore {
    fn load(&self) -> Result<BTreeMap<String, String>, SignalError> {
        if !self.path(MAPPING_FILE).exists() {
            return Ok(BTreeMap::new());
        }
        self.read(MAPPING_FILE).inspect_err(|e| warn!("{e}"))
    }

    fn save(&self, mapping: &BTreeMap<String, String>) -> Result<(), SignalError> {
        self.write(MAPPING_FILE, mapping)
    }
}

fn state_error(path: &Path, e: impl std::fmt::Display) -> SignalError {
    SignalError::State {
        file: path.display().to_string(),
        reason: e.to_string(),
    }
}

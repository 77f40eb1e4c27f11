// ⚙️ Configuration - where the ledger lives and who may borrow
//
// Read from the JSON file named by ENTITY_LEDGER_CONFIG; every field has a
// default so a partial file (or no file) is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::{User, UserStore};
use crate::codec::Format;

pub const CONFIG_ENV: &str = "ENTITY_LEDGER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Record file read on startup and written by `save`
    pub data_file: PathBuf,

    /// SQLite file for the audit journal
    pub journal_file: PathBuf,

    pub format: Format,

    /// Seed credentials for issue/return
    pub users: Vec<User>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            data_file: PathBuf::from("registry.txt"),
            journal_file: PathBuf::from("journal.db"),
            format: Format::default(),
            users: vec![User::new("admin", "admin")],
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// File named by `ENTITY_LEDGER_CONFIG`, or defaults when unset
    pub fn from_env() -> Result<Self> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    pub fn user_store(&self) -> UserStore {
        UserStore::from_users(self.users.iter().cloned())
    }
}

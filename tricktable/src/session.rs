//! Local session persistence for the CLI, the cookie-jar analog of a
//! browser client: a small TOML file next to wherever the CLI runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SESSION_FILE_NAME: &str = "tricktable-session.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// The last room created or joined, so `start`/`watch` can reattach.
    #[serde(default)]
    pub channel_name: Option<String>,
}

impl Session {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading session file '{}'", path.display()))?;
            let session = toml::from_str(&text)
                .with_context(|| format!("parsing session file '{}'", path.display()))?;
            Ok(session)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("creating session directory '{}'", parent.display())
                })?;
            }
        }
        let text = toml::to_string_pretty(self).with_context(|| "serializing session")?;
        fs::write(path, text)
            .with_context(|| format!("writing session file '{}'", path.display()))?;
        Ok(())
    }

    /// Token required for any room operation; points the user at login when
    /// absent.
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no session token; run 'signup' or 'login' first"))
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from(SESSION_FILE_NAME)
    }
}

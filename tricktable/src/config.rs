use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{fs, io};

/// Server configuration persisted as TOML.
///
/// Fields:
/// - port: first port to try when binding (the server scans upward from here)
/// - max_players: membership cap per room
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub port: u16,
    pub max_players: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3001,
            max_players: 5,
        }
    }
}

impl Config {
    /// Load configuration from `path`. If the file does not exist, create it
    /// with defaults and return the default config.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)
                .with_context(|| format!("reading config file '{}'", path.display()))?;
            let cfg: Config = toml::from_str(&s)
                .with_context(|| format!("parsing TOML config '{}'", path.display()))?;
            Ok(cfg)
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("creating config directory '{}'", parent.display())
                    })?;
                }
            }
            let cfg = Config::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    /// Save the current config back to `path` (overwrites).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating config directory '{}'", parent.display()))?;
            }
        }
        let toml_text =
            toml::to_string_pretty(&self).with_context(|| "serializing config to TOML")?;
        fs::write(path, toml_text)
            .with_context(|| format!("writing config to '{}'", path.display()))?;
        Ok(())
    }
}

/// Find the first available port starting from the given port number.
pub fn find_available_port(start_port: u16) -> Result<u16> {
    for port in start_port..start_port.saturating_add(100) {
        match std::net::TcpListener::bind(("127.0.0.1", port)) {
            Ok(_) => return Ok(port),
            Err(ref e) if e.kind() == io::ErrorKind::AddrInUse => continue,
            Err(_) => continue,
        }
    }
    Err(anyhow::anyhow!(
        "no available ports found in range {}..{}",
        start_port,
        start_port.saturating_add(100)
    ))
}

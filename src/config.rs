use crate::files::{ensure_dir, get_currdir, read, revtraverse};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use toml::Table;

/// Name of the configuration file looked up from the working directory upwards.
pub const CONFIG_FILE: &str = ".lightningfmt.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    /// Log filter (`error`, `warn`, `info`, `debug`, `trace`). `RUST_LOG` takes precedence
    pub log_level: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Formatting {
    /// Transform options overlaid on the defaults when formatting on save or on request. The
    /// format and merge command ignores them
    pub overrides: Table,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub formatting: Formatting,
}

impl Config {
    /// Finds the configuration file, opens it and returns the parsed file with its path
    pub fn find() -> Result<(Self, PathBuf), String> {
        let path = revtraverse(get_currdir()?, CONFIG_FILE)
            .map_err(|e| format!("Failed to find {CONFIG_FILE}: {e}"))?;
        Ok((Self::open(&path)?, path))
    }

    /// Opens config file from path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let buf = read(path.as_ref()).map_err(|e| format!("Failed to open config file: {e}"))?;
        toml::from_str(&buf).map_err(|e| format!("Config error: {e}"))
    }

    /// Writes the default configuration into `dir`
    pub fn write_default_to<P: AsRef<Path>>(dir: P) -> Result<PathBuf, String> {
        ensure_dir(dir.as_ref())?;
        let path = dir.as_ref().join(CONFIG_FILE);
        let config = toml::to_string(&Self::default())
            .map_err(|e| format!("Default config serialization failed: {e}"))?;
        File::create(&path)
            .map_err(|e| format!("Failed to create file: {e}"))?
            .write_all(config.as_bytes())
            .map_err(|e| format!("Failed to write config: {e}"))?;
        Ok(path)
    }

    /// Writes the default configuration to the current working directory
    pub fn write_default() -> Result<PathBuf, String> {
        Self::write_default_to(get_currdir()?)
    }
}

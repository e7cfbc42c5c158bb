//! rc-file configuration
//!
//! `~/.taskdeck/rc` holds `key=value` lines. Recognised keys:
//!
//! - `data.location` - database path; relative paths resolve against the rc directory
//! - `list.page_size` - rows per page in list output (default 10)
//! - `user.email` - owner whose projects and services are listed
//!
//! Blank lines and lines starting with `#` are ignored, as are unknown keys.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::list::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_location: Option<PathBuf>,
    pub page_size: usize,
    pub user_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_location: None,
            page_size: DEFAULT_PAGE_SIZE,
            user_email: None,
        }
    }
}

impl Config {
    /// Home directory; `$HOME` wins so tests can redirect it
    pub fn home_dir() -> Result<PathBuf> {
        if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
            return Ok(PathBuf::from(home));
        }
        dirs::home_dir().context("Could not determine home directory")
    }

    /// Directory holding the rc file and the default database
    pub fn config_dir() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join(".taskdeck"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("rc"))
    }

    /// Load the rc file, falling back to defaults when it does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::parse(&content, base))
    }

    /// Parse rc content; `base` is the directory relative paths resolve against
    pub fn parse(content: &str, base: &Path) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Ignoring malformed config line: {}", line);
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = Some(if path.is_relative() { base.join(path) } else { path });
                }
                "list.page_size" => match value.parse::<usize>() {
                    Ok(n) if n > 0 => config.page_size = n,
                    _ => log::warn!("Invalid list.page_size '{}', using {}", value, DEFAULT_PAGE_SIZE),
                },
                "user.email" => {
                    if !value.is_empty() {
                        config.user_email = Some(value.to_string());
                    }
                }
                other => log::debug!("Unknown config key '{}'", other),
            }
        }

        config
    }

    /// Database path: `data.location` or `~/.taskdeck/deck.db`
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.data_location {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("deck.db")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = Config::parse("", Path::new("/tmp"));
        assert_eq!(config, Config::default());
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_parse_all_keys() {
        let content = "# comment\ndata.location=./custom.db\nlist.page_size=25\nuser.email = me@example.com\n";
        let config = Config::parse(content, Path::new("/home/me/.taskdeck"));
        assert_eq!(config.data_location, Some(PathBuf::from("/home/me/.taskdeck/./custom.db")));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.user_email.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn test_parse_absolute_location() {
        let config = Config::parse("data.location=/var/lib/deck.db", Path::new("/ignored"));
        assert_eq!(config.data_location, Some(PathBuf::from("/var/lib/deck.db")));
    }

    #[test]
    fn test_parse_bad_values_fall_back() {
        let config = Config::parse("list.page_size=0\nlist.page_size=abc\nnonsense\nuser.email=", Path::new("/"));
        assert_eq!(config.page_size, 10);
        assert!(config.user_email.is_none());
    }
}

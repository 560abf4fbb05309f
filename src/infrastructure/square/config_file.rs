//! # Square Cloud Configuration File
//!
//! Parser for the `squarecloud.app` / `squarecloud.config` file that every
//! uploaded archive must carry. The format is one `KEY=VALUE` pair per line;
//! `MAIN`, `MEMORY`, `VERSION` and `DISPLAY_NAME` are mandatory.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// File names the platform accepts for the configuration entry.
pub const CONFIG_FILE_NAMES: &[&str] = &["squarecloud.app", "squarecloud.config"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A mandatory key is absent. Carries the uppercased key name.
    #[error("missing mandatory key {0}")]
    MissingKey(String),

    #[error("MEMORY must be an integer, got {0:?}")]
    InvalidMemory(String),

    #[error("VERSION must be 'recommended' or 'latest', got {0:?}")]
    InvalidVersion(String),
}

/// Runtime version selector for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Recommended,
    Latest,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Latest => "latest",
        }
    }
}

impl FromStr for Version {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommended" => Ok(Self::Recommended),
            "latest" => Ok(Self::Latest),
            other => Err(ConfigError::InvalidVersion(other.to_string())),
        }
    }
}

/// Parsed Square Cloud configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub main: String,
    pub memory: u32,
    pub version: Version,
    pub display_name: String,
    pub subdomain: Option<String>,
    pub description: Option<String>,
    pub autorestart: Option<bool>,
    pub start: Option<String>,
}

impl FromStr for ConfigFile {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut fields: HashMap<String, String> = HashMap::new();

        for line in value.lines() {
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            fields.insert(key.trim().to_lowercase(), val.trim().to_string());
        }

        let required = |key: &str| -> Result<String, ConfigError> {
            fields
                .get(key)
                .cloned()
                .ok_or_else(|| ConfigError::MissingKey(key.to_uppercase()))
        };

        let memory_raw = required("memory")?;
        let memory = memory_raw
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidMemory(memory_raw.clone()))?;

        Ok(Self {
            main: required("main")?,
            memory,
            version: required("version")?.parse()?,
            display_name: required("display_name")?,
            subdomain: fields.get("subdomain").cloned(),
            description: fields.get("description").cloned(),
            autorestart: fields
                .get("autorestart")
                .map(|v| v.eq_ignore_ascii_case("true")),
            start: fields.get("start").cloned(),
        })
    }
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MAIN={}", self.main)?;
        writeln!(f, "MEMORY={}", self.memory)?;
        writeln!(f, "VERSION={}", self.version.as_str())?;
        write!(f, "DISPLAY_NAME={}", self.display_name)?;
        if let Some(subdomain) = &self.subdomain {
            write!(f, "\nSUBDOMAIN={subdomain}")?;
        }
        if let Some(description) = &self.description {
            write!(f, "\nDESCRIPTION={description}")?;
        }
        if let Some(autorestart) = self.autorestart {
            write!(f, "\nAUTORESTART={autorestart}")?;
        }
        if let Some(start) = &self.start {
            write!(f, "\nSTART={start}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "MAIN=index.js\nMEMORY=256\nVERSION=recommended\nDISPLAY_NAME=my-bot\nDESCRIPTION=a bot\nAUTORESTART=true\n";

    #[test]
    fn parses_full_config() {
        let config: ConfigFile = FULL.parse().unwrap();
        assert_eq!(config.main, "index.js");
        assert_eq!(config.memory, 256);
        assert_eq!(config.version, Version::Recommended);
        assert_eq!(config.display_name, "my-bot");
        assert_eq!(config.description.as_deref(), Some("a bot"));
        assert_eq!(config.autorestart, Some(true));
        assert!(config.subdomain.is_none());
    }

    #[test]
    fn keys_are_case_insensitive() {
        let config: ConfigFile = "main=app.py\nmemory=512\nversion=latest\ndisplay_name=x\n"
            .parse()
            .unwrap();
        assert_eq!(config.main, "app.py");
        assert_eq!(config.version, Version::Latest);
    }

    #[test]
    fn missing_key_is_named_uppercased() {
        let err = "MAIN=index.js\nMEMORY=256\nVERSION=recommended\n"
            .parse::<ConfigFile>()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingKey("DISPLAY_NAME".to_string()));
    }

    #[test]
    fn non_integer_memory_is_rejected() {
        let err = "MAIN=index.js\nMEMORY=lots\nVERSION=recommended\nDISPLAY_NAME=x\n"
            .parse::<ConfigFile>()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidMemory("lots".to_string()));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let err = "MAIN=index.js\nMEMORY=256\nVERSION=nightly\nDISPLAY_NAME=x\n"
            .parse::<ConfigFile>()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidVersion("nightly".to_string()));
    }

    #[test]
    fn lines_without_separator_are_ignored() {
        let config: ConfigFile =
            "# comment\nMAIN=index.js\nMEMORY=256\nVERSION=recommended\nDISPLAY_NAME=x\n"
                .parse()
                .unwrap();
        assert_eq!(config.main, "index.js");
    }

    #[test]
    fn display_round_trips() {
        let config: ConfigFile = FULL.parse().unwrap();
        let reparsed: ConfigFile = config.to_string().parse().unwrap();
        assert_eq!(config, reparsed);
    }
}

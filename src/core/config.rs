use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "LISTENTOTAXMAN_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory (set HOME or {CONFIG_PATH_ENV})")]
    NoHome,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub defaults: Defaults,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Defaults {
    pub region: String,
    pub year: String,
    pub age: String,
    pub pension: String,
    pub student_loan: String,
    pub tax_code: String,
    pub extra: i64,
    pub period: String,
    pub married: bool,
    pub blind: bool,
    pub no_ni: bool,
    pub partner_income: i64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            region: "uk".to_string(),
            year: String::new(),
            age: "0".to_string(),
            pension: String::new(),
            student_loan: String::new(),
            tax_code: String::new(),
            extra: 0,
            period: "yearly".to_string(),
            married: false,
            blind: false,
            no_ni: false,
            partner_income: 0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
        Self::load_from(&config_path(std::env::var_os(CONFIG_PATH_ENV), home)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(path = %path.display(), "loading config file");
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not a mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// An explicit override wins; otherwise the file lives under the home directory.
pub fn config_path(
    override_path: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = override_path.filter(|path| !path.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let home = home.ok_or(ConfigError::NoHome)?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("listentotaxman")
        .join("config.yaml"))
}

//! Application configuration.
//!
//! Configuration is an optional TOML file. Every key has a default, so an
//! absent file or an empty one both yield a working setup:
//!
//! ```toml
//! templates = "templates.csv"
//! history = "history.csv"
//! export_dir = "."
//! history_rows = 20
//!
//! [defaults]
//! target_ai = "ChatGPT"
//! mode = "DETAIL"
//! auto_save = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::prompt::{Mode, TargetAi};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "lyra.toml";

/// Starter template table used when the config names none.
pub const DEFAULT_TEMPLATES_FILE: &str = "templates.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Starter template table
    pub templates: PathBuf,

    /// Session log table
    pub history: PathBuf,

    /// Directory export files are written to
    pub export_dir: PathBuf,

    /// Number of session log rows shown
    pub history_rows: usize,

    /// Where the interactive form writes its tracing output, if anywhere
    pub log_file: Option<PathBuf>,

    /// Initial form values
    pub defaults: FormDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormDefaults {
    pub target_ai: TargetAi,
    pub mode: Mode,
    pub auto_save: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates: PathBuf::from(DEFAULT_TEMPLATES_FILE),
            history: PathBuf::from("history.csv"),
            export_dir: PathBuf::from("."),
            history_rows: 20,
            log_file: None,
            defaults: FormDefaults::default(),
        }
    }
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            target_ai: TargetAi::ChatGpt,
            mode: Mode::Detail,
            auto_save: true,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `lyra.toml` in the working
    /// directory is used if present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE}, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Read a config file; relative paths in it resolve against its directory.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml(&content).map_err(|e| Error::Parse {
            path: path.display().to_string(),
            source: e,
        })?;

        let base = path.parent().unwrap_or(Path::new(""));
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config.relative_to(base))
    }

    /// Parse config text; paths are left as written.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn relative_to(mut self, base: &Path) -> Self {
        if base.as_os_str().is_empty() {
            return self;
        }
        self.templates = base.join(&self.templates);
        self.history = base.join(&self.history);
        self.export_dir = base.join(&self.export_dir);
        self.log_file = self.log_file.map(|p| base.join(p));
        self
    }
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config file '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}'")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

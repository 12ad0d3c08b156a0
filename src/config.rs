//! Engine configuration.
//!
//! The host supplies an [`ExposeConfig`] per evaluation; the engine only
//! borrows it. Every field has a default, so an empty TOML document is a
//! valid configuration:
//!
//! ```toml
//! strict = true
//! domain = ""
//! only_internal = true
//! override_client_ip = true
//! overwrite_mode = "only_overwrite_present"
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::environment::OverwriteMode;
use crate::error::Error;

/// Options controlling when forwarded origins are trusted and how they are applied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExposeConfig {
    /// Require the `X-Exposed-By: Expose ...` marker header.
    pub strict: bool,

    /// When non-empty, only trust requests whose current host equals this
    /// value exactly (case-sensitive).
    pub domain: String,

    /// Only trust requests whose current host resolves to a private
    /// network address.
    pub only_internal: bool,

    /// Also replace the client address with the left-most
    /// `X-Forwarded-For` entry once the origin is trusted.
    pub override_client_ip: bool,

    /// How server variables are written into process-level mirrors.
    pub overwrite_mode: OverwriteMode,
}

impl Default for ExposeConfig {
    fn default() -> Self {
        Self {
            strict: true,
            domain: String::new(),
            only_internal: true,
            override_client_ip: true,
            overwrite_mode: OverwriteMode::default(),
        }
    }
}

impl ExposeConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the text is not valid TOML or a
    /// field has the wrong type.
    ///
    /// # Examples
    ///
    /// ```
    /// use origin_gate::ExposeConfig;
    ///
    /// let config = ExposeConfig::from_toml_str("only_internal = false").unwrap();
    /// assert!(config.strict);
    /// assert!(!config.only_internal);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Returns the local domain, or `None` when the domain check is disabled.
    pub fn local_domain(&self) -> Option<&str> {
        if self.domain.is_empty() {
            None
        } else {
            Some(&self.domain)
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read
    Io(std::io::Error),
    /// The file is not a valid configuration
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

/// Loads a configuration from a TOML file.
///
/// # Errors
///
/// Returns [`Error::Config`] when the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<ExposeConfig, Error> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    Ok(ExposeConfig::from_toml_str(&content)?)
}

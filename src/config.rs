//! Gate configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default path prefix that marks a request as an API request.
pub const DEFAULT_API_PATH_PREFIX: &str = "/api";
/// Maximum allowed config file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;

/// Settings the gate needs from the host application.
///
/// # Examples
///
/// ```
/// use access_gate::GateConfig;
///
/// let config = GateConfig::from_toml_str(r#"
///     app_sub_url = "/monitor"
/// "#).unwrap();
///
/// assert_eq!(config.app_sub_url, "/monitor");
/// assert_eq!(config.api_path_prefix, "/api");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Base path the application is served under; browser denials
    /// redirect to `<app_sub_url>/`.
    pub app_sub_url: String,
    /// Path prefix classifying a request as an API request.
    pub api_path_prefix: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            app_sub_url: String::new(),
            api_path_prefix: DEFAULT_API_PATH_PREFIX.to_string(),
        }
    }
}

impl GateConfig {
    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the
    /// size limit, or fails to parse or validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid(
                "gate config file exceeds size limit".to_string(),
            ));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("gate config must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Validates configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `app_sub_url` is neither empty
    /// nor a plain absolute path (`/seg/seg`, no empty segments, no `\`,
    /// no whitespace or control characters), or when `api_path_prefix`
    /// does not start with `/`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.app_sub_url.is_empty() {
            validate_sub_url(&self.app_sub_url)?;
        }
        if !self.api_path_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(
                "api_path_prefix must start with '/'".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the redirect target for denied browser requests.
    pub fn home_path(&self) -> String {
        format!("{}/", self.app_sub_url)
    }
}

/// Checks that `sub_url` is a same-origin path once `/` is appended.
fn validate_sub_url(sub_url: &str) -> Result<(), ConfigError> {
    let Some(rest) = sub_url.strip_prefix('/') else {
        return Err(ConfigError::Invalid(
            "app_sub_url must start with '/'".to_string(),
        ));
    };
    if sub_url.ends_with('/') {
        return Err(ConfigError::Invalid(
            "app_sub_url must not end with '/'".to_string(),
        ));
    }
    // `//host` and `/\host` are read by browsers as another origin.
    if rest.split('/').any(str::is_empty) {
        return Err(ConfigError::Invalid(
            "app_sub_url must not contain empty path segments".to_string(),
        ));
    }
    if sub_url
        .chars()
        .any(|c| c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(ConfigError::Invalid(
            "app_sub_url must be a plain path".to_string(),
        ));
    }
    Ok(())
}

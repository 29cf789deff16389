//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for haven
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub backend_url: Option<String>,
    /// Color theme ("dark" or "light")
    pub theme: Option<String>,
    /// Contact details prefilled into agent enquiries
    #[serde(default)]
    pub contact: Contact,
}

/// Contact details used when enquiring about a listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub name: Option<String>,
    pub number: Option<String>,
}

/// Default backend when nothing is configured
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("haven")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for HAVEN_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("HAVEN_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        fs::create_dir_all(dir)?;

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Backend base URL, falling back to the default
    pub fn backend_url(&self) -> String {
        if let Ok(url) = std::env::var("HAVEN_BACKEND_URL") {
            return url;
        }
        self.backend_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# haven configuration file
# Place at ~/.config/haven/config.toml (Linux/Mac) or %APPDATA%\haven\config.toml (Windows)

# Backend base URL
backend_url = "http://localhost:8000"

# Color theme (dark, light)
theme = "dark"

# Contact details prefilled into agent enquiries
[contact]
# name = "Jane Doe"
# number = "+44 7700 900000"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_url_falls_back_to_default() {
        let config = Config::default();
        if std::env::var("HAVEN_BACKEND_URL").is_err() {
            assert_eq!(config.backend_url(), DEFAULT_BACKEND_URL);
        }
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.backend_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.theme.as_deref(), Some("dark"));
    }
}

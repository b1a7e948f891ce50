use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted app state
    pub data_dir: PathBuf,
    /// Base URL of the product lookup API
    pub product_api_url: String,
    /// Name given to the list created on first run
    pub default_list_name: String,
    /// List names that switch a list into task mode (case-insensitive)
    pub task_list_names: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self {
            data_dir: PathBuf::from(&home).join(".listfy"),
            product_api_url: "https://world.openfoodfacts.org".to_string(),
            default_list_name: "Minha Lista".to_string(),
            task_list_names: vec!["tasks".to_string(), "tarefas".to_string()],
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        if let Ok(data_dir) = std::env::var("LISTFY_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(url) = std::env::var("LISTFY_PRODUCT_API_URL") {
            config.product_api_url = url;
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/listfy/config.yaml
    pub fn default_config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".config")
            .join("listfy")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

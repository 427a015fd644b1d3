use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub language: String,
    pub image_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// The API key may live outside the config file; the environment wins.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("CINEFETCH_API_KEY") {
            if !key.is_empty() {
                self.api.api_key = Some(key);
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Config {
            api: ApiConfig {
                base_url: "https://api.themoviedb.org/3".to_string(),
                api_key: None,
                language: "en-US".to_string(),
                image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite:data/cinefetch.db".to_string(),
                max_connections: 5,
            },
            http: HttpConfig {
                timeout_secs: 30,
                connect_timeout_secs: 10,
                user_agent: None,
            },
        };
        config.apply_env_overrides();
        config
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

fn default_port() -> u16 { 8000 }
fn default_base_url() -> String { "http://apiservice".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_window_days() -> u32 { 90 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            window_days: default_window_days(),
        }
    }
}

/// Environment overrides, loaded once at startup.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub provider_base_url: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            provider_base_url: std::env::var("PROVIDER_BASE_URL").ok(),
            port: std::env::var("PORT").ok().and_then(|s| s.parse().ok()),
        })
    }
}

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;

pub const API_KEY_VAR: &str = "TMDB_API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub listen_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|s| !s.trim().is_empty())
            .with_context(|| format!("Missing required environment variable: {}", API_KEY_VAR))?;
        Ok(Self {
            api_key,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3146)),
        })
    }
}

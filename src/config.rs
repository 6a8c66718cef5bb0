use std::env;

use anyhow::{Context, Result};
use reqwest::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct PlaygroundConfig {
    pub backend_url: Url,
    pub bind_addr: String,
}

impl PlaygroundConfig {
    /// Reads `PLAYGROUND_BACKEND_URL` and `PLAYGROUND_BIND_ADDR`, falling back
    /// to the local defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            env::var("PLAYGROUND_BACKEND_URL").ok(),
            env::var("PLAYGROUND_BIND_ADDR").ok(),
        )
    }

    pub fn from_values(backend_url: Option<String>, bind_addr: Option<String>) -> Result<Self> {
        let raw_url = backend_url
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.into());

        let backend_url = Url::parse(raw_url.trim())
            .with_context(|| format!("invalid backend url {raw_url:?}"))?;

        if !matches!(backend_url.scheme(), "http" | "https") {
            anyhow::bail!("backend url must be http or https, got {raw_url:?}");
        }

        let bind_addr = bind_addr
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.into());

        Ok(Self {
            backend_url,
            bind_addr,
        })
    }
}

use crate::discovery::PaginationPolicy;
use crate::tmdb::TMDB_BASE;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PRERENDER_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub policy: PaginationPolicy,
    pub fallback: bool,
    pub prerender_concurrency: usize,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tmdb_api_key = get("TMDB_API_KEY")
            .ok_or_else(|| anyhow!("Missing required environment variable: TMDB_API_KEY"))?;
        let tmdb_base_url = get("TMDB_BASE_URL").unwrap_or_else(|| TMDB_BASE.to_string());
        let policy = match get("DISCOVERY_POLICY") {
            Some(v) => v.parse().context("Invalid DISCOVERY_POLICY")?,
            None => PaginationPolicy::default(),
        };
        let fallback = match get("DISCOVERY_FALLBACK") {
            Some(v) => parse_bool(&v).context("Invalid DISCOVERY_FALLBACK")?,
            None => true,
        };
        let prerender_concurrency = match get("PRERENDER_CONCURRENCY") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .context("Invalid PRERENDER_CONCURRENCY")?
                .clamp(1, 64),
            None => DEFAULT_PRERENDER_CONCURRENCY,
        };
        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse()
            .context("Invalid BIND_ADDR")?;

        Ok(Self {
            tmdb_api_key,
            tmdb_base_url,
            policy,
            fallback,
            prerender_concurrency,
            bind_addr,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("expected a boolean, got '{}'", other)),
    }
}

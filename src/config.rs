use crate::compliance::ComplianceConfig;
use anyhow::Context;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_cron_per_min: u32,
    pub rate_api_per_min: u32,

    pub api_prefix: String,

    pub compliance: ComplianceConfig,
}

impl Config {
    /// Configuration errors are fatal at startup rather than panics, so a
    /// misconfigured deployment fails with a readable message.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,

            rate_cron_per_min: env_or("RATE_CRON_PER_MIN", "30")?,
            rate_api_per_min: env_or("RATE_API_PER_MIN", "1000")?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            compliance: ComplianceConfig::from_env()?,
        })
    }
}

fn env_or<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{} is invalid ({}): {}", key, raw, e))
}

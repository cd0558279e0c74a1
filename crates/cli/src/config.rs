//! Connection settings shared by every sub-command.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use gateway::CacheConfig;

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    pub database_url: Option<String>,

    /// Pool ceiling. The dashboard aggregate runs five reads at once.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", global = true, default_value_t = 10)]
    pub max_connections: u32,

    /// Use the seeded in-memory store instead of Postgres.
    #[arg(long, global = true)]
    pub memory: bool,

    /// Most cached query results the server keeps.
    #[arg(long, env = "CACHE_MAX_ENTRIES", global = true, default_value_t = 1_000)]
    pub cache_max_entries: u64,

    /// Seconds an unread cached result is kept.
    #[arg(long, env = "CACHE_IDLE_SECS", global = true, default_value_t = 300)]
    pub cache_idle_secs: u64,
}

impl Config {
    pub fn require_database_url(&self) -> Result<&str> {
        match self.database_url.as_deref() {
            Some(url) if !url.is_empty() => Ok(url),
            _ => bail!("DATABASE_URL is not set (pass --database-url or use --memory)"),
        }
    }

    pub fn cache(&self) -> CacheConfig {
        CacheConfig {
            max_capacity: self.cache_max_entries,
            time_to_idle: Duration::from_secs(self.cache_idle_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn memory_mode_needs_no_url() {
        let h = Harness::try_parse_from(["test", "--memory"]).unwrap();
        assert!(h.config.memory);
        assert_eq!(h.config.max_connections, 10);
        assert_eq!(h.config.cache(), CacheConfig::default());
    }

    #[test]
    fn cache_limits_are_configurable() {
        let h = Harness::try_parse_from([
            "test",
            "--cache-max-entries",
            "64",
            "--cache-idle-secs",
            "5",
        ])
        .unwrap();
        assert_eq!(
            h.config.cache(),
            CacheConfig {
                max_capacity: 64,
                time_to_idle: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn empty_url_is_rejected() {
        let h = Harness::try_parse_from(["test", "--database-url", ""]).unwrap();
        assert!(h.config.require_database_url().is_err());
    }

    #[test]
    fn explicit_url_is_used() {
        let h = Harness::try_parse_from(["test", "--database-url", "postgres://localhost/dash"])
            .unwrap();
        assert_eq!(h.config.require_database_url().unwrap(), "postgres://localhost/dash");
    }
}

use core::fmt::{Debug, Display};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "checkin.toml";
pub const ENV_PREFIX: &str = "CHECKIN_";

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Create the tables on startup if they are missing.
    #[serde(default = "default_migrate")]
    pub migrate: bool,
}

const fn default_listen() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 3000))
}

const fn default_pool_size() -> usize {
    16
}

const fn default_migrate() -> bool {
    true
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Later providers win, so environment variables override the file.
#[must_use]
pub fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX))
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(figment().extract()?)
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        Jail::expect_with(|jail| {
            jail.set_env("CHECKIN_DATABASE_URL", "postgres://localhost/checkin");

            let config: Config = figment().extract()?;
            assert_eq!(config.database_url, "postgres://localhost/checkin");
            assert_eq!(config.listen, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
            assert_eq!(config.pool_size, 16);
            assert!(config.migrate);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                    database_url = "postgres://file/checkin"
                    listen = "127.0.0.1:8080"
                    pool_size = 4
                "#,
            )?;
            jail.set_env("CHECKIN_DATABASE_URL", "postgres://env/checkin");
            jail.set_env("CHECKIN_MIGRATE", "false");

            let config: Config = figment().extract()?;
            assert_eq!(config.database_url, "postgres://env/checkin");
            assert_eq!(config.listen, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
            assert_eq!(config.pool_size, 4);
            assert!(!config.migrate);
            Ok(())
        });
    }

    #[test]
    fn missing_database_url_is_an_error() {
        Jail::expect_with(|_jail| {
            let error = get_config().unwrap_err();
            assert!(error.to_string().contains("database_url"));
            Ok(())
        });
    }
}

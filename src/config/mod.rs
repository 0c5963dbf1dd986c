use anyhow::{Context, Result};
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DB_FILE_NAME: &str = "erha.db";

/// Server settings, read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DB_FILE_NAME),
        }
    }
}

impl Config {
    /// Load `.env` if present, then read `ERHA_HOST`, `ERHA_PORT` (or `PORT`)
    /// and `ERHA_DB_PATH`
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = match lookup("ERHA_HOST") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid ERHA_HOST: {}", raw))?,
            None => defaults.host,
        };

        let port = match lookup("ERHA_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid port: {}", raw))?,
            None => defaults.port,
        };

        let db_path = lookup("ERHA_DB_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        Ok(Self {
            host,
            port,
            db_path,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

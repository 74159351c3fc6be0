use notebook_surreal::DatabaseSettings;
use std::{env, net::SocketAddr};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    listen_addr: SocketAddr,
    database: DatabaseSettings,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".into()
}

impl ServerConfig {
    /// Build configuration from environment variables, after loading `.env`
    /// when one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let listen_addr = env::var("NOTEBOOK_LISTEN_ADDR").unwrap_or_else(|_| default_listen_addr());
        Self::new(&listen_addr, DatabaseSettings::from_env())
    }

    pub fn new(listen_addr: &str, database: DatabaseSettings) -> Result<Self, ConfigError> {
        let listen_addr = listen_addr.parse::<SocketAddr>().map_err(|e| {
            ConfigError::Invalid(format!("NOTEBOOK_LISTEN_ADDR '{}': {}", listen_addr, e))
        })?;

        Ok(Self {
            listen_addr,
            database,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    pub fn database(&self) -> &DatabaseSettings {
        &self.database
    }
}

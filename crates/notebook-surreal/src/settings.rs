use std::env;

/// Default endpoint: an in-memory database that lives as long as the process.
pub const DEFAULT_ENDPOINT: &str = "mem://";
pub const DEFAULT_NAMESPACE: &str = "notebook";
pub const DEFAULT_DATABASE: &str = "notes";

/// Where and how to reach the document database.
///
/// The endpoint scheme picks the engine: `mem://` and `surrealkv://path` run
/// embedded, `ws://host:port` talks to a running server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub endpoint: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            username: None,
            password: None,
        }
    }
}

impl DatabaseSettings {
    /// Read settings from `NOTEBOOK_DB_*` environment variables, falling back
    /// to the defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            endpoint: non_empty("NOTEBOOK_DB_ENDPOINT").unwrap_or(defaults.endpoint),
            namespace: non_empty("NOTEBOOK_DB_NAMESPACE").unwrap_or(defaults.namespace),
            database: non_empty("NOTEBOOK_DB_DATABASE").unwrap_or(defaults.database),
            username: non_empty("NOTEBOOK_DB_USERNAME"),
            password: non_empty("NOTEBOOK_DB_PASSWORD"),
        }
    }

    /// Root credentials, when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

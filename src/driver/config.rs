//! Driver configuration.

use std::env;

/// Optional store credentials.
///
/// The embedded backends accept and ignore them; the field exists so callers
/// written against a networked graph store keep working unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Username, if any.
    pub username: Option<String>,
    /// Password, if any.
    pub password: Option<String>,
}

/// Connection settings for [`Driver::connect`](crate::driver::Driver::connect).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Store URI: `memory:` for an ephemeral store, `file:<path>` for a
    /// snapshot-backed one.
    pub uri: String,
    /// Ignored by the embedded backends; see [`Credentials`].
    pub credentials: Credentials,
    /// Upper bound on concurrently open sessions.
    pub max_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uri: "memory:".to_owned(),
            credentials: Credentials::default(),
            max_sessions: 16,
        }
    }
}

impl Config {
    /// Builds a config from `ACERVO_URI`, `ACERVO_USERNAME`, and
    /// `ACERVO_PASSWORD`, falling back to defaults for unset variables.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Ok(uri) = env::var("ACERVO_URI") {
            if !uri.trim().is_empty() {
                config.uri = uri;
            }
        }
        config.credentials.username = env::var("ACERVO_USERNAME").ok().filter(|v| !v.is_empty());
        config.credentials.password = env::var("ACERVO_PASSWORD").ok().filter(|v| !v.is_empty());
        config
    }

    /// Config for an ephemeral in-memory store.
    pub fn memory() -> Self {
        Config::default()
    }

    /// Config for a snapshot-backed store at `path`.
    pub fn file(path: impl AsRef<std::path::Path>) -> Self {
        Self {
            uri: format!("file:{}", path.as_ref().display()),
            ..Config::default()
        }
    }
}

//! Environment-backed configuration.
//!
//! Every value is looked up once through an [`EnvSource`] when the process
//! starts and is immutable afterwards. Empty variables count as unset.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};

pub const EXAMPLE_MODE_VAR: &str = "NEXT_PUBLIC_EXAMPLE_MODE";
pub const SUPABASE_URL_VAR: &str = "NEXT_PUBLIC_SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "NEXT_PUBLIC_SUPABASE_ANON_KEY";

pub const DATABASE_URL_VAR: &str = "POSTGRES_URL_WITH_PASSWORD";
pub const DATABASE_HOST_VAR: &str = "POSTGRES_HOST";
pub const DATABASE_PORT_VAR: &str = "PGPORT";
pub const DATABASE_NAME_VAR: &str = "POSTGRES_DATABASE";
pub const DATABASE_USER_VAR: &str = "POSTGRES_USER";
pub const DATABASE_PASSWORD_VAR: &str = "POSTGRES_PASSWORD";

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_DATABASE: &str = "postgres";
const DEFAULT_USER: &str = "postgres";

/// A source of configuration variables.
pub trait EnvSource {
    /// Returns the raw value of `key`, if set.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns the value of `key`, treating empty strings as unset.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.trim().is_empty())
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string())
    }
}

/// Loads `.env` from the working directory or its parents.
///
/// A missing file is not an error. Variables already present in the
/// environment are kept. Called before tracing is up, so the caller logs.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Settings for the hosted auth / table service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub example_mode: bool,
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl SupabaseConfig {
    pub fn from_env(env: &impl EnvSource) -> Self {
        Self {
            example_mode: env.var(EXAMPLE_MODE_VAR).as_deref() == Some("true"),
            url: env.non_empty(SUPABASE_URL_VAR),
            anon_key: env.non_empty(SUPABASE_ANON_KEY_VAR),
        }
    }

    /// Whether a real backend should be used.
    pub fn is_live(&self) -> bool {
        !self.example_mode && self.url.is_some() && self.anon_key.is_some()
    }
}

/// Where the export tool connects to.
#[derive(Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// A full connection string.
    Url(String),
    /// Discrete connection parameters.
    Discrete {
        host: String,
        port: u16,
        database: String,
        user: String,
        password: String,
    },
}

// Keeps passwords out of logs.
impl fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionTarget::Url(_) => f.debug_tuple("Url").field(&"<redacted>").finish(),
            ConnectionTarget::Discrete {
                host,
                port,
                database,
                user,
                ..
            } => f
                .debug_struct("Discrete")
                .field("host", host)
                .field("port", port)
                .field("database", database)
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Relational database settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub target: ConnectionTarget,
}

impl DatabaseConfig {
    /// Resolves the connection settings.
    ///
    /// The connection string wins when present. Otherwise host and password
    /// are required and port, database and user fall back to defaults.
    pub fn from_env(env: &impl EnvSource) -> AppResult<Self> {
        if let Some(url) = env.non_empty(DATABASE_URL_VAR) {
            return Ok(Self {
                target: ConnectionTarget::Url(url),
            });
        }

        let (Some(host), Some(password)) = (
            env.non_empty(DATABASE_HOST_VAR),
            env.non_empty(DATABASE_PASSWORD_VAR),
        ) else {
            return Err(AppError::MissingDatabaseCredentials);
        };

        let port = match env.non_empty(DATABASE_PORT_VAR) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| AppError::InvalidConfig {
                key: DATABASE_PORT_VAR.to_string(),
                message: format!("{raw:?} is not a valid port: {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            target: ConnectionTarget::Discrete {
                host,
                port,
                database: env
                    .non_empty(DATABASE_NAME_VAR)
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                user: env
                    .non_empty(DATABASE_USER_VAR)
                    .unwrap_or_else(|| DEFAULT_USER.to_string()),
                password,
            },
        })
    }

    /// A log-safe description of the target.
    pub fn describe(&self) -> String {
        match &self.target {
            ConnectionTarget::Url(_) => "connection string".to_string(),
            ConnectionTarget::Discrete {
                host,
                port,
                database,
                user,
                ..
            } => format!("{user}@{host}:{port}/{database}"),
        }
    }
}

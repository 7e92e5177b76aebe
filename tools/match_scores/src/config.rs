use std::env;
use std::path::Path;
use tracing::{debug, warn};

pub const DSN_KEY: &str = "DB_CONNECTION_DSN";
pub const USER_KEY: &str = "DB_CONNECTION_USER";
pub const PASSWORD_KEY: &str = "DB_CONNECTION_PASSWORD";
pub const SCHEMA_KEY: &str = "DB_CONFIG_SCHEMA";
pub const TABLE_KEY: &str = "DB_CONFIG_TABLE";
pub const DATE_COLUMN_KEY: &str = "DB_CONFIG_DATE_COLUMN";

const KNOWN_KEYS: [&str; 6] = [
    DSN_KEY,
    USER_KEY,
    PASSWORD_KEY,
    SCHEMA_KEY,
    TABLE_KEY,
    DATE_COLUMN_KEY,
];

pub const DEFAULT_TABLE: &str = "MATCHES";
pub const DEFAULT_DATE_COLUMN: &str = "MATCH_DATE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: dotenv::Error,
    },
    #[error("Missing configuration key {0}")]
    Missing(&'static str),
    #[error("Unsupported database DSN '{0}', expected postgres:// or sqlite:")]
    UnsupportedDsn(String),
}

/// Database engine selected by the DSN scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_dsn(dsn: &str) -> Result<Self, ConfigError> {
        if dsn.starts_with("postgres://") || dsn.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else if dsn.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            Err(ConfigError::UnsupportedDsn(dsn.to_string()))
        }
    }

    pub fn default_schema(&self) -> &'static str {
        match self {
            Backend::Postgres => "public",
            Backend::Sqlite => "main",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub backend: Backend,
    pub dsn: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub schema: String,
    pub table: String,
    pub date_column: String,
}

impl StorageConfig {
    /// `schema.table`, as used in every statement.
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Reads the configuration file and then applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::from_file(path.as_ref())?;
        for key in KNOWN_KEYS {
            if let Ok(value) = env::var(key) {
                debug!("Overriding {} from environment", key);
                builder.set(key, value);
            }
        }
        builder.build()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigBuilder::from_file(path.as_ref())?.build()
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut builder = ConfigBuilder::default();
        for (key, value) in pairs {
            builder.set(&key, value);
        }
        builder.build()
    }
}

#[derive(Debug, Default)]
struct ConfigBuilder {
    dsn: Option<String>,
    user: Option<String>,
    password: Option<String>,
    schema: Option<String>,
    table: Option<String>,
    date_column: Option<String>,
}

impl ConfigBuilder {
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let read_error = |source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        };

        let mut builder = Self::default();
        // The iterator API is deprecated in favour of loading into the process
        // env, which this config must not touch
        #[allow(deprecated)]
        let pairs = dotenv::from_path_iter(path).map_err(read_error)?;
        for pair in pairs {
            let (key, value) = pair.map_err(read_error)?;
            builder.set(&key, value);
        }
        Ok(builder)
    }

    fn set(&mut self, key: &str, value: String) {
        // Blank values count as unset
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        match key {
            DSN_KEY => self.dsn = value,
            USER_KEY => self.user = value,
            PASSWORD_KEY => self.password = value,
            SCHEMA_KEY => self.schema = value,
            TABLE_KEY => self.table = value,
            DATE_COLUMN_KEY => self.date_column = value,
            other => warn!("Ignoring unknown configuration key {}", other),
        }
    }

    fn build(self) -> Result<AppConfig, ConfigError> {
        let dsn = self.dsn.ok_or(ConfigError::Missing(DSN_KEY))?;
        let backend = Backend::from_dsn(&dsn)?;

        Ok(AppConfig {
            connection: ConnectionConfig {
                backend,
                dsn,
                user: self.user,
                password: self.password,
            },
            storage: StorageConfig {
                schema: self
                    .schema
                    .unwrap_or_else(|| backend.default_schema().to_string()),
                table: self.table.unwrap_or_else(|| DEFAULT_TABLE.to_string()),
                date_column: self
                    .date_column
                    .unwrap_or_else(|| DEFAULT_DATE_COLUMN.to_string()),
            },
        })
    }
}

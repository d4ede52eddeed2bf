use crate::error::{BadEnvVarSnafu, ParseMaxConnectionsSnafu, ParsePortSnafu, RosterResult};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use std::sync::Arc;

const DEFAULT_SERVER_IP: &str = "127.0.0.1:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 15;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    server_ip: Arc<str>,
    max_connections: u32,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        let server_ip = var("ROSTER_SERVER_IP").unwrap_or_else(|_| DEFAULT_SERVER_IP.to_string());
        let max_connections = match var("ROSTER_MAX_CONNECTIONS") {
            Ok(original) => original
                .trim()
                .parse()
                .context(ParseMaxConnectionsSnafu { original })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            db_config: Arc::new(DbConfig::new()?),
            server_ip: server_ip.into(),
            max_connections,
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

#[derive(Debug)]
pub enum DbConfig {
    /// `DATABASE_URL`, used verbatim
    Url(SecretString),
    Parts {
        user: String,
        password: SecretString,
        path: String,
        port: u16,
        database: String,
    },
}

impl DbConfig {
    pub fn new() -> RosterResult<Self> {
        if let Ok(url) = var("DATABASE_URL") {
            return Ok(Self::Url(SecretString::from(url)));
        }

        let get_env_var = |name| var(name).context(BadEnvVarSnafu { name });

        Ok(Self::Parts {
            user: get_env_var("DB_USER")?,
            password: SecretString::from(get_env_var("DB_PASSWORD")?),
            path: get_env_var("DB_PATH")?,
            port: get_env_var("DB_PORT")?.parse().context(ParsePortSnafu)?,
            database: get_env_var("DB_NAME")?,
        })
    }

    pub fn get_db_path(&self) -> String {
        match self {
            Self::Url(url) => url.expose_secret().to_string(),
            Self::Parts {
                user,
                password,
                path,
                port,
                database,
            } => format!(
                "postgres://{}:{}@{}:{}/{}",
                user,
                password.expose_secret(),
                path,
                port,
                database
            ),
        }
    }
}

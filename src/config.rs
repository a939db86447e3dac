use crate::error::{RegistrationError, Result};
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    TempDir,
    Directory(PathBuf),
}

/// Deployment mode. Production hides error details and logs less.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn is_production(self) -> bool {
        self == Mode::Production
    }

    fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Mode::Production
        } else {
            Mode::Development
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    pub storage: StorageBackend,
    pub port: Option<u16>,
    pub host: String,
    pub mode: Mode,
    /// Origins allowed to call the service. Empty allows every origin.
    pub allowed_origins: Vec<String>,
}

impl RegistrationConfig {
    pub fn new(storage: StorageBackend) -> Self {
        Self {
            storage,
            port: None,
            host: DEFAULT_HOST.to_string(),
            mode: Mode::default(),
            allowed_origins: Vec::new(),
        }
    }

    pub fn memory() -> Self {
        Self::new(StorageBackend::Memory)
    }

    pub fn temp_dir() -> Self {
        Self::new(StorageBackend::TempDir)
    }

    pub fn directory(path: PathBuf) -> Self {
        Self::new(StorageBackend::Directory(path))
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Builds a configuration from the process environment.
    ///
    /// Reads `APP_ENV`, `HOST`, `PORT`, `CORS_ALLOWED_ORIGINS` and `USERS_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = match lookup("USERS_DIR").filter(|dir| !dir.trim().is_empty()) {
            Some(dir) => StorageBackend::Directory(PathBuf::from(dir)),
            None => StorageBackend::Memory,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                RegistrationError::Config(format!("PORT must be a valid port number ({raw:?}): {e}"))
            })?,
            None => DEFAULT_PORT,
        };

        let mut config = Self::new(storage)
            .with_port(port)
            .with_allowed_origins(parse_origins(lookup("CORS_ALLOWED_ORIGINS").as_deref()));

        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            config = config.with_host(host.trim());
        }
        if let Some(mode) = lookup("APP_ENV") {
            config = config.with_mode(Mode::from_env_value(&mode));
        }

        Ok(config)
    }

    pub(crate) fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port.unwrap_or(0))
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self::memory()
    }
}

fn parse_origins(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| origin.trim_end_matches('/').to_string())
        .collect()
}

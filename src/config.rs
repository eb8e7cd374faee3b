use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "casedesk.toml";
pub const RC_FILE: &str = ".casedesk-rc";

/// Main configuration structure for casedesk
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CaseDeskConfig {
    /// Where cases, partners and enquiries are kept
    pub store: StoreConfig,
    /// Document & notification service
    pub dispatcher: DispatcherConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Identity used for staff sessions opened by the CLI
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    File,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory for the file backend
    pub data_dir: PathBuf,
    /// SQLite URL for the sqlite backend (requires the `database` feature)
    pub database_url: String,
    /// Run migrations on connect
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DispatcherConfig {
    /// Base URL of the service exposing the /api endpoints
    pub base_url: String,
    /// Public site hosting the signature pages
    pub public_url: String,
    pub requests_per_minute: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level or EnvFilter directive, overridden by RUST_LOG
    pub log_level: String,
    /// Emit JSON log lines instead of compact text
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    pub user_id: String,
    pub email: String,
}

impl Default for CaseDeskConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                backend: StoreBackend::File,
                data_dir: PathBuf::from(".casedesk/data"),
                database_url: "sqlite://.casedesk/casedesk.db".to_string(),
                auto_migrate: true,
            },
            dispatcher: DispatcherConfig {
                base_url: "http://localhost:3000".to_string(),
                public_url: "http://localhost:3000".to_string(),
                requests_per_minute: 60,
                timeout_seconds: 30,
            },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                json: false,
            },
            session: SessionConfig {
                user_id: "staff".to_string(),
                email: "staff@localhost".to_string(),
            },
        }
    }
}

impl CaseDeskConfig {
    /// Load configuration from the current directory
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration with precedence (later wins):
    /// 1. Default values
    /// 2. Configuration files in `dir` (casedesk.toml, .casedesk-rc)
    /// 3. Environment variables (CASEDESK_STORE__DATA_DIR and so on)
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        let toml_path = dir.join(CONFIG_FILE);
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path).format(FileFormat::Toml));
        }

        let rc_path = dir.join(RC_FILE);
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("CASEDESK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

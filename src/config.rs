use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use portfolio_notification::EmailConfig;
use serde::Deserialize;
use std::{env, path::PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_days: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContactConfig {
    /// Where undeliverable submissions are kept
    #[serde(default = "default_pending_file")]
    pub pending_file: PathBuf,
    /// Closing line of the acknowledgment sent to submitters
    #[serde(default = "default_signature")]
    pub signature: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            pending_file: default_pending_file(),
            signature: default_signature(),
        }
    }
}

fn default_pending_file() -> PathBuf {
    PathBuf::from("pending_contacts.json")
}

fn default_signature() -> String {
    "Sai Kumar".to_owned()
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_upload_folder")]
    pub folder: PathBuf,
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            folder: default_upload_folder(),
            max_content_length: default_max_content_length(),
        }
    }
}

fn default_upload_folder() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_content_length() -> usize {
    16 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DebugConfig {
    /// Shared key guarding `/debug-smtp`; the route is disabled when unset
    #[serde(default)]
    pub smtp_key: Option<String>,
}

impl DebugConfig {
    pub fn smtp_key(&self) -> Option<&str> {
        self.smtp_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy variables (EMAIL_ADDRESS, EMAIL_PASSWORD, SECRET_KEY, PORT, ...)
    /// 2. Environment variables (PORTFOLIO__EMAIL__SMTP_HOST, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("session.secret", "your_secret_key_here_change_in_production")?
            .set_default("session.ttl_days", 31)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Optional, ignored when missing
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("PORTFOLIO")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in [
            ("EMAIL_ADDRESS", "email.address"),
            ("EMAIL_PASSWORD", "email.password"),
            ("SECRET_KEY", "session.secret"),
            ("DEBUG_SMTP_KEY", "debug.smtp_key"),
            ("UPLOAD_FOLDER", "upload.folder"),
        ] {
            if let Ok(value) = env::var(var) {
                builder = builder.set_override(key, value.trim().to_owned())?;
            }
        }

        for (var, key) in [
            ("MAX_CONTENT_LENGTH", "upload.max_content_length"),
            ("PORT", "server.port"),
        ] {
            if let Some(value) = env::var(var).ok().and_then(|v| v.trim().parse::<i64>().ok()) {
                builder = builder.set_override(key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.session.secret.trim().is_empty() {
            return Err("Session secret must not be empty".to_string());
        }
        if self.session.ttl_days == 0 {
            return Err("Session ttl_days must be at least 1".to_string());
        }
        if self.upload.max_content_length == 0 {
            return Err("Upload max_content_length must be greater than 0".to_string());
        }
        Ok(())
    }
}

//! Configuration management for Nexa Studio.
//!
//! Handles loading and saving configuration from TOML files, with
//! environment variable overrides for secrets and deployment settings.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory name used under the platform config and data directories.
const APP_DIR: &str = "nexa-studio";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// OpenAI settings
    pub ai: AiConfig,

    /// Session database settings
    pub database: DatabaseConfig,

    /// HTML to PDF conversion settings
    pub pdf: PdfConfig,

    /// Company name and logos used in documents
    pub branding: BrandingConfig,

    /// ImgBB image hosting
    pub imgbb: ImgbbConfig,

    /// LangFuse tracing
    pub langfuse: LangfuseConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: 127.0.0.1).
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 5000).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), cors_origins: Vec::new() }
    }
}

impl ServerConfig {
    /// Get the socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// OpenAI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// API key; usually supplied through OPENAI_API_KEY
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API base URL
    pub base_url: String,

    /// Chat model
    pub model: String,

    /// Assistant used for diagram sketches; chat completions are used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,

    /// Assistant run limit in seconds (capped at 300)
    pub assistant_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            assistant_id: None,
            assistant_timeout_secs: 120,
        }
    }
}

/// Session database settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; defaults to `sessions.db` in the data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Resolve the database file path.
    pub fn resolve_path(&self) -> PathBuf {
        self.path
            .clone()
            .or_else(|| Config::data_dir().map(|d| d.join("sessions.db")))
            .unwrap_or_else(|| PathBuf::from("sessions.db"))
    }
}

/// Which HTML to PDF backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfEngine {
    /// Pipe HTML through a local command
    #[default]
    Command,
    /// POST HTML to a remote PDF service
    Service,
}

/// HTML to PDF conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub engine: PdfEngine,

    /// Program and arguments; HTML on stdin, PDF on stdout
    pub command: Vec<String>,

    /// Base URL of the PDF service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,

    /// Conversion timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            engine: PdfEngine::Command,
            command: vec!["weasyprint".to_string(), "-".to_string(), "-".to_string()],
            service_url: None,
            timeout_secs: 60,
        }
    }
}

/// Company name and logos used in documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    /// Company named in footers and confidentiality notices
    pub company_name: String,

    /// Default main logo (PNG), used on covers and document headers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_logo: Option<PathBuf>,

    /// Default secondary logo (PNG), used in solution page headers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_logo: Option<PathBuf>,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self { company_name: "Dry Ground AI".to_string(), main_logo: None, second_logo: None }
    }
}

/// ImgBB image hosting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImgbbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// LangFuse tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LangfuseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    pub host: String,
}

impl Default for LangfuseConfig {
    fn default() -> Self {
        Self { public_key: None, secret_key: None, host: "https://cloud.langfuse.com".to_string() }
    }
}

impl LangfuseConfig {
    /// Whether both keys are present.
    pub fn is_configured(&self) -> bool {
        self.public_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.secret_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `nexa.toml` in current directory
    /// 2. `~/.config/nexa-studio/config.toml`
    /// 3. Falls back to defaults
    ///
    /// Environment variables are applied on top.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match Self::locate() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Path of the config file `load` would read, if any exists.
    pub fn locate() -> Option<PathBuf> {
        let local_config = PathBuf::from("nexa.toml");
        if local_config.exists() {
            return Some(local_config);
        }
        Self::config_dir().map(|d| d.join("config.toml")).filter(|p| p.exists())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("OPENAI_API_KEY") {
            self.ai.api_key = Some(key);
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            self.ai.base_url = url;
        }
        if let Some(model) = var("NEXA_MODEL") {
            self.ai.model = model;
        }
        if let Some(id) = var("NEXA_ASSISTANT_ID") {
            self.ai.assistant_id = Some(id);
        }
        if let Some(key) = var("IMGBB_API_KEY") {
            self.imgbb.api_key = Some(key);
        }
        if let Some(key) = var("LANGFUSE_PUBLIC_KEY") {
            self.langfuse.public_key = Some(key);
        }
        if let Some(key) = var("LANGFUSE_SECRET_KEY") {
            self.langfuse.secret_key = Some(key);
        }
        if let Some(host) = var("LANGFUSE_HOST") {
            self.langfuse.host = host;
        }
        if let Some(path) = var("NEXA_DATABASE_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(url) = var("NEXA_PDF_SERVICE_URL") {
            self.pdf.service_url = Some(url);
            self.pdf.engine = PdfEngine::Service;
        }
        if let Some(port) = var("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid PORT"),
            }
        }
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        std::fs::create_dir_all(&dir)?;

        let config_path = dir.join("config.toml");
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(config_path)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR))
    }

    /// Get the data directory path (for the session database).
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join(APP_DIR))
    }
}

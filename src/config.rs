use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_CLOUD_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_CLOUD_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub cloud: CloudConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// Cloud fallback settings, passed into the cloud client at construction time.
#[derive(Clone, Deserialize)]
pub struct CloudConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CloudConfig {
    /// Enabled and holding a non-empty credential
    pub fn is_available(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            model: DEFAULT_CLOUD_MODEL.to_string(),
            endpoint: DEFAULT_CLOUD_ENDPOINT.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

// Keeps the credential out of logs
impl std::fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Try to load the full statistics engine at startup
    pub full_engine: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir = match env::var("LOCALMIND_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("localmind"),
        };

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            },
            storage: StorageConfig { data_dir },
            cloud: CloudConfig {
                enabled: env::var("CLOUD_ENABLED")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()?,
                api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
                model: env::var("CLOUD_MODEL").unwrap_or_else(|_| DEFAULT_CLOUD_MODEL.to_string()),
                endpoint: env::var("CLOUD_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_CLOUD_ENDPOINT.to_string()),
                temperature: env::var("CLOUD_TEMPERATURE")
                    .unwrap_or_else(|_| "0.7".to_string())
                    .parse()?,
                max_tokens: env::var("CLOUD_MAX_TOKENS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()?,
            },
            analysis: AnalysisConfig {
                full_engine: env::var("FULL_STATS_ENGINE")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
            },
        })
    }

    /// Defaults rooted at `data_dir`, without reading the environment
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                host: "127.0.0.1".to_string(),
            },
            storage: StorageConfig { data_dir },
            cloud: CloudConfig::default(),
            analysis: AnalysisConfig { full_engine: true },
        }
    }
}

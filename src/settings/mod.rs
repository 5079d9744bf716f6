//! Settings Module
//!
//! Well-known setting keys and how they override the environment. Settings
//! themselves live in the local store; `cloud_api_key` is encrypted at rest.

pub mod routes;

pub use routes::router;

use serde::Serialize;

use crate::config::CloudConfig;
use crate::storage::{LocalStore, SECRET_SETTINGS};

pub const CLOUD_ENABLED: &str = "cloud_enabled";
pub const CLOUD_API_KEY: &str = "cloud_api_key";
pub const CLOUD_MODEL: &str = "cloud_model";

/// Environment defaults overlaid with whatever the user saved
pub async fn resolve_cloud_config(base: &CloudConfig, store: &LocalStore) -> CloudConfig {
    let mut config = base.clone();

    if let Some(enabled) = store.get_setting(CLOUD_ENABLED).await.and_then(|v| v.as_bool()) {
        config.enabled = enabled;
    }
    if let Some(key) = store
        .get_setting(CLOUD_API_KEY)
        .await
        .and_then(|v| v.as_str().map(str::to_string))
    {
        config.api_key = Some(key).filter(|k| !k.is_empty());
    }
    if let Some(model) = store
        .get_setting(CLOUD_MODEL)
        .await
        .and_then(|v| v.as_str().map(str::to_string))
        .filter(|m| !m.is_empty())
    {
        config.model = model;
    }

    config
}

pub fn is_secret(key: &str) -> bool {
    SECRET_SETTINGS.contains(&key)
}

/// Last four characters only
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 4 {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("••••{}", tail)
    } else {
        "••••".to_string()
    }
}

/// Cloud status for display (masks the key)
#[derive(Debug, Clone, Serialize)]
pub struct CloudStatus {
    pub enabled: bool,
    pub has_key: bool,
    pub key_hint: Option<String>,
    pub model: String,
    pub available: bool,
}

impl From<&CloudConfig> for CloudStatus {
    fn from(config: &CloudConfig) -> Self {
        Self {
            enabled: config.enabled,
            has_key: config.api_key.is_some(),
            key_hint: config.api_key.as_deref().map(mask_secret),
            model: config.model.clone(),
            available: config.is_available(),
        }
    }
}

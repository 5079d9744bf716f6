use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::analysis::DataProcessor;
use crate::config::Config;
use crate::conversation::Transcript;
use crate::llm::LLMAdapter;
use crate::storage::LocalStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: LocalStore,
    pub processor: Arc<DataProcessor>,
    pub adapter: Arc<dyn LLMAdapter>,
    pub transcript: Arc<RwLock<Transcript>>,
}

/// An imported file. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: Uuid,
    pub name: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    /// Size of the imported file in bytes
    pub size: u64,
}

impl Dataset {
    pub fn new(name: impl Into<String>, data: serde_json::Value, size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            data,
            created_at: Utc::now(),
            size,
        }
    }

    /// Number of top-level records (1 for a single object)
    pub fn record_count(&self) -> usize {
        match &self.data {
            serde_json::Value::Array(rows) => rows.len(),
            serde_json::Value::Null => 0,
            _ => 1,
        }
    }
}

/// Dataset listing entry without the payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub size: u64,
    pub records: usize,
}

impl From<&Dataset> for DatasetSummary {
    fn from(dataset: &Dataset) -> Self {
        Self {
            id: dataset.id,
            name: dataset.name.clone(),
            created_at: dataset.created_at,
            size: dataset.size,
            records: dataset.record_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
        }
    }
}

/// Where a message was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Cloud,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub origin: Origin,
    /// Set on the assistant placeholder while a reply is in flight
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>, origin: Origin) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            origin,
            pending: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, Origin::Local)
    }

    pub fn assistant(content: impl Into<String>, origin: Origin) -> Self {
        Self::new(Role::Assistant, content, origin)
    }

    pub fn placeholder() -> Self {
        Self {
            pending: true,
            ..Self::new(Role::Assistant, "Processing...", Origin::Local)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
}

// HTTP payloads

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message_id: Uuid,
    pub content: String,
    pub origin: Origin,
    pub response_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub storage: String,
    pub analysis_engine: String,
    pub cloud_configured: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingUpdate {
    pub value: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_count() {
        assert_eq!(Dataset::new("a", json!([{"x": 1}, {"x": 2}]), 10).record_count(), 2);
        assert_eq!(Dataset::new("b", json!({"x": 1}), 10).record_count(), 1);
    }

    #[test]
    fn test_message_wire_format() {
        let msg = ConversationMessage::assistant("hi", Origin::Cloud);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["origin"], "cloud");
        assert!(value.get("pending").is_none());

        let pending = serde_json::to_value(ConversationMessage::placeholder()).unwrap();
        assert_eq!(pending["pending"], true);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ConversationMessage::user("x");
        let b = ConversationMessage::user("x");
        assert_ne!(a.id, b.id);
    }
}

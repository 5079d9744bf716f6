//! Local Store
//!
//! Persists three collections (datasets, conversations, settings) as JSON
//! files under a data directory. Writes before [`LocalStore::init`] fail with
//! [`AppError::StoreNotInitialized`]; reads before init return empty results.

pub mod crypto;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{ConversationMessage, Dataset};
use crate::types::{AppError, AppResult};
use crypto::SecretCipher;

pub const SCHEMA_VERSION: u32 = 1;

const META_FILE: &str = "meta.json";
const DATASETS_FILE: &str = "datasets.json";
const CONVERSATIONS_FILE: &str = "conversations.json";
const SETTINGS_FILE: &str = "settings.json";
const KEY_FILE: &str = ".store_key";

/// Settings encrypted at rest
pub const SECRET_SETTINGS: &[&str] = &["cloud_api_key"];

#[derive(Debug, Serialize, Deserialize)]
struct StoreMeta {
    schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSetting {
    value: serde_json::Value,
    #[serde(default)]
    encrypted: bool,
}

struct Collections {
    datasets: Vec<Dataset>,
    conversations: Vec<ConversationMessage>,
    settings: BTreeMap<String, StoredSetting>,
    cipher: SecretCipher,
}

#[derive(Clone)]
pub struct LocalStore {
    base_dir: PathBuf,
    inner: Arc<RwLock<Option<Collections>>>,
}

impl LocalStore {
    pub fn with_path(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            inner: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Open the data directory, creating it and the schema marker on first use
    pub async fn init(&self) -> AppResult<()> {
        fs::create_dir_all(&self.base_dir).await?;

        let meta_path = self.base_dir.join(META_FILE);
        if fs::try_exists(&meta_path).await? {
            let meta: StoreMeta = serde_json::from_str(&fs::read_to_string(&meta_path).await?)?;
            if meta.schema_version != SCHEMA_VERSION {
                return Err(AppError::SchemaVersion(meta.schema_version));
            }
        } else {
            let meta = StoreMeta {
                schema_version: SCHEMA_VERSION,
            };
            write_json(&meta_path, &meta).await?;
        }

        let collections = Collections {
            datasets: read_collection(&self.base_dir.join(DATASETS_FILE)).await?,
            conversations: read_collection(&self.base_dir.join(CONVERSATIONS_FILE)).await?,
            settings: read_collection(&self.base_dir.join(SETTINGS_FILE)).await?,
            cipher: SecretCipher::load_or_create(&self.base_dir.join(KEY_FILE)).await?,
        };

        info!(
            path = ?self.base_dir,
            datasets = collections.datasets.len(),
            messages = collections.conversations.len(),
            "Local store initialized"
        );

        *self.inner.write().await = Some(collections);
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.read().await.is_some()
    }

    // Datasets

    pub async fn save_dataset(&self, dataset: &Dataset) -> AppResult<()> {
        let mut guard = self.inner.write().await;
        let collections = guard.as_mut().ok_or(AppError::StoreNotInitialized)?;

        let mut datasets = collections.datasets.clone();
        match datasets.iter_mut().find(|d| d.id == dataset.id) {
            Some(existing) => *existing = dataset.clone(),
            None => datasets.push(dataset.clone()),
        }
        write_json(&self.base_dir.join(DATASETS_FILE), &datasets).await?;
        collections.datasets = datasets;

        debug!(dataset_id = %dataset.id, name = %dataset.name, "Saved dataset");
        Ok(())
    }

    pub async fn get_dataset(&self, id: Uuid) -> Option<Dataset> {
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .and_then(|c| c.datasets.iter().find(|d| d.id == id).cloned())
    }

    pub async fn list_datasets(&self) -> Vec<Dataset> {
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .map(|c| c.datasets.clone())
            .unwrap_or_default()
    }

    pub async fn dataset_count(&self) -> usize {
        let guard = self.inner.read().await;
        guard.as_ref().map(|c| c.datasets.len()).unwrap_or(0)
    }

    /// Returns whether a dataset with `id` existed
    pub async fn delete_dataset(&self, id: Uuid) -> AppResult<bool> {
        let mut guard = self.inner.write().await;
        let collections = guard.as_mut().ok_or(AppError::StoreNotInitialized)?;

        if !collections.datasets.iter().any(|d| d.id == id) {
            return Ok(false);
        }

        let datasets: Vec<Dataset> = collections
            .datasets
            .iter()
            .filter(|d| d.id != id)
            .cloned()
            .collect();
        write_json(&self.base_dir.join(DATASETS_FILE), &datasets).await?;
        collections.datasets = datasets;

        debug!(dataset_id = %id, "Deleted dataset");
        Ok(true)
    }

    // Conversations

    pub async fn append_message(&self, message: &ConversationMessage) -> AppResult<()> {
        let mut guard = self.inner.write().await;
        let collections = guard.as_mut().ok_or(AppError::StoreNotInitialized)?;

        let mut conversations = collections.conversations.clone();
        conversations.push(message.clone());
        write_json(&self.base_dir.join(CONVERSATIONS_FILE), &conversations).await?;
        collections.conversations = conversations;
        Ok(())
    }

    pub async fn list_messages(&self) -> Vec<ConversationMessage> {
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .map(|c| c.conversations.clone())
            .unwrap_or_default()
    }

    pub async fn clear_messages(&self) -> AppResult<()> {
        let mut guard = self.inner.write().await;
        let collections = guard.as_mut().ok_or(AppError::StoreNotInitialized)?;

        write_json(
            &self.base_dir.join(CONVERSATIONS_FILE),
            &Vec::<ConversationMessage>::new(),
        )
        .await?;
        collections.conversations.clear();
        Ok(())
    }

    // Settings

    pub async fn set_setting(&self, key: &str, value: serde_json::Value) -> AppResult<()> {
        let mut guard = self.inner.write().await;
        let collections = guard.as_mut().ok_or(AppError::StoreNotInitialized)?;

        let stored = match value {
            serde_json::Value::String(secret)
                if SECRET_SETTINGS.contains(&key) && !secret.is_empty() =>
            {
                StoredSetting {
                    value: serde_json::Value::String(collections.cipher.encrypt(&secret)?),
                    encrypted: true,
                }
            }
            value => StoredSetting {
                value,
                encrypted: false,
            },
        };

        let mut settings = collections.settings.clone();
        settings.insert(key.to_string(), stored);
        write_json(&self.base_dir.join(SETTINGS_FILE), &settings).await?;
        collections.settings = settings;

        debug!(key, "Saved setting");
        Ok(())
    }

    pub async fn get_setting(&self, key: &str) -> Option<serde_json::Value> {
        let guard = self.inner.read().await;
        let collections = guard.as_ref()?;
        let stored = collections.settings.get(key)?;

        if !stored.encrypted {
            return Some(stored.value.clone());
        }

        let encrypted = stored.value.as_str()?;
        match collections.cipher.decrypt(encrypted) {
            Ok(plaintext) => Some(serde_json::Value::String(plaintext)),
            Err(e) => {
                warn!(key, error = %e, "Failed to decrypt stored setting, it may be corrupted");
                None
            }
        }
    }
}

async fn read_collection<T: DeserializeOwned + Default>(path: &Path) -> AppResult<T> {
    if !fs::try_exists(path).await? {
        return Ok(T::default());
    }
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Write through a temporary file so a crash never leaves a truncated collection
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> AppResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Origin, Role};
    use serde_json::json;
    use tempfile::TempDir;

    async fn open(dir: &TempDir) -> LocalStore {
        let store = LocalStore::with_path(dir.path().to_path_buf());
        store.init().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_setting_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).await;

        store.set_setting("theme", json!("dark")).await.unwrap();
        assert_eq!(store.get_setting("theme").await, Some(json!("dark")));

        store.set_setting("theme", json!({"mode": "light"})).await.unwrap();
        assert_eq!(store.get_setting("theme").await, Some(json!({"mode": "light"})));

        assert_eq!(store.get_setting("missing").await, None);
    }

    #[tokio::test]
    async fn test_uninitialized_reads_empty_writes_fail() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::with_path(temp_dir.path().to_path_buf());

        assert!(!store.is_initialized().await);
        assert!(store.list_datasets().await.is_empty());
        assert!(store.list_messages().await.is_empty());
        assert_eq!(store.get_setting("theme").await, None);
        assert_eq!(store.dataset_count().await, 0);

        let err = store.set_setting("theme", json!("dark")).await.unwrap_err();
        assert!(matches!(err, AppError::StoreNotInitialized));
        let err = store
            .save_dataset(&Dataset::new("a.json", json!([]), 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StoreNotInitialized));
        let err = store
            .append_message(&ConversationMessage::user("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StoreNotInitialized));
    }

    #[tokio::test]
    async fn test_collections_persist_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let dataset = Dataset::new("people.csv", json!([{"a": 1}]), 6);
        {
            let store = open(&temp_dir).await;
            store.save_dataset(&dataset).await.unwrap();
            store
                .append_message(&ConversationMessage::user("hello"))
                .await
                .unwrap();
            store
                .append_message(&ConversationMessage::assistant("hi there", Origin::Local))
                .await
                .unwrap();
            store.set_setting("cloud_enabled", json!(true)).await.unwrap();
        }

        let store = open(&temp_dir).await;
        assert_eq!(store.get_dataset(dataset.id).await, Some(dataset.clone()));
        let messages = store.list_messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].content, "hi there");
        assert_eq!(store.get_setting("cloud_enabled").await, Some(json!(true)));
    }

    #[tokio::test]
    async fn test_delete_dataset() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).await;
        let dataset = Dataset::new("a.json", json!({"x": 1}), 8);
        store.save_dataset(&dataset).await.unwrap();
        assert_eq!(store.dataset_count().await, 1);

        assert!(store.delete_dataset(dataset.id).await.unwrap());
        assert!(!store.delete_dataset(dataset.id).await.unwrap());
        assert_eq!(store.get_dataset(dataset.id).await, None);
    }

    #[tokio::test]
    async fn test_api_key_encrypted_at_rest() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).await;

        store
            .set_setting("cloud_api_key", json!("sk-test-key-12345"))
            .await
            .unwrap();

        let on_disk = std::fs::read_to_string(temp_dir.path().join(SETTINGS_FILE)).unwrap();
        assert!(!on_disk.contains("sk-test-key-12345"));
        assert_eq!(
            store.get_setting("cloud_api_key").await,
            Some(json!("sk-test-key-12345"))
        );

        let reopened = open(&temp_dir).await;
        assert_eq!(
            reopened.get_setting("cloud_api_key").await,
            Some(json!("sk-test-key-12345"))
        );
    }

    #[tokio::test]
    async fn test_failed_write_leaves_collections_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("store");
        let store = LocalStore::with_path(base.clone());
        store.init().await.unwrap();

        let kept = Dataset::new("kept.json", json!([{"x": 1}]), 10);
        store.save_dataset(&kept).await.unwrap();
        store.set_setting("theme", json!("light")).await.unwrap();
        store
            .append_message(&ConversationMessage::user("hello"))
            .await
            .unwrap();

        std::fs::remove_dir_all(&base).unwrap();

        let lost = Dataset::new("lost.json", json!([]), 2);
        assert!(store.save_dataset(&lost).await.is_err());
        assert_eq!(store.dataset_count().await, 1);
        assert_eq!(store.get_dataset(lost.id).await, None);

        assert!(store.delete_dataset(kept.id).await.is_err());
        assert_eq!(store.get_dataset(kept.id).await, Some(kept));

        assert!(store.set_setting("theme", json!("dark")).await.is_err());
        assert_eq!(store.get_setting("theme").await, Some(json!("light")));

        assert!(store
            .append_message(&ConversationMessage::user("again"))
            .await
            .is_err());
        assert!(store.clear_messages().await.is_err());
        assert_eq!(store.list_messages().await.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_unknown_schema_version() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(META_FILE), r#"{"schema_version": 2}"#).unwrap();

        let store = LocalStore::with_path(temp_dir.path().to_path_buf());
        let err = store.init().await.unwrap_err();
        assert!(matches!(err, AppError::SchemaVersion(2)));
        assert!(!store.is_initialized().await);
    }
}

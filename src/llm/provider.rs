use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::CloudConfig;
use crate::models::{ConversationMessage, Role};
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest, LLMResponse};

/// Trailing history turns forwarded with each cloud request
pub const MAX_HISTORY_TURNS: usize = 5;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant inside a local-first data analysis app. \
The user's files and history stay on their device; only this conversation is shared with you. \
Answer clearly and concisely.";

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(
        &self,
        config: &CloudConfig,
        request: &LLMRequest,
    ) -> AppResult<LLMResponse>;
}

/// Gate in front of an [`LLMAdapter`]: checks the enable flag and credential,
/// builds the message envelope, and surfaces failures without retrying.
pub struct CloudClient {
    config: CloudConfig,
    adapter: Arc<dyn LLMAdapter>,
}

impl CloudClient {
    pub fn new(config: CloudConfig, adapter: Arc<dyn LLMAdapter>) -> Self {
        Self { config, adapter }
    }

    pub fn is_available(&self) -> bool {
        self.config.is_available()
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    pub fn build_request(&self, history: &[ConversationMessage], query: &str) -> LLMRequest {
        let turns: Vec<&ConversationMessage> = history
            .iter()
            .filter(|m| !m.pending && m.role != Role::System)
            .collect();
        let start = turns.len().saturating_sub(MAX_HISTORY_TURNS);

        let mut messages = Vec::with_capacity(MAX_HISTORY_TURNS + 2);
        messages.push(LLMMessage::system(SYSTEM_PROMPT));
        messages.extend(
            turns[start..]
                .iter()
                .map(|m| LLMMessage::new(m.role.to_string(), m.content.clone())),
        );
        messages.push(LLMMessage::user(query));

        LLMRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        }
    }

    pub async fn complete(&self, history: &[ConversationMessage], query: &str) -> AppResult<String> {
        if !self.config.enabled {
            return Err(AppError::CloudDisabled);
        }
        if !self.config.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
            return Err(AppError::MissingApiKey);
        }

        let request = self.build_request(history, query);
        info!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending query to cloud"
        );

        let response = self.adapter.create_chat_completion(&self.config, &request).await?;
        info!(response_len = response.content.len(), "Cloud reply received");
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Origin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAdapter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LLMAdapter for CountingAdapter {
        async fn create_chat_completion(
            &self,
            _config: &CloudConfig,
            request: &LLMRequest,
        ) -> AppResult<LLMResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LLMResponse {
                content: format!("{} messages", request.messages.len()),
                finish_reason: None,
                usage: None,
            })
        }
    }

    fn client(config: CloudConfig) -> (CloudClient, Arc<CountingAdapter>) {
        let adapter = Arc::new(CountingAdapter {
            calls: AtomicUsize::new(0),
        });
        (CloudClient::new(config, adapter.clone()), adapter)
    }

    fn enabled() -> CloudConfig {
        CloudConfig {
            enabled: true,
            api_key: Some("sk-test".to_string()),
            ..CloudConfig::default()
        }
    }

    #[tokio::test]
    async fn test_disabled_fails_without_call() {
        let (client, adapter) = client(CloudConfig {
            api_key: Some("sk-test".to_string()),
            ..CloudConfig::default()
        });
        let err = client.complete(&[], "question").await.unwrap_err();
        assert!(matches!(err, AppError::CloudDisabled));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_call() {
        let (client, adapter) = client(CloudConfig {
            enabled: true,
            ..CloudConfig::default()
        });
        let err = client.complete(&[], "question").await.unwrap_err();
        assert!(matches!(err, AppError::MissingApiKey));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_complete_returns_reply() {
        let (client, adapter) = client(enabled());
        let reply = client.complete(&[], "question").await.unwrap();
        assert_eq!(reply, "2 messages");
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_request_keeps_last_five_turns() {
        let (client, _) = client(enabled());
        let mut history: Vec<ConversationMessage> = (0..8)
            .map(|i| ConversationMessage::user(format!("turn {i}")))
            .collect();
        history.push(ConversationMessage::placeholder());

        let request = client.build_request(&history, "new question");
        assert_eq!(request.messages.len(), 7);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].content, "turn 3");
        assert_eq!(request.messages[5].content, "turn 7");
        assert_eq!(request.messages[6], LLMMessage::user("new question"));
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.max_tokens, Some(1000));
    }

    #[test]
    fn test_request_maps_roles() {
        let (client, _) = client(enabled());
        let history = vec![
            ConversationMessage::user("hi"),
            ConversationMessage::assistant("hello", Origin::Local),
        ];
        let request = client.build_request(&history, "next");
        let roles: Vec<&str> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    }
}

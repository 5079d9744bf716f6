use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::agents::QueryRouter;
use crate::llm::CloudClient;
use crate::models::{AppState, ChatRequest, ChatResponse, ConversationMessage};
use crate::settings::resolve_cloud_config;
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(post_chat))
        .route("/api/chat/messages", get(list_messages).delete(clear_messages))
        .with_state(state)
}

pub async fn post_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let started = Instant::now();
    let query = request.message.trim();
    if query.is_empty() {
        return Err(AppError::InvalidRequest("message must not be empty".to_string()));
    }
    info!(message_len = query.len(), "Received chat message");

    let user_message = ConversationMessage::user(query);
    state.store.append_message(&user_message).await?;

    let placeholder = ConversationMessage::placeholder();
    let history = {
        let mut transcript = state.transcript.write().await;
        let history = transcript.history();
        transcript.upsert(user_message);
        transcript.upsert(placeholder.clone());
        history
    };

    let cloud = resolve_cloud_config(&state.config.cloud, &state.store).await;
    let router = QueryRouter::new(
        state.store.clone(),
        CloudClient::new(cloud, state.adapter.clone()),
    );
    let reply = router.respond(query, &history).await;

    let assistant_message = ConversationMessage {
        id: placeholder.id,
        ..ConversationMessage::assistant(reply.content, reply.origin)
    };
    state.store.append_message(&assistant_message).await?;
    state.transcript.write().await.upsert(assistant_message.clone());

    let response = ChatResponse {
        message_id: assistant_message.id,
        content: assistant_message.content,
        origin: assistant_message.origin,
        response_time: started.elapsed().as_millis() as u64,
    };
    info!(message_id = %response.message_id, origin = ?response.origin, "Chat reply sent");

    Ok(Json(response))
}

async fn list_messages(State(state): State<AppState>) -> Json<Vec<ConversationMessage>> {
    Json(state.transcript.read().await.messages().to_vec())
}

async fn clear_messages(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.store.clear_messages().await?;
    state.transcript.write().await.clear();
    info!("Conversation history cleared");
    Ok(StatusCode::NO_CONTENT)
}

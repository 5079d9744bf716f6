use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::analysis::{analyze_sentiment, extract_keywords, summarize, Keyword, SentimentResult};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOperation {
    Sentiment,
    Keywords,
    Summarize,
}

#[derive(Debug, Deserialize)]
pub struct TextAnalysisRequest {
    pub text: String,
    pub operation: TextOperation,
}

#[derive(Debug, Serialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum TextAnalysisResponse {
    Sentiment(SentimentResult),
    Keywords { keywords: Vec<Keyword> },
    Summarize { summary: String },
}

pub fn router() -> Router {
    Router::new().route("/api/analyze/text", post(analyze_text))
}

async fn analyze_text(Json(request): Json<TextAnalysisRequest>) -> Json<TextAnalysisResponse> {
    let response = match request.operation {
        TextOperation::Sentiment => TextAnalysisResponse::Sentiment(analyze_sentiment(&request.text)),
        TextOperation::Keywords => TextAnalysisResponse::Keywords {
            keywords: extract_keywords(&request.text),
        },
        TextOperation::Summarize => TextAnalysisResponse::Summarize {
            summary: summarize(&request.text),
        },
    };
    Json(response)
}

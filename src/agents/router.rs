//! Query Router
//!
//! Decides whether a chat message can be answered locally. Rules are checked
//! in order against the lower-cased query and the first match wins; anything
//! unmatched is handed to the cloud client when it is enabled and holds a
//! credential. Cloud failures never reach the caller: they degrade to the
//! local fallback text plus [`CLOUD_HINT`].

use tracing::{debug, info, warn};

use crate::analysis::{analyze_sentiment, extract_keywords};
use crate::llm::CloudClient;
use crate::models::{ConversationMessage, Origin};
use crate::storage::LocalStore;

pub const CLOUD_HINT: &str =
    "\n\nEnable cloud processing in Settings and add an API key to get more detailed answers.";

const DATA_TERMS: &[&str] = &["data", "analyze", "dataset"];
const SENTIMENT_TERMS: &[&str] = &["sentiment", "feeling", "emotion"];
const KEYWORD_TERMS: &[&str] = &["keyword", "important words"];
const GREETING_TERMS: &[&str] = &["hello", "hi", "hey"];
const HELP_TERMS: &[&str] = &["help", "what can you do"];
const COMPLEX_TERMS: &[&str] = &["explain", "complex", "detailed"];

const COMPLEX_QUERY_LEN: usize = 100;

const GREETING: &str = "Hello! I'm your local-first assistant. I can look at your uploaded datasets, \
score the sentiment of a message and pick out its keywords, all without your data leaving this device. \
Ask for help to see everything I can do.";

const CAPABILITIES: &str = "Here's what I can do locally:\n\
- Count and summarize the datasets you've uploaded (CSV or JSON)\n\
- Compute descriptive statistics for numeric columns\n\
- Score the sentiment of a message\n\
- Extract the most important keywords from a message\n\
- Summarize longer text\n\
With cloud processing enabled, anything else is forwarded to a cloud model.";

const COMPLEX_FALLBACK: &str =
    "This question needs deeper reasoning than local processing can offer.";
const GENERIC_FALLBACK: &str =
    "I've processed your message locally, but I don't have a built-in answer for it.";

/// Outcome of the local rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalDecision {
    /// Answered locally, no cloud call
    Final(String),
    /// Cloud should handle it; the text is used if it can't
    NeedsCloud(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterReply {
    pub content: String,
    pub origin: Origin,
}

pub struct QueryRouter {
    store: LocalStore,
    cloud: CloudClient,
}

impl QueryRouter {
    pub fn new(store: LocalStore, cloud: CloudClient) -> Self {
        Self { store, cloud }
    }

    pub async fn route_locally(&self, query: &str) -> LocalDecision {
        let lowered = query.to_lowercase();
        let contains_any = |terms: &[&str]| terms.iter().any(|t| lowered.contains(t));

        if contains_any(DATA_TERMS) {
            return LocalDecision::Final(dataset_report(self.store.dataset_count().await));
        }
        if contains_any(SENTIMENT_TERMS) {
            let sentiment = analyze_sentiment(query);
            return LocalDecision::Final(format!(
                "Sentiment: {} (confidence {:.0}%, {} positive and {} negative words).",
                sentiment.label,
                sentiment.confidence * 100.0,
                sentiment.positive_count,
                sentiment.negative_count
            ));
        }
        if contains_any(KEYWORD_TERMS) {
            let keywords = extract_keywords(query);
            if keywords.is_empty() {
                return LocalDecision::Final(
                    "I couldn't find any significant keywords in your message.".to_string(),
                );
            }
            let listed: Vec<String> = keywords
                .iter()
                .map(|k| format!("{} ({})", k.word, k.count))
                .collect();
            return LocalDecision::Final(format!("Top keywords: {}", listed.join(", ")));
        }
        if contains_any(GREETING_TERMS) {
            return LocalDecision::Final(GREETING.to_string());
        }
        if contains_any(HELP_TERMS) {
            return LocalDecision::Final(CAPABILITIES.to_string());
        }
        if query.chars().count() > COMPLEX_QUERY_LEN || contains_any(COMPLEX_TERMS) {
            return LocalDecision::NeedsCloud(COMPLEX_FALLBACK.to_string());
        }
        LocalDecision::NeedsCloud(GENERIC_FALLBACK.to_string())
    }

    pub async fn respond(&self, query: &str, history: &[ConversationMessage]) -> RouterReply {
        let fallback = match self.route_locally(query).await {
            LocalDecision::Final(content) => {
                debug!("Answered locally");
                return RouterReply {
                    content,
                    origin: Origin::Local,
                };
            }
            LocalDecision::NeedsCloud(fallback) => fallback,
        };

        if !self.cloud.is_available() {
            debug!("Cloud processing not configured, returning local fallback");
            return hinted(fallback);
        }

        match self.cloud.complete(history, query).await {
            Ok(content) => {
                info!("Answered via cloud");
                RouterReply {
                    content,
                    origin: Origin::Cloud,
                }
            }
            Err(e) => {
                warn!(error = %e, "Cloud processing failed, returning local fallback");
                hinted(fallback)
            }
        }
    }
}

fn hinted(fallback: String) -> RouterReply {
    RouterReply {
        content: format!("{}{}", fallback, CLOUD_HINT),
        origin: Origin::Local,
    }
}

fn dataset_report(count: usize) -> String {
    match count {
        0 => "You haven't uploaded any datasets yet. Upload a CSV or JSON file and I can summarize it locally."
            .to_string(),
        1 => "You have 1 dataset stored locally. Open it from the datasets list to run a summary or statistics."
            .to_string(),
        n => format!(
            "You have {} datasets stored locally. Open one from the datasets list to run a summary or statistics.",
            n
        ),
    }
}

//! Word-list sentiment, frequency keywords and truncation summaries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "fantastic", "love", "like", "happy",
    "joy", "pleased", "satisfied", "awesome", "best", "perfect", "positive", "beautiful",
    "brilliant", "glad", "nice",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "hate", "dislike", "sad", "angry", "disappointed",
    "frustrated", "worst", "poor", "annoying", "upset", "unhappy", "negative", "ugly", "fail",
    "broken", "wrong",
];

const MAX_KEYWORDS: usize = 10;
const MIN_KEYWORD_LEN: usize = 4;
const MAX_SUMMARY_SENTENCES: usize = 3;
const SUMMARY_RATIO: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// positive minus negative hits
    pub score: i64,
    /// |score| / token count, in [0, 1]
    pub confidence: f64,
    pub positive_count: usize,
    pub negative_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub count: usize,
}

/// Score `text` against the fixed word lists.
///
/// Tokens are whitespace separated and lower-cased but otherwise untouched,
/// so `"great!"` does not count as `"great"`.
pub fn analyze_sentiment(text: &str) -> SentimentResult {
    let tokens: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();

    let positive_count = tokens
        .iter()
        .filter(|t| POSITIVE_WORDS.contains(&t.as_str()))
        .count();
    let negative_count = tokens
        .iter()
        .filter(|t| NEGATIVE_WORDS.contains(&t.as_str()))
        .count();

    let score = positive_count as i64 - negative_count as i64;
    let label = match score {
        s if s > 0 => SentimentLabel::Positive,
        s if s < 0 => SentimentLabel::Negative,
        _ => SentimentLabel::Neutral,
    };
    let confidence = if tokens.is_empty() {
        0.0
    } else {
        score.unsigned_abs() as f64 / tokens.len() as f64
    };

    SentimentResult {
        label,
        score,
        confidence,
        positive_count,
        negative_count,
    }
}

/// Top terms by frequency; ties keep first-seen order.
pub fn extract_keywords(text: &str) -> Vec<Keyword> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in cleaned.split_whitespace() {
        if word.chars().count() < MIN_KEYWORD_LEN {
            continue;
        }
        let count = counts.entry(word.to_string()).or_insert(0);
        if *count == 0 {
            order.push(word.to_string());
        }
        *count += 1;
    }

    let mut keywords: Vec<Keyword> = order
        .into_iter()
        .map(|word| {
            let count = counts[&word];
            Keyword { word, count }
        })
        .collect();
    // stable sort keeps first-seen order among equal counts
    keywords.sort_by(|a, b| b.count.cmp(&a.count));
    keywords.truncate(MAX_KEYWORDS);
    keywords
}

/// Leading ceil(30%) of the sentences, at most three.
pub fn summarize(text: &str) -> String {
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.is_empty() {
        return String::new();
    }

    let keep = ((sentences.len() as f64 * SUMMARY_RATIO).ceil() as usize).min(MAX_SUMMARY_SENTENCES);
    format!("{}.", sentences[..keep].join(". "))
}

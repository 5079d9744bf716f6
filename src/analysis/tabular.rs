//! Tabular summaries over row records.
//!
//! Two engines produce a [`TabularReport`]: the full [`StatisticsEngine`]
//! (column types, missing counts, descriptive statistics) and the reduced
//! [`BasicEngine`] used when the full engine cannot be loaded, which only
//! reports shape, columns and sample rows.

use std::cmp::Ordering;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::AnalysisConfig;
use crate::types::{AppError, AppResult};

pub const SAMPLE_ROWS: usize = 5;
pub const STATS_UNAVAILABLE: &str =
    "Descriptive statistics require the full analysis engine, which is not loaded. Showing basic summary only.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Summary,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Full,
    Basic,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Full => write!(f, "full"),
            EngineKind::Basic => write!(f, "basic"),
        }
    }
}

/// Row records with columns in first-seen order
#[derive(Debug, Clone)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl Frame {
    /// Accepts an array of records or a single record. Non-object array
    /// elements become a one-column `value` row.
    pub fn from_json(data: &Value) -> AppResult<Self> {
        let rows: Vec<Map<String, Value>> = match data {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => map.clone(),
                    other => {
                        let mut map = Map::new();
                        map.insert("value".to_string(), other.clone());
                        map
                    }
                })
                .collect(),
            Value::Object(map) => vec![map.clone()],
            _ => {
                return Err(AppError::InvalidRequest(
                    "data must be a list of records or a single record".to_string(),
                ))
            }
        };

        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        Ok(Self { columns, rows })
    }

    fn values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(column).filter(|v| !v.is_null()))
    }

    fn sample(&self) -> Vec<Map<String, Value>> {
        self.rows.iter().take(SAMPLE_ROWS).cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; absent with fewer than two values
    pub std: Option<f64>,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularReport {
    pub engine: EngineKind,
    pub operation: Operation,
    pub rows: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_info: Option<Vec<ColumnInfo>>,
    pub sample_rows: Vec<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Vec<ColumnStats>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub trait TabularEngine: Send + Sync {
    fn kind(&self) -> EngineKind;
    fn run(&self, frame: &Frame, operation: Operation) -> TabularReport;
}

pub struct StatisticsEngine;

impl StatisticsEngine {
    pub fn load(config: &AnalysisConfig) -> AppResult<Self> {
        if !config.full_engine {
            return Err(AppError::EngineUnavailable(
                "disabled by configuration".to_string(),
            ));
        }
        Ok(Self)
    }

    fn column_info(frame: &Frame) -> Vec<ColumnInfo> {
        frame
            .columns
            .iter()
            .map(|name| {
                let present: Vec<&Value> = frame.values(name).flatten().collect();
                let missing = frame.rows.len() - present.len();
                ColumnInfo {
                    name: name.clone(),
                    dtype: infer_dtype(&present, missing).to_string(),
                    non_null: present.len(),
                    missing,
                }
            })
            .collect()
    }

    fn statistics(frame: &Frame) -> Vec<ColumnStats> {
        frame
            .columns
            .iter()
            .filter_map(|name| {
                let present: Vec<&Value> = frame.values(name).flatten().collect();
                if present.is_empty() || !present.iter().all(|v| v.is_number()) {
                    return None;
                }
                let values: Vec<f64> = present.iter().filter_map(|v| v.as_f64()).collect();
                describe(name, values)
            })
            .collect()
    }
}

impl TabularEngine for StatisticsEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Full
    }

    fn run(&self, frame: &Frame, operation: Operation) -> TabularReport {
        TabularReport {
            engine: EngineKind::Full,
            operation,
            rows: frame.rows.len(),
            column_count: frame.columns.len(),
            columns: frame.columns.clone(),
            column_info: Some(Self::column_info(frame)),
            sample_rows: frame.sample(),
            statistics: match operation {
                Operation::Stats => Some(Self::statistics(frame)),
                Operation::Summary => None,
            },
            message: None,
        }
    }
}

/// Shape, columns and sample rows only
pub struct BasicEngine;

impl TabularEngine for BasicEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Basic
    }

    fn run(&self, frame: &Frame, operation: Operation) -> TabularReport {
        TabularReport {
            engine: EngineKind::Basic,
            operation,
            rows: frame.rows.len(),
            column_count: frame.columns.len(),
            columns: frame.columns.clone(),
            column_info: None,
            sample_rows: frame.sample(),
            statistics: None,
            message: match operation {
                Operation::Stats => Some(STATS_UNAVAILABLE.to_string()),
                Operation::Summary => None,
            },
        }
    }
}

fn infer_dtype(present: &[&Value], missing: usize) -> &'static str {
    if present.is_empty() {
        "empty"
    } else if present.iter().all(|v| v.is_i64() || v.is_u64()) && missing == 0 {
        "int64"
    } else if present.iter().all(|v| v.is_number()) {
        "float64"
    } else if present.iter().all(|v| v.is_boolean()) && missing == 0 {
        "bool"
    } else {
        "object"
    }
}

fn describe(column: &str, mut values: Vec<f64>) -> Option<ColumnStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let count = values.len();
    let vector = DVector::from_vec(values.clone());
    let mean = vector.mean();
    // nalgebra's variance is the population variance
    let std = (count > 1).then(|| (vector.variance() * count as f64 / (count as f64 - 1.0)).sqrt());

    Some(ColumnStats {
        column: column.to_string(),
        count,
        mean,
        std,
        min: vector.min(),
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: vector.max(),
    })
}

/// Linear interpolation between closest ranks over sorted `values`
fn quantile(values: &[f64], q: f64) -> f64 {
    let position = q * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    values[lower] + (values[upper] - values[lower]) * (position - lower as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn people() -> Value {
        json!([
            {"name": "ada", "age": 36, "score": 9.5},
            {"name": "alan", "age": 41, "score": null},
            {"name": "grace", "age": 85, "score": 7.0},
            {"name": "linus", "age": 54},
        ])
    }

    fn full() -> StatisticsEngine {
        StatisticsEngine::load(&AnalysisConfig { full_engine: true }).unwrap()
    }

    #[test]
    fn test_frame_from_single_record() {
        let frame = Frame::from_json(&json!({"a": 1, "b": "x"})).unwrap();
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.columns, vec!["a", "b"]);
    }

    #[test]
    fn test_frame_rejects_scalar() {
        assert!(Frame::from_json(&json!(42)).is_err());
    }

    #[test]
    fn test_full_summary() {
        let frame = Frame::from_json(&people()).unwrap();
        let report = full().run(&frame, Operation::Summary);

        assert_eq!(report.engine, EngineKind::Full);
        assert_eq!(report.rows, 4);
        assert_eq!(report.column_count, 3);
        assert_eq!(report.columns, vec!["name", "age", "score"]);
        assert_eq!(report.sample_rows.len(), 4);
        assert!(report.statistics.is_none());

        let info = report.column_info.unwrap();
        assert_eq!(info[0].dtype, "object");
        assert_eq!(info[1].dtype, "int64");
        assert_eq!(info[2].dtype, "float64");
        assert_eq!(info[2].missing, 2);
        assert_eq!(info[2].non_null, 2);
    }

    #[test]
    fn test_full_stats() {
        let frame = Frame::from_json(&people()).unwrap();
        let report = full().run(&frame, Operation::Stats);
        let stats = report.statistics.unwrap();

        assert_eq!(stats.len(), 2);
        let age = &stats[0];
        assert_eq!(age.column, "age");
        assert_eq!(age.count, 4);
        assert!((age.mean - 54.0).abs() < 1e-9);
        assert_eq!(age.min, 36.0);
        assert_eq!(age.max, 85.0);
        assert!((age.median - 47.5).abs() < 1e-9);
        assert!((age.q25 - 39.75).abs() < 1e-9);
        assert!((age.q75 - 61.75).abs() < 1e-9);
        // sample std of [36, 41, 54, 85]
        assert!((age.std.unwrap() - 22.015146301277824).abs() < 1e-9);

        let score = &stats[1];
        assert_eq!(score.count, 2);
        assert!((score.mean - 8.25).abs() < 1e-9);
    }

    #[test]
    fn test_single_value_has_no_std() {
        let frame = Frame::from_json(&json!({"x": 3})).unwrap();
        let stats = full().run(&frame, Operation::Stats).statistics.unwrap();
        assert_eq!(stats[0].std, None);
        assert_eq!(stats[0].median, 3.0);
    }

    #[test]
    fn test_basic_engine_reduced_fields() {
        let rows: Vec<Value> = (0..8).map(|i| json!({"i": i})).collect();
        let frame = Frame::from_json(&Value::Array(rows)).unwrap();

        let summary = BasicEngine.run(&frame, Operation::Summary);
        assert_eq!(summary.engine, EngineKind::Basic);
        assert_eq!(summary.rows, 8);
        assert_eq!(summary.sample_rows.len(), SAMPLE_ROWS);
        assert!(summary.column_info.is_none());
        assert!(summary.message.is_none());

        let stats = BasicEngine.run(&frame, Operation::Stats);
        assert!(stats.statistics.is_none());
        assert_eq!(stats.message.as_deref(), Some(STATS_UNAVAILABLE));
    }

    #[test]
    fn test_disabled_engine_fails_to_load() {
        let err = StatisticsEngine::load(&AnalysisConfig { full_engine: false }).err().unwrap();
        assert!(matches!(err, AppError::EngineUnavailable(_)));
    }
}

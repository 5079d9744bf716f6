//! Local Analyzer
//!
//! Text helpers (sentiment, keywords, summaries) and tabular processing of
//! stored datasets. Tabular work goes through a [`DataProcessor`], which
//! uses the full statistics engine when it loads and the reduced basic
//! engine otherwise.

pub mod tabular;
pub mod text;

pub use tabular::{
    BasicEngine, ColumnInfo, ColumnStats, EngineKind, Frame, Operation, StatisticsEngine,
    TabularEngine, TabularReport,
};
pub use text::{analyze_sentiment, extract_keywords, summarize, Keyword, SentimentLabel, SentimentResult};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::types::AppResult;

pub struct DataProcessor {
    engine: Box<dyn TabularEngine>,
}

impl DataProcessor {
    /// Load the full engine, degrading to the basic one if that fails
    pub fn initialize(config: &AnalysisConfig) -> Self {
        match StatisticsEngine::load(config) {
            Ok(engine) => {
                info!("Full statistics engine loaded");
                Self::with_engine(Box::new(engine))
            }
            Err(e) => {
                warn!(error = %e, "Full statistics engine unavailable, using basic analysis");
                Self::basic()
            }
        }
    }

    pub fn basic() -> Self {
        Self::with_engine(Box::new(BasicEngine))
    }

    pub fn with_engine(engine: Box<dyn TabularEngine>) -> Self {
        Self { engine }
    }

    pub fn engine_kind(&self) -> EngineKind {
        self.engine.kind()
    }

    pub fn process(&self, data: &Value, operation: Operation) -> AppResult<TabularReport> {
        let frame = Frame::from_json(data)?;
        debug!(
            engine = %self.engine.kind(),
            rows = frame.rows.len(),
            columns = frame.columns.len(),
            ?operation,
            "Processing tabular data"
        );
        Ok(self.engine.run(&frame, operation))
    }
}

// File import: CSV and JSON become datasets, anything else is rejected

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde_json::{Map, Number, Value};
use tracing::info;

use crate::models::Dataset;
use crate::types::{AppError, AppResult};

pub struct FileUploadAgent;

impl FileUploadAgent {
    /// Parse an uploaded file into a dataset. Nothing is stored here, so a
    /// rejected file never produces a partial write.
    pub fn process_file(filename: &str, content: &[u8]) -> AppResult<Dataset> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        let data = match extension.as_deref() {
            Some("csv") => Self::parse_csv(content)?,
            Some("json") => serde_json::from_slice(content)
                .map_err(|e| AppError::InvalidFile(format!("{}: {}", filename, e)))?,
            _ => return Err(AppError::UnsupportedFileType(filename.to_string())),
        };

        let dataset = Dataset::new(filename, data, content.len() as u64);
        info!(
            dataset_id = %dataset.id,
            filename,
            size = dataset.size,
            records = dataset.record_count(),
            "Processed uploaded file"
        );
        Ok(dataset)
    }

    /// Header row names the columns; each cell is coerced independently.
    pub fn parse_csv(content: &[u8]) -> AppResult<Value> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| AppError::InvalidFile(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| AppError::InvalidFile(e.to_string()))?;
            let mut row = Map::new();
            for (idx, header) in headers.iter().enumerate() {
                let cell = record.get(idx).map(coerce_cell).unwrap_or(Value::Null);
                row.insert(header.clone(), cell);
            }
            rows.push(Value::Object(row));
        }

        Ok(Value::Array(rows))
    }
}

fn coerce_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = cell.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(number) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(cell.to_string())
}

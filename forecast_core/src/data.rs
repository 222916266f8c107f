//! OHLCV upload parsing and validation

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use std::io::Cursor;

/// Columns every upload must carry, in required order. Matching is
/// case-sensitive: the training pipeline wrote lowercase headers and the
/// scaler was fitted against exactly these names.
pub const REQUIRED_COLUMNS: [&str; 6] = ["date", "close", "open", "high", "low", "volume"];

/// Decode an uploaded file body as UTF-8 text.
///
/// Runs before any numeric processing so that binary uploads fail fast
/// with an encoding error rather than a parse error deep in the pipeline.
pub fn decode_csv_bytes(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| ForecastError::Encoding(format!("upload is not valid UTF-8: {}", e)))
}

/// Column-oriented view of a validated OHLCV upload.
///
/// Rows keep the order they were uploaded in (date ascending by
/// convention). The first CSV data row has already been dropped.
#[derive(Debug, Clone)]
pub struct OhlcvFrame {
    dates: Vec<String>,
    close: Vec<f64>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    volume: Vec<f64>,
}

impl OhlcvFrame {
    /// Parse CSV text into a validated frame.
    ///
    /// The first data row is dropped unconditionally whenever more than one
    /// row is present. This mirrors the preprocessing the model was trained
    /// with; whether it compensates for a training-time artifact or is a
    /// latent bug upstream is unknown, so the behavior is preserved as-is.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let cursor = Cursor::new(content.as_bytes().to_vec());
        let df = CsvReader::new(cursor)
            .infer_schema(Some(100))
            .has_header(true)
            .finish()?;

        // Legacy first-row drop, applied before column validation.
        let df = if df.height() > 1 {
            df.slice(1, df.height() - 1)
        } else {
            df
        };

        let column_names = df.get_column_names();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !column_names.iter().any(|name| name == *required))
            .map(|required| required.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ForecastError::Schema { missing });
        }

        // Blank cells deserialize as nulls and would silently shorten a
        // column; reject them up front so the failure is user-correctable.
        for name in REQUIRED_COLUMNS {
            let nulls = df.column(name)?.null_count();
            if nulls > 0 {
                return Err(ForecastError::Data(format!(
                    "column '{}' has {} empty cell(s)",
                    name, nulls
                )));
            }
        }

        Ok(Self {
            dates: Self::column_as_strings(&df, "date")?,
            close: Self::column_as_f64(&df, "close")?,
            open: Self::column_as_f64(&df, "open")?,
            high: Self::column_as_f64(&df, "high")?,
            low: Self::column_as_f64(&df, "low")?,
            volume: Self::column_as_f64(&df, "volume")?,
        })
    }

    /// Number of rows remaining after the first-row drop
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if the frame has no rows
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Date strings, as uploaded
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Close prices
    pub fn close(&self) -> &[f64] {
        &self.close
    }

    /// Open prices
    pub fn open(&self) -> &[f64] {
        &self.open
    }

    /// High prices
    pub fn high(&self) -> &[f64] {
        &self.high
    }

    /// Low prices
    pub fn low(&self) -> &[f64] {
        &self.low
    }

    /// Traded volume
    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    /// Parse the last row's date, the anchor for future business days
    pub fn last_date(&self) -> Result<NaiveDate> {
        let raw = self
            .dates
            .last()
            .ok_or_else(|| ForecastError::Data("no rows in upload".to_string()))?;

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| ForecastError::Data(format!("unparseable date '{}': {}", raw, e)))
    }

    /// Helper method to get a column as string values
    fn column_as_strings(df: &DataFrame, column_name: &str) -> Result<Vec<String>> {
        let col = df.column(column_name)?;

        let col = match col.dtype() {
            DataType::Utf8 => col.clone(),
            _ => col.cast(&DataType::Utf8)?,
        };

        Ok(col
            .utf8()
            .map_err(|e| ForecastError::Data(format!("column '{}': {}", column_name, e)))?
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect())
    }

    /// Helper method to get a column as f64 values
    fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<f64>> {
        let col = df.column(column_name)?;

        match col.dtype() {
            DataType::Float64 => Ok(col.f64().unwrap().into_iter().flatten().collect()),
            DataType::Float32 => Ok(col
                .f32()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            DataType::Int64 => Ok(col
                .i64()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            DataType::Int32 => Ok(col
                .i32()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            DataType::UInt64 => Ok(col
                .u64()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            DataType::UInt32 => Ok(col
                .u32()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            _ => Err(ForecastError::Data(format!(
                "Column '{}' cannot be converted to f64",
                column_name
            ))),
        }
    }
}

//! API route handlers

use crate::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use forecast_core::{ForecastError, PredictionService};
use serde::Serialize;

/// The /api/predict horizon is fixed at one step ahead.
const PREDICTION_PERIODS: usize = 1;

/// Transport-level error wrapper. The boundary layer alone maps domain
/// error kinds to status codes; pipeline stages never translate errors.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        let status = match &err {
            ForecastError::Schema { .. }
            | ForecastError::InsufficientData(_)
            | ForecastError::InsufficientHistory(_)
            | ForecastError::Encoding(_)
            | ForecastError::Data(_) => StatusCode::BAD_REQUEST,
            ForecastError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ForecastError::ArtifactLoad(_)
            | ForecastError::Inference(_)
            | ForecastError::Io(_)
            | ForecastError::Polars(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(detail = %self.detail, "request failed");
        }
        let body = Json(serde_json::json!({ "detail": self.detail }));
        (self.status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub filepath: String,
    pub size: usize,
}

/// Pull the CSV file out of a multipart upload.
///
/// Requires a `.csv` filename; the body is returned as raw bytes so the
/// UTF-8 check happens in one place for both endpoints.
async fn read_csv_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        if !filename.ends_with(".csv") {
            return Err(ApiError::bad_request("Only CSV files are allowed"));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {}", e)))?;

        return Ok((filename, bytes.to_vec()));
    }

    Err(ApiError::bad_request("No file field in upload"))
}

/// `POST /api/upload` - persist an uploaded CSV under a timestamped name
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let (original_name, bytes) = read_csv_upload(multipart).await?;

    let content = forecast_core::data::decode_csv_bytes(&bytes)?.to_string();

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("{}_{}", timestamp, original_name);
    let filepath = state.uploads_dir.join(&filename);

    tokio::fs::write(&filepath, &content)
        .await
        .map_err(ForecastError::from)?;

    tracing::info!(filename = %filename, size = bytes.len(), "stored upload");

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        filename,
        filepath: filepath.display().to_string(),
        size: bytes.len(),
    }))
}

/// `POST /api/predict` - run the full pipeline on an uploaded CSV and
/// forecast the next trading day
pub async fn predict(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<forecast_core::PredictionResponse>, ApiError> {
    let (_, bytes) = read_csv_upload(multipart).await?;
    let content = forecast_core::data::decode_csv_bytes(&bytes)?.to_string();

    let store = state.artifacts().await?;
    let service = PredictionService::from_store(store);

    // The pipeline is CPU-bound and strictly sequential; keep it off the
    // async workers.
    let response = tokio::task::spawn_blocking(move || {
        service.predict_from_csv(&content, PREDICTION_PERIODS)
    })
    .await
    .map_err(|e| ForecastError::Inference(format!("prediction task failed: {}", e)))??;

    Ok(Json(response))
}

/// `GET /api/model-info` - static description of the loaded model
pub async fn model_info(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = state.artifacts().await?;
    let config = store.config();
    let predictor = store.predictor();

    Ok(Json(serde_json::json!({
        "model": predictor.name(),
        "time_steps": config.time_steps,
        "input_dims": config.input_dims,
        "lstm_units": config.lstm_units,
        "train_min": config.train_min,
        "train_max": config.train_max
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_map_to_400() {
        let err = ApiError::from(ForecastError::Schema {
            missing: vec!["volume".to_string()],
        });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = ApiError::from(ForecastError::Encoding("bad bytes".to_string()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = ApiError::from(ForecastError::InsufficientHistory("too short".to_string()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn system_errors_map_to_500() {
        let err = ApiError::from(ForecastError::ArtifactLoad("missing model".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let err = ApiError::from(ForecastError::Inference("NaN score".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn timeouts_map_to_504() {
        let err = ApiError::from(ForecastError::Timeout("budget exceeded".to_string()));
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
    }
}

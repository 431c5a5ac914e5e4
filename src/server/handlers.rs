//! Route handlers

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use polars::prelude::*;

use crate::model::FeatureImportance;
use crate::pipeline::read_csv_bytes;
use crate::report::{title_case, CorrelationExport, DistributionEntry, QualityCount};
use crate::server::error::{ApiError, FieldError};
use crate::server::types::{
    extract_row, parse_object, request_key, BatchPrediction, HealthResponse, PredictResponse,
    RecommendationResponse,
};
use crate::server::AppState;

/// Form field carrying the CSV document in a multipart batch upload.
const UPLOAD_FIELD: &str = "file";

/// Liveness probe; does not depend on the model.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

pub async fn features_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<FeatureImportance>>, ApiError> {
    let predictor = state.predictor()?;
    Ok(Json(predictor.importances()))
}

/// Score one sample posted as a JSON object of feature values.
pub async fn predict_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let object = parse_object(&body).map_err(|e| ApiError::Validation(vec![e]))?;
    let predictor = state.predictor()?;
    let row = extract_row(&object, predictor.feature_names()).map_err(ApiError::Validation)?;

    Ok(Json(PredictResponse {
        quality: predictor.predict(&row),
    }))
}

/// Score every row of an uploaded CSV document.
///
/// The dashboard posts `multipart/form-data` with the document in a `file`
/// field; any other content type is read as raw CSV.
pub async fn batch_predict_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<Vec<BatchPrediction>>, ApiError> {
    let body = upload_body(request, &state).await?;
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ApiError::Validation(vec![FieldError::body(
            "Field required",
            "missing",
        )]));
    }
    let predictor = state.predictor()?;
    let df = read_csv_bytes(body.to_vec()).map_err(|e| {
        tracing::debug!(error = %e, "batch upload is not valid CSV");
        ApiError::Validation(vec![FieldError::body("CSV decode error", "csv_invalid")])
    })?;

    let features = predictor.feature_names();
    let mut columns = Vec::with_capacity(features.len());
    let mut errors = Vec::new();
    for feature in features {
        match numeric_column(&df, feature) {
            Some(values) => columns.push(values),
            None => errors.push(FieldError::missing(feature)),
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let mut predictions = Vec::with_capacity(df.height());
    for r in 0..df.height() {
        let mut row = Vec::with_capacity(features.len());
        for (feature, column) in features.iter().zip(&columns) {
            match column[r].filter(|v| v.is_finite()) {
                Some(v) => row.push(v),
                None => errors.push(FieldError::row_value(r, feature)),
            }
        }
        if row.len() == features.len() {
            predictions.push(BatchPrediction {
                values: features.iter().cloned().zip(row.iter().copied()).collect::<BTreeMap<_, _>>(),
                predicted_quality: predictor.predict(&row),
            });
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    tracing::info!(rows = predictions.len(), "scored batch upload");
    Ok(Json(predictions))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

async fn upload_body(request: Request, state: &AppState) -> Result<Bytes, ApiError> {
    let unreadable = |e: &dyn std::fmt::Display| {
        tracing::debug!(error = %e, "batch upload could not be read");
        ApiError::Validation(vec![FieldError::body("Upload could not be read", "upload_invalid")])
    };

    if !is_multipart(&request) {
        return Bytes::from_request(request, state).await.map_err(|e| unreadable(&e));
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| unreadable(&e))?;
    while let Some(field) = multipart.next_field().await.map_err(|e| unreadable(&e))? {
        if field.name() == Some(UPLOAD_FIELD) {
            return field.bytes().await.map_err(|e| unreadable(&e));
        }
    }
    Err(ApiError::Validation(vec![FieldError::missing(UPLOAD_FIELD)]))
}

/// Column looked up verbatim or by its form key, cast to f64.
fn numeric_column(df: &DataFrame, feature: &str) -> Option<Vec<Option<f64>>> {
    let key = request_key(feature);
    let column = df.column(feature).or_else(|_| df.column(&key)).ok()?;
    let floats = column.cast(&DataType::Float64).ok()?;
    let values = floats.f64().ok()?.iter().collect();
    Some(values)
}

/// Point the user at the single most influential measurement.
pub async fn recommendations_handler(
    State(state): State<AppState>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let predictor = state.predictor()?;
    let top = predictor
        .importances()
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("Feature importance table is empty".to_string()))?;

    Ok(Json(RecommendationResponse {
        advice: advice_for(&top),
        primary_driver: top.feature,
    }))
}

fn advice_for(top: &FeatureImportance) -> String {
    format!(
        "{} accounts for {:.0}% of the model's weight. Track it closely through \
         fermentation and blending: small adjustments here move the predicted \
         quality more than any other measurement.",
        title_case(&top.feature),
        top.importance * 100.0
    )
}

pub async fn correlation_handler(
    State(state): State<AppState>,
) -> Result<Json<CorrelationExport>, ApiError> {
    Ok(Json(state.analytics()?.correlation.clone()))
}

pub async fn distributions_handler(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, DistributionEntry>>, ApiError> {
    Ok(Json(state.analytics()?.distributions.clone()))
}

pub async fn quality_distribution_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<QualityCount>>, ApiError> {
    Ok(Json(state.analytics()?.quality_distribution.clone()))
}

/// Serve one file from the artifact directory.
///
/// Only plain file names are accepted; anything that could address another
/// directory is treated as not found.
pub async fn static_plot_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    if !is_plain_file_name(&name) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = state.plots_dir().join(&name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&name))], bytes).into_response(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "static artifact unavailable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

fn content_type(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

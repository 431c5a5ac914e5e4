//! Request and response bodies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::server::error::FieldError;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub quality: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub primary_driver: String,
    pub advice: String,
}

/// One scored row of a batch upload: its feature values plus the prediction.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchPrediction {
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
    pub predicted_quality: f64,
}

/// Form key used for a feature: whitespace replaced by `_`.
pub fn request_key(feature: &str) -> String {
    feature
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Parse a JSON request body into an object.
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, FieldError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(FieldError::body("Field required", "missing"));
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(FieldError::body(
            "Input should be a valid dictionary or object to extract fields from",
            "model_attributes_type",
        )),
        Err(_) => Err(FieldError::body("JSON decode error", "json_invalid")),
    }
}

/// Pull one value per feature out of a request object, in feature order.
///
/// Every problem is collected so the client sees all bad fields at once.
pub fn extract_row(object: &Map<String, Value>, features: &[String]) -> Result<Vec<f64>, Vec<FieldError>> {
    let mut row = Vec::with_capacity(features.len());
    let mut errors = Vec::new();

    for feature in features {
        let key = request_key(feature);
        let value = object.get(&key).or_else(|| object.get(feature));
        match value {
            None => errors.push(FieldError::missing(&key)),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) => row.push(v),
                None => errors.push(FieldError::not_a_number(&key)),
            },
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => row.push(v),
                _ => errors.push(FieldError::unparsable_number(&key)),
            },
            Some(_) => errors.push(FieldError::not_a_number(&key)),
        }
    }

    if errors.is_empty() {
        Ok(row)
    } else {
        Err(errors)
    }
}

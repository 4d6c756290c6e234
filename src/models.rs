use crate::predictor::Prediction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SERVICE_NAME: &str = "AdhesioSense AI Server";
pub const API_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionResponse {
    pub prediction: String,
    pub probability: f64,
    pub graph_data: [f64; 2],
    pub message: String,
}

impl From<Prediction> for PredictionResponse {
    fn from(p: Prediction) -> Self {
        Self {
            prediction: p.label.as_str().to_string(),
            probability: p.probability,
            graph_data: p.distribution,
            message: "Prediction successful".to_string(),
        }
    }
}

/// Body of every failed `/predict` call. The prediction fields carry
/// placeholders so clients can always read the same keys.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub prediction: String,
    pub probability: f64,
    pub graph_data: [f64; 2],
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            prediction: "Error".to_string(),
            probability: 0.0,
            graph_data: [0.0, 0.0],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            message: format!("{} is running", SERVICE_NAME),
            version: API_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
    pub documentation: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        let endpoints = [
            ("/predict", "POST - Process image for adhesion detection"),
            ("/health", "GET - Server health check"),
            ("/", "GET - API information"),
        ]
        .into_iter()
        .map(|(path, description)| (path.to_string(), description.to_string()))
        .collect();

        Self {
            name: SERVICE_NAME.to_string(),
            version: API_VERSION.to_string(),
            endpoints,
            documentation: "See README.md for API usage instructions".to_string(),
        }
    }
}

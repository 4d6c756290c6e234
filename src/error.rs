use crate::models::ErrorResponse;
use crate::predictor::PredictionError;
use crate::preprocess::PreprocessingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Upload problems the client can fix by sending a different request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No image file provided")]
    MissingImage,
    #[error("No file selected")]
    EmptyFilename,
    #[error("Invalid file type. Allowed types: PNG, JPG, JPEG, BMP")]
    InvalidFileType,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Internal server error: {0}")]
    Upload(String),
    #[error("Internal server error: {0}")]
    Preprocessing(#[from] PreprocessingError),
    #[error("Internal server error: {0}")]
    Prediction(#[from] PredictionError),
    #[error("Internal server error: {0}")]
    Blocking(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}

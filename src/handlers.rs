use crate::error::ApiError;
use crate::models::{HealthResponse, PredictionResponse, ServiceInfo};
use crate::predictor::{Prediction, Predictor};
use crate::preprocess::image_bytes_to_tensor;
use crate::upload::read_image_upload;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use log::{error, info, warn};

pub struct AppState {
    pub predictor: Box<dyn Predictor>,
}

impl AppState {
    pub fn new(predictor: impl Predictor + 'static) -> Self {
        Self {
            predictor: Box::new(predictor),
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/predict").route(web::post().to(predict)));
}

pub async fn predict(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    match classify_upload(state, payload).await {
        Ok(prediction) => {
            info!(
                "Prediction: {} (p={:.4})",
                prediction.label.as_str(),
                prediction.probability
            );
            Ok(HttpResponse::Ok().json(PredictionResponse::from(prediction)))
        }
        Err(e @ ApiError::Validation(_)) => {
            warn!("Rejected upload: {}", e);
            Err(e)
        }
        Err(e) => {
            error!("Prediction request failed: {}", e);
            Err(e)
        }
    }
}

async fn classify_upload(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<Prediction, ApiError> {
    let upload = read_image_upload(payload).await?;
    info!(
        "Received {} ({} bytes)",
        upload.filename,
        upload.bytes.len()
    );

    // Decoding and resizing are CPU bound, keep them off the async workers.
    let prediction = web::block(move || -> Result<Prediction, ApiError> {
        let tensor = image_bytes_to_tensor(&upload.bytes)?;
        Ok(state.predictor.predict(&tensor)?)
    })
    .await
    .map_err(|e| ApiError::Blocking(e.to_string()))??;

    Ok(prediction)
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::default())
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(ServiceInfo::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{MockPredictor, PredictionError};
    use crate::preprocess::Tensor;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
    use serde_json::{json, Value};
    use std::io::Cursor;

    const BOUNDARY: &str = "adhesio-test-boundary";

    struct Part<'a> {
        name: &'a str,
        filename: Option<&'a str>,
        bytes: &'a [u8],
    }

    fn multipart_body(parts: &[Part]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            let disposition = match part.filename {
                Some(filename) => format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, filename
                ),
                None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(part.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn png_bytes() -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 90, Rgba([200, 10, 10, 128])));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    struct BrokenPredictor;

    impl Predictor for BrokenPredictor {
        fn predict(&self, _tensor: &Tensor) -> Result<Prediction, PredictionError> {
            Err(PredictionError::RandomSource)
        }
    }

    async fn post_predict(state: AppState, parts: &[Part<'_>]) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/predict")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body(parts))
            .to_request();

        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    fn mock_state() -> AppState {
        AppState::new(MockPredictor::seeded(3))
    }

    fn assert_error_envelope(body: &Value, error: &str) {
        assert_eq!(body["error"], error);
        assert_eq!(body["prediction"], "Error");
        assert_eq!(body["probability"], 0.0);
        assert_eq!(body["graph_data"], json!([0.0, 0.0]));
    }

    #[actix_rt::test]
    async fn test_missing_image_field() {
        let (status, body) = post_predict(
            mock_state(),
            &[Part {
                name: "comment",
                filename: None,
                bytes: b"hello",
            }],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&body, "No image file provided");
    }

    #[actix_rt::test]
    async fn test_image_field_without_filename_is_not_a_file() {
        let (status, body) = post_predict(
            mock_state(),
            &[Part {
                name: "image",
                filename: None,
                bytes: b"plain text",
            }],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&body, "No image file provided");
    }

    #[actix_rt::test]
    async fn test_non_multipart_body_has_no_image() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(mock_state()))
                .configure(configure_routes),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/predict")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{}")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_error_envelope(&body, "No image file provided");
    }

    #[actix_rt::test]
    async fn test_empty_filename() {
        let (status, body) = post_predict(
            mock_state(),
            &[Part {
                name: "image",
                filename: Some(""),
                bytes: b"",
            }],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&body, "No file selected");
    }

    #[actix_rt::test]
    async fn test_disallowed_extension_and_missing_dot() {
        let png = png_bytes();
        for filename in ["photo.gif", "photo"] {
            let (status, body) = post_predict(
                mock_state(),
                &[Part {
                    name: "image",
                    filename: Some(filename),
                    bytes: &png,
                }],
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_error_envelope(&body, "Invalid file type. Allowed types: PNG, JPG, JPEG, BMP");
        }
    }

    #[actix_rt::test]
    async fn test_valid_png_is_classified() {
        let png = png_bytes();
        let (status, body) = post_predict(
            mock_state(),
            &[
                Part {
                    name: "patient",
                    filename: None,
                    bytes: b"42",
                },
                Part {
                    name: "image",
                    filename: Some("photo.PNG"),
                    bytes: &png,
                },
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Prediction successful");
        assert!(body.get("error").is_none());

        let label = body["prediction"].as_str().unwrap();
        assert!(label == "Yes" || label == "No");

        let probability = body["probability"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&probability));

        let graph: Vec<f64> = serde_json::from_value(body["graph_data"].clone()).unwrap();
        assert_eq!(graph.len(), 2);
        assert!((graph[0] + graph[1] - 1.0).abs() < 1e-9);
        assert_eq!(graph[1], probability);
    }

    #[actix_rt::test]
    async fn test_corrupt_image_is_internal_error() {
        let (status, body) = post_predict(
            mock_state(),
            &[Part {
                name: "image",
                filename: Some("scan.jpg"),
                bytes: b"not really a jpeg",
            }],
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("Internal server error: Image preprocessing failed:"));
        assert_eq!(body["prediction"], "Error");
    }

    #[actix_rt::test]
    async fn test_predictor_failure_is_internal_error() {
        let png = png_bytes();
        let (status, body) = post_predict(
            AppState::new(BrokenPredictor),
            &[Part {
                name: "image",
                filename: Some("scan.bmp"),
                bytes: &png,
            }],
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_error_envelope(
            &body,
            "Internal server error: Prediction failed: random source is unavailable",
        );
    }

    #[actix_rt::test]
    async fn test_health() {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        let req = test::TestRequest::get().uri("/health").to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({
                "status": "healthy",
                "message": "AdhesioSense AI Server is running",
                "version": "1.0.0"
            })
        );
    }

    #[actix_rt::test]
    async fn test_index_lists_endpoints() {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        let req = test::TestRequest::get().uri("/").to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: ServiceInfo = test::read_body_json(resp).await;
        assert_eq!(body.name, "AdhesioSense AI Server");
        assert_eq!(body.version, "1.0.0");
        assert_eq!(body.endpoints.len(), 3);
        assert!(body.endpoints.contains_key("/predict"));
    }
}

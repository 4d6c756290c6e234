use crate::error::{ApiError, ValidationError};
use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;

/// Multipart field the client must put the image in.
pub const IMAGE_FIELD: &str = "image";

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// An image as it arrived in the request body. Lives for one request only.
#[derive(Debug)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// True when the part after the last `.` is one of [`ALLOWED_EXTENSIONS`],
/// ignoring case. Names without a `.` are never allowed.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

pub fn validate_filename(filename: &str) -> Result<(), ValidationError> {
    if filename.is_empty() {
        return Err(ValidationError::EmptyFilename);
    }
    if !allowed_file(filename) {
        return Err(ValidationError::InvalidFileType);
    }
    Ok(())
}

/// Finds the first file part named [`IMAGE_FIELD`]. Parts without a `filename`
/// parameter are plain form values and are skipped. A body that cannot be
/// parsed as multipart is treated as carrying no file at all.
async fn next_image_field(payload: &mut Multipart) -> Option<(String, Field)> {
    while let Some(item) = payload.next().await {
        let field = match item {
            Ok(field) => field,
            Err(e) => {
                log::debug!("Stopped reading multipart body: {}", e);
                return None;
            }
        };

        let filename = {
            let disposition = field.content_disposition();
            match (disposition.get_name(), disposition.get_filename()) {
                (Some(IMAGE_FIELD), Some(filename)) => Some(filename.to_string()),
                _ => None,
            }
        };

        if let Some(filename) = filename {
            return Some((filename, field));
        }
    }
    None
}

/// Pulls the image out of the request body, checking the filename before any
/// file content is read.
pub async fn read_image_upload(mut payload: Multipart) -> Result<UploadedImage, ApiError> {
    let (filename, mut field) = next_image_field(&mut payload)
        .await
        .ok_or(ValidationError::MissingImage)?;

    validate_filename(&filename)?;

    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| ApiError::Upload(format!("Failed to read upload: {}", e)))?;
        bytes.extend_from_slice(&data);
    }

    Ok(UploadedImage { filename, bytes })
}

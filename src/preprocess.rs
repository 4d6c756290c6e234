use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;
use thiserror::Error;

/// Side length of the square model input.
pub const INPUT_SIZE: u32 = 224;

/// Batch, height, width, channel.
pub const TENSOR_SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3];

pub type Tensor = Array4<f32>;

#[derive(Error, Debug)]
pub enum PreprocessingError {
    #[error("Image preprocessing failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image preprocessing failed: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Decodes an uploaded buffer. The format is guessed from the content, the
/// declared filename plays no part here.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, PreprocessingError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Turns an image of any size and colour mode into a `(1, 224, 224, 3)` tensor
/// with channel values scaled to `[0, 1]`.
///
/// The image is stretched to the target size rather than padded.
pub fn preprocess_image(image: &DynamicImage) -> Result<Tensor, PreprocessingError> {
    let resized = image.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);
    let rgb = resized.to_rgb8();

    let values: Vec<f32> = rgb
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    // RgbImage stores pixels row-major with interleaved channels, which is NHWC
    // once the batch axis is added.
    let tensor = Array4::from_shape_vec(
        (TENSOR_SHAPE[0], TENSOR_SHAPE[1], TENSOR_SHAPE[2], TENSOR_SHAPE[3]),
        values,
    )?;

    Ok(tensor)
}

pub fn image_bytes_to_tensor(bytes: &[u8]) -> Result<Tensor, PreprocessingError> {
    let image = decode_image(bytes)?;
    preprocess_image(&image)
}

use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageOutputFormat};
use std::io::Cursor;

/// Lossless PNG encoding of `image`.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageOutputFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Decodes PNG or JPEG bytes, sniffing the format from the content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn png_base64(image: &DynamicImage) -> Result<String> {
    Ok(encode_base64(&encode_png(image)?))
}

pub fn decode_base64_image(data: &str) -> Result<DynamicImage> {
    let bytes = STANDARD.decode(data.trim())?;
    decode_image(&bytes)
}

use crate::errors::AppError;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};
use log::{info, warn};
use std::path::Path;

/// Encode a raw RGB8 buffer (row-major, width*height*3 bytes) to JPEG.
pub fn encode_rgb_to_jpeg(rgb: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, AppError> {
    let expected = width as usize * height as usize * 3;
    if rgb.len() != expected {
        return Err(AppError::Media(format!(
            "RGB buffer has {} bytes, expected {} for {}x{}",
            rgb.len(),
            expected,
            width,
            height
        )));
    }

    let mut out = Vec::with_capacity(expected / 8);
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode(rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| AppError::Media(format!("JPEG encoding failed: {}", e)))?;
    Ok(out)
}

/// Load the "camera unavailable" placeholder from disk, or synthesize a flat
/// gray frame if the asset is missing. The returned bytes are fixed for the
/// lifetime of the process, so the streaming fallback is byte-stable.
pub fn load_placeholder_jpeg(path: &Path, width: u32, height: u32, quality: u8) -> Result<Vec<u8>, AppError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            info!("🖼️ Placeholder image loaded from {} ({} bytes)", path.display(), bytes.len());
            Ok(bytes)
        }
        Err(e) => {
            warn!(
                "⚠️ Placeholder image not found at {} ({}). Falling back to a generated gray frame.",
                path.display(),
                e
            );
            let gray = RgbImage::from_pixel(width, height, Rgb([64u8, 64, 64]));
            encode_rgb_to_jpeg(gray.as_raw(), width, height, quality)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_valid_rgb_buffer() {
        let rgb = vec![128u8; 8 * 6 * 3];
        let jpeg = encode_rgb_to_jpeg(&rgb, 8, 6, 80).unwrap();
        // JPEG SOI marker
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn rejects_wrong_length_buffer() {
        let rgb = vec![0u8; 10];
        assert!(encode_rgb_to_jpeg(&rgb, 8, 6, 80).is_err());
    }

    #[test]
    fn placeholder_falls_back_to_generated_frame() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.jpg");
        let jpeg = load_placeholder_jpeg(&missing, 16, 12, 80).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        // Fixed per process: a second load yields identical bytes.
        let again = load_placeholder_jpeg(&missing, 16, 12, 80).unwrap();
        assert_eq!(jpeg, again);
    }

    #[test]
    fn placeholder_prefers_on_disk_asset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placeholder.jpg");
        std::fs::write(&path, b"\xFF\xD8fake-jpeg").unwrap();
        let jpeg = load_placeholder_jpeg(&path, 16, 12, 80).unwrap();
        assert_eq!(jpeg, b"\xFF\xD8fake-jpeg");
    }
}

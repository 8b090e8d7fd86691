//! Helpers for turning captured images into request payloads.

use crate::{AnalysisError, CapturedImage};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::path::Path;

/// Media type assumed when a data URL header does not declare one.
pub const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

/// Decode a `data:` URL into a [`CapturedImage`].
///
/// Accepts:
/// - `data:image/png;base64,AAAA` -> media type `image/png`
/// - `data:;base64,AAAA` -> media type `image/jpeg`
pub fn decode_data_url(url: &str) -> Result<CapturedImage, AnalysisError> {
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| AnalysisError::InvalidInput("data url has no payload".into()))?;
    let header = header
        .strip_prefix("data:")
        .ok_or_else(|| AnalysisError::InvalidInput("not a data url".into()))?;
    if !header.ends_with(";base64") {
        return Err(AnalysisError::InvalidInput(
            "only base64 data urls are supported".into(),
        ));
    }
    let media_type = header
        .split(';')
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or(FALLBACK_MEDIA_TYPE);
    let data = STANDARD
        .decode(payload.trim())
        .map_err(|e| AnalysisError::InvalidInput(format!("invalid base64 image: {e}")))?;
    if data.is_empty() {
        return Err(AnalysisError::InvalidInput("image is empty".into()));
    }
    Ok(CapturedImage::new(media_type, data))
}

/// Guess an image media type from a file extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => FALLBACK_MEDIA_TYPE,
    }
}

pub fn encode_image(image: &CapturedImage) -> String {
    STANDARD.encode(&image.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_data_url_reads_media_type() {
        let image = decode_data_url("data:image/png;base64,aGVsbG8=").expect("image");
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.data, b"hello");
    }

    #[test]
    fn decode_data_url_defaults_to_jpeg() {
        let image = decode_data_url("data:;base64,aGVsbG8=").expect("image");
        assert_eq!(image.media_type, FALLBACK_MEDIA_TYPE);
    }

    #[test]
    fn decode_data_url_rejects_garbage() {
        assert!(decode_data_url("hello").is_err());
        assert!(decode_data_url("data:image/png,plain").is_err());
        assert!(decode_data_url("data:image/png;base64,!!!").is_err());
        assert!(decode_data_url("data:image/png;base64,").is_err());
    }

    #[test]
    fn media_type_from_extension() {
        assert_eq!(media_type_for_path(Path::new("me.PNG")), "image/png");
        assert_eq!(media_type_for_path(Path::new("me.jpeg")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("selfie")), "image/jpeg");
    }

    #[test]
    fn encode_round_trips_through_data_url() {
        let image = CapturedImage::new("image/webp", vec![1, 2, 3]);
        let url = format!("data:{};base64,{}", image.media_type, encode_image(&image));
        assert_eq!(decode_data_url(&url).expect("decode"), image);
    }
}

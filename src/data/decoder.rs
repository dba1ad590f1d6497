// ============================================================
// Layer 4: Image Decoder
// ============================================================
// Turns an ImageSource (multipart bytes or base64 text) into a
// decoded image, rejecting anything that is not a JPEG or PNG.
//
// Order of checks:
//   1. Multipart upload with an empty filename  → EmptyFilename
//   2. Base64: strip "data:image/...;base64," header, decode
//   3. Empty payload                            → Malformed
//   4. Sniff the format from the magic bytes    → Malformed if unknown
//   5. Anything other than JPEG/PNG             → UnsupportedFormat
//   6. Full decode                              → Malformed on failure
//
// The format is sniffed from the bytes, never from the filename or
// the declared content type, so a renamed text file is still caught.
//
// Reference: image crate documentation (guess_format, load_from_memory_with_format)
//            base64 crate documentation (Engine)

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

use crate::domain::image::ImageSource;

/// Client-side problems with the submitted image.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no image provided")]
    MissingImage,

    #[error("empty filename provided")]
    EmptyFilename,

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("malformed image data: {0}")]
    Malformed(String),
}

/// Decode a request's image, enforcing the JPEG/PNG whitelist.
pub fn decode_image(source: &ImageSource) -> Result<DynamicImage, DecodeError> {
    let owned;
    let bytes: &[u8] = match source {
        ImageSource::Multipart { filename, bytes } => {
            if filename.as_deref() == Some("") {
                return Err(DecodeError::EmptyFilename);
            }
            bytes
        }
        ImageSource::Base64(text) => {
            owned = decode_base64_payload(text)?;
            &owned
        }
    };

    decode_bytes(bytes)
}

/// Steps 3-6 on bytes already pulled out of the request.
fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Malformed("empty payload".to_string()));
    }

    let format = image::guess_format(bytes)
        .map_err(|_| DecodeError::Malformed("not a recognisable image".to_string()))?;

    match format {
        ImageFormat::Jpeg | ImageFormat::Png => {}
        other => {
            return Err(DecodeError::UnsupportedFormat(format_name(other)));
        }
    }

    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Strip an optional data-URI header and base64-decode the rest.
///
/// "data:image/png;base64,iVBORw0..." → bytes of "iVBORw0..."
/// Whitespace (line-wrapped base64) is ignored.
pub fn decode_base64_payload(text: &str) -> Result<Vec<u8>, DecodeError> {
    let trimmed = text.trim();

    let payload = if trimmed.starts_with("data:") {
        match trimmed.split_once(',') {
            Some((_, rest)) => rest,
            None => {
                return Err(DecodeError::Malformed(
                    "data URI has no ',' separator".to_string(),
                ))
            }
        }
    } else {
        trimmed
    };

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::Malformed(format!("invalid base64: {e}")))
}

fn format_name(format: ImageFormat) -> String {
    format!("{format:?}").to_uppercase()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    /// Encode a small solid-colour image in the given format.
    pub(crate) fn encoded_image(format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 6, Rgb([200, 100, 50]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_multipart_png_decodes() {
        let source = ImageSource::Multipart {
            filename: Some("cat.png".to_string()),
            bytes:    encoded_image(ImageFormat::Png),
        };
        let img = decode_image(&source).unwrap();
        assert_eq!((img.width(), img.height()), (8, 6));
    }

    #[test]
    fn test_multipart_jpeg_decodes() {
        let source = ImageSource::Multipart {
            filename: Some("dog.jpg".to_string()),
            bytes:    encoded_image(ImageFormat::Jpeg),
        };
        assert!(decode_image(&source).is_ok());
    }

    #[test]
    fn test_empty_filename_rejected() {
        let source = ImageSource::Multipart {
            filename: Some(String::new()),
            bytes:    encoded_image(ImageFormat::Png),
        };
        assert_eq!(decode_image(&source).unwrap_err(), DecodeError::EmptyFilename);
    }

    #[test]
    fn test_text_file_is_malformed() {
        let source = ImageSource::Multipart {
            filename: Some("notes.txt".to_string()),
            bytes:    b"This is not an image".to_vec(),
        };
        assert!(matches!(decode_image(&source), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_gif_is_unsupported() {
        // GIF magic is recognised by the sniffer even though the decoder
        // feature is not compiled in.
        let bytes = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;".to_vec();
        let err = decode_bytes(&bytes).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedFormat("GIF".to_string()));
    }

    #[test]
    fn test_data_uri_prefix_is_stripped() {
        let raw     = encoded_image(ImageFormat::Png);
        let encoded = BASE64.encode(&raw);
        let with_header = format!("data:image/png;base64,{encoded}");

        assert_eq!(decode_base64_payload(&with_header).unwrap(), raw);
        assert_eq!(decode_base64_payload(&encoded).unwrap(), raw);
    }

    #[test]
    fn test_data_uri_matches_multipart_pixels() {
        let raw = encoded_image(ImageFormat::Png);
        let from_multipart = decode_image(&ImageSource::Multipart {
            filename: Some("a.png".to_string()),
            bytes:    raw.clone(),
        })
        .unwrap();
        let from_json = decode_image(&ImageSource::Base64(format!(
            "data:image/png;base64,{}",
            BASE64.encode(&raw)
        )))
        .unwrap();
        assert_eq!(from_multipart.to_rgb8().into_raw(), from_json.to_rgb8().into_raw());
    }

    #[test]
    fn test_wrapped_base64_is_accepted() {
        let raw     = encoded_image(ImageFormat::Png);
        let encoded = BASE64.encode(&raw);
        let (a, b)  = encoded.split_at(encoded.len() / 2);
        let wrapped = format!("{a}\n{b}\n");
        assert_eq!(decode_base64_payload(&wrapped).unwrap(), raw);
    }

    #[test]
    fn test_invalid_base64_is_malformed() {
        let err = decode_image(&ImageSource::Base64("not base64 !!".to_string())).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_data_uri_without_comma_is_malformed() {
        let err = decode_base64_payload("data:image/png;base64").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_empty_payload_is_malformed() {
        let err = decode_image(&ImageSource::Base64(String::new())).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }
}

//! Base64 transport codec: decoding untrusted request payloads into images
//! and encoding result artifacts back out.

use crate::error::Error;
use base64::{engine::general_purpose, Engine as _};
use image::RgbaImage;

/// Decode a base64 payload, optionally wrapped in a data URL
/// (`data:<mime>;base64,<payload>`), into an image.
///
/// The result is normalized to RGBA so that indexed, grayscale, RGB and RGBA
/// sources all look identical to the rest of the pipeline. Base64 is decoded
/// strictly: bad padding or characters is a rejection, not repaired input.
pub fn decode_b64_image(data: &str) -> Result<RgbaImage, Error> {
    let payload = if data.starts_with("data:") {
        data.split_once(',')
            .map(|(_, rest)| rest)
            .ok_or_else(|| Error::Decode("invalid base64 image: data URL has no payload".into()))?
    } else {
        data
    };

    let raw = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| Error::Decode(format!("invalid base64 image: {e}")))?;

    let img = image::load_from_memory(&raw)
        .map_err(|e| Error::Decode(format!("invalid base64 image: {e}")))?;

    Ok(img.to_rgba8())
}

/// Encode an artifact's raw bytes for transport. The bytes pass through
/// unmodified; no re-encoding of the image itself.
pub fn encode_b64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

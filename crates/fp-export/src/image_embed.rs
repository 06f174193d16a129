//! Signature image decoding for export.
//!
//! Signatures are stored as data URIs (PNG or JPEG payloads). For
//! embedding we decode to raw pixels and flatten any alpha channel
//! against white, since page content has no transparency group.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Decoded image ready to become a DeviceRGB image XObject.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed 8-bit RGB samples, row-major.
    pub rgb: Vec<u8>,
}

impl EmbeddedImage {
    /// Uniform scale that fits the image inside a `box_w` x `box_h`
    /// region without upscaling past natural size.
    pub fn fit_scale(&self, box_w: f32, box_h: f32) -> f32 {
        let sx = box_w / self.width as f32;
        let sy = box_h / self.height as f32;
        sx.min(sy).min(1.0)
    }
}

/// Decode a `data:image/...;base64,...` URI into RGB pixels.
/// Returns `None` on any malformed input; the caller degrades that
/// field to a placeholder instead of failing the export.
pub fn decode_data_uri(uri: &str) -> Option<EmbeddedImage> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    if !mime.starts_with("image/") {
        log::warn!("signature data URI has non-image mime type {mime:?}");
        return None;
    }
    let bytes = BASE64.decode(payload.trim()).ok()?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| log::warn!("signature image failed to decode: {e}"))
        .ok()?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    // Composite over white.
    let mut rgb = Vec::with_capacity(rgb_capacity(width, height));
    for px in rgba.pixels() {
        let [r, g, b, a] = px.0;
        let a = a as u16;
        let blend = |c: u8| ((c as u16 * a + 255 * (255 - a)) / 255) as u8;
        rgb.push(blend(r));
        rgb.push(blend(g));
        rgb.push(blend(b));
    }
    Some(EmbeddedImage { width, height, rgb })
}

/// Sample count for a tightly packed RGB buffer. Widened before the
/// multiply: large scans overflow `u32`.
fn rgb_capacity(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

//! Upload validation for recipe pictures.

use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Allowed image formats for recipe pictures.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum upload size (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Detect the format from magic bytes and check it is allowed.
///
/// Returns the detected format on success.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, String> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Failed to read image: {}", e))?;

    let format = reader
        .format()
        .ok_or_else(|| "Could not detect image format".to_string())?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        ));
    }

    Ok(format)
}

/// Object name for an upload: a random UUID prefix followed by the base
/// name of the client's file name, with anything outside `[A-Za-z0-9._-]`
/// replaced. Without a usable client name the format's extension is used.
pub fn object_name(file_name: Option<&str>, format: ImageFormat) -> String {
    let base = file_name
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .map(|name| {
            name.chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .filter(|name| !name.trim_matches('.').is_empty());

    let id = uuid::Uuid::new_v4();
    match base {
        Some(base) => format!("{}-{}", id, base),
        None => {
            let extension = format.extensions_str().first().copied().unwrap_or("img");
            format!("{}.{}", id, extension)
        }
    }
}

//! MIME type to canonical file extension.

/// Canonical extension (with leading dot) for an image MIME type, or `""`
/// when the type is not in the table.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/bmp" | "image/x-ms-bmp" => ".bmp",
        "image/tiff" => ".tif",
        "image/webp" => ".webp",
        "image/avif" => ".avif",
        _ => "",
    }
}

//! Content-type sniffing from magic bytes.

/// Detects the MIME type of `data` from its leading bytes, ignoring any
/// server-declared type. Returns `None` unless the bytes are a recognized
/// image format.
pub fn sniff_image_mime(data: &[u8]) -> Option<&'static str> {
    let format = image::guess_format(data).ok()?;
    let mime = format.to_mime_type();
    mime.starts_with("image/").then_some(mime)
}

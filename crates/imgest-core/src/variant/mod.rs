//! Best-effort resized variants.
//!
//! A variant is written beside its original as `<stem>-<W>x<H>.<ext>` and
//! replaces the original in the ingestion result. The original stays on
//! disk. Any failure (undecodable image, already within bounds, encode or
//! write error) falls back to the original unchanged.

use std::io::Cursor;

use anyhow::{bail, Context, Result};

use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};

use crate::store::{ContentStore, StoredFile, WriteOutcome};
use crate::url_model::file_stem;

/// Derives resized variants for files held by a [`ContentStore`].
pub struct VariantProcessor<'a, 's> {
    store: &'a ContentStore<'s>,
}

impl<'a, 's> VariantProcessor<'a, 's> {
    pub fn new(store: &'a ContentStore<'s>) -> Self {
        Self { store }
    }

    /// Fit `stored` within `max_width` x `max_height` (0 = unconstrained).
    /// Returns the variant, or `stored` unchanged when no variant was made.
    pub fn maybe_resize(&self, stored: StoredFile, max_width: u32, max_height: u32) -> StoredFile {
        if max_width == 0 && max_height == 0 {
            return stored;
        }
        match self.derive(&stored, max_width, max_height) {
            Ok(Some(variant)) => {
                tracing::info!(
                    original = %stored.relative_path,
                    variant = %variant.relative_path,
                    "resized variant"
                );
                variant
            }
            Ok(None) => stored,
            Err(e) => {
                tracing::warn!(path = %stored.relative_path, "resize skipped: {e:#}");
                stored
            }
        }
    }

    fn derive(
        &self,
        stored: &StoredFile,
        max_width: u32,
        max_height: u32,
    ) -> Result<Option<StoredFile>> {
        let storage = self.store.storage();
        let bytes = storage
            .read(&stored.path)
            .with_context(|| format!("read {}", stored.path.display()))?;
        let format = image::guess_format(&bytes).context("detect image format")?;
        let img = image::load_from_memory_with_format(&bytes, format).context("decode")?;

        let (width, height) = img.dimensions();
        let Some((w, h)) = fit_within(width, height, max_width, max_height) else {
            tracing::debug!(
                path = %stored.relative_path,
                width,
                height,
                "already within bounds"
            );
            return Ok(None);
        };

        let resized = img.resize_exact(w, h, FilterType::Lanczos3);
        let mut encoded = Cursor::new(Vec::new());
        resized
            .write_to(&mut encoded, format)
            .with_context(|| format!("encode {format:?}"))?;
        let encoded = encoded.into_inner();

        let name = variant_name(&stored.path, w, h, format);
        let variant = self.store.sibling(stored, &name);
        match storage.write_new(&variant.path, &encoded) {
            Ok(WriteOutcome::Written) => Ok(Some(variant)),
            Ok(WriteOutcome::AlreadyExists) => {
                let same = storage
                    .digest(&variant.path)
                    .map(|d| d == crate::checksum::sha256_bytes(&encoded))
                    .unwrap_or(false);
                if !same {
                    bail!("{name} exists with different content");
                }
                Ok(Some(variant))
            }
            Err(e) => Err(e).with_context(|| format!("write {name}")),
        }
    }
}

/// Target size that fits `width` x `height` inside the bounds while keeping
/// the aspect ratio. `None` when no downscaling is needed. Never upscales.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> Option<(u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let scale_w = if max_width > 0 && width > max_width {
        f64::from(max_width) / f64::from(width)
    } else {
        1.0
    };
    let scale_h = if max_height > 0 && height > max_height {
        f64::from(max_height) / f64::from(height)
    } else {
        1.0
    };
    let scale = scale_w.min(scale_h);
    if scale >= 1.0 {
        return None;
    }

    let mut w = ((f64::from(width) * scale).round() as u32).max(1);
    let mut h = ((f64::from(height) * scale).round() as u32).max(1);
    if max_width > 0 {
        w = w.min(max_width);
    }
    if max_height > 0 {
        h = h.min(max_height);
    }
    Some((w, h))
}

fn variant_name(original: &std::path::Path, w: u32, h: u32, format: ImageFormat) -> String {
    let file_name = original
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_stem(&file_name);
    let ext = &file_name[stem.len()..];
    let ext = if ext.is_empty() {
        format
            .extensions_str()
            .first()
            .map(|e| format!(".{e}"))
            .unwrap_or_default()
    } else {
        ext.to_string()
    };
    format!("{stem}-{w}x{h}{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::{png_bytes, StubTransport};
    use crate::fetch::Fetcher;
    use crate::store::{LocalFs, Partition};
    use chrono::{TimeZone, Utc};
    use std::path::Path;

    fn stored_png(store: &ContentStore<'_>, w: u32, h: u32) -> StoredFile {
        let transport = StubTransport::ok(200, png_bytes(w, h, 3));
        let payload = Fetcher::new(&transport, None)
            .fetch("https://other.example/cat.png")
            .unwrap();
        let partition = Partition::from_timestamp(Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap());
        store.store(payload, partition, "cat").unwrap()
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        assert_eq!(fit_within(2000, 1000, 1000, 0), Some((1000, 500)));
        assert_eq!(fit_within(2000, 1000, 0, 250), Some((500, 250)));
        assert_eq!(fit_within(2000, 1000, 800, 800), Some((800, 400)));
        assert_eq!(fit_within(1000, 3000, 800, 600), Some((200, 600)));
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit_within(640, 480, 1024, 1024), None);
        assert_eq!(fit_within(640, 480, 640, 0), None);
        assert_eq!(fit_within(640, 480, 0, 0), None);
        assert_eq!(fit_within(0, 480, 10, 10), None);
    }

    #[test]
    fn fit_clamps_tiny_results_to_one_pixel() {
        assert_eq!(fit_within(10_000, 1, 100, 0), Some((100, 1)));
    }

    #[test]
    fn zero_bounds_is_a_no_op() {
        let root = tempfile::tempdir().unwrap();
        let store = ContentStore::new(&LocalFs, root.path(), "https://s.example/u");
        let original = stored_png(&store, 40, 20);
        let out = VariantProcessor::new(&store).maybe_resize(original.clone(), 0, 0);
        assert_eq!(out, original);
    }

    #[test]
    fn resize_writes_sibling_and_keeps_original() {
        let root = tempfile::tempdir().unwrap();
        let store = ContentStore::new(&LocalFs, root.path(), "https://s.example/u");
        let original = stored_png(&store, 40, 20);

        let variant = VariantProcessor::new(&store).maybe_resize(original.clone(), 10, 0);

        assert_eq!(variant.relative_path, "2025/11/cat-10x5.png");
        assert_eq!(variant.url, "https://s.example/u/2025/11/cat-10x5.png");
        assert_eq!(variant.mime, "image/png");
        assert!(original.path.exists());
        let img = image::open(&variant.path).unwrap();
        assert_eq!(img.dimensions(), (10, 5));

        // Deriving again reuses the identical variant.
        let again = VariantProcessor::new(&store).maybe_resize(original, 10, 0);
        assert_eq!(again, variant);
    }

    #[test]
    fn within_bounds_falls_back_to_original() {
        let root = tempfile::tempdir().unwrap();
        let store = ContentStore::new(&LocalFs, root.path(), "https://s.example/u");
        let original = stored_png(&store, 40, 20);
        let out = VariantProcessor::new(&store).maybe_resize(original.clone(), 100, 100);
        assert_eq!(out, original);
    }

    #[test]
    fn undecodable_file_falls_back_to_original() {
        let root = tempfile::tempdir().unwrap();
        let store = ContentStore::new(&LocalFs, root.path(), "https://s.example/u");
        let original = stored_png(&store, 40, 20);
        // Keep the PNG signature but corrupt the rest.
        let mut bytes = std::fs::read(&original.path).unwrap();
        bytes.truncate(20);
        std::fs::write(&original.path, bytes).unwrap();

        let out = VariantProcessor::new(&store).maybe_resize(original.clone(), 10, 10);
        assert_eq!(out, original);
    }

    #[test]
    fn decode_failure_carries_context() {
        let root = tempfile::tempdir().unwrap();
        let store = ContentStore::new(&LocalFs, root.path(), "https://s.example/u");
        let original = stored_png(&store, 40, 20);
        let mut bytes = std::fs::read(&original.path).unwrap();
        bytes.truncate(20);
        std::fs::write(&original.path, bytes).unwrap();

        let err = VariantProcessor::new(&store)
            .derive(&original, 10, 10)
            .unwrap_err();
        assert!(format!("{err:#}").starts_with("decode: "), "{err:#}");
    }

    #[test]
    fn conflicting_existing_variant_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let store = ContentStore::new(&LocalFs, root.path(), "https://s.example/u");
        let original = stored_png(&store, 40, 20);
        std::fs::write(root.path().join("2025/11/cat-10x5.png"), b"other bytes").unwrap();

        let processor = VariantProcessor::new(&store);
        let err = processor.derive(&original, 10, 0).unwrap_err();
        assert!(err.to_string().contains("different content"), "{err:#}");
        assert_eq!(processor.maybe_resize(original.clone(), 10, 0), original);
    }

    #[test]
    fn variant_names() {
        assert_eq!(
            variant_name(Path::new("/u/2025/11/1-cat.png"), 300, 200, ImageFormat::Png),
            "1-cat-300x200.png"
        );
        assert_eq!(
            variant_name(Path::new("/u/2025/11/favicon"), 16, 16, ImageFormat::Png),
            "favicon-16x16.png"
        );
    }
}

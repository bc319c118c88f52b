//! Filename extraction from URL path.

use super::normalize_scheme;

/// Extracts the last path segment from a URL for use as a filename hint.
/// The segment is percent-decoded.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(&normalize_scheme(url)).ok()?;
    let path = parsed.path();
    let segment = path.split('/').filter(|s| !s.is_empty()).last()?;
    let segment = percent_decode(segment);
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}

/// Strips the final extension from a filename (`cat.large.png` → `cat.large`).
/// Dotfiles keep their name (`.hidden` → `.hidden`).
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

fn percent_decode(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len());
    let mut bytes = input.as_bytes().iter().copied();
    while let Some(b) = bytes.next() {
        if b != b'%' {
            out.push(b);
            continue;
        }
        let h = bytes.next();
        let l = bytes.next();
        match (h.and_then(hex_digit), l.and_then(hex_digit)) {
            (Some(high), Some(low)) => out.push(high << 4 | low),
            _ => {
                out.push(b'%');
                out.extend(h);
                out.extend(l);
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

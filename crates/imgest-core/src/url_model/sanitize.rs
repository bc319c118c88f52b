//! Filename and alt-text sanitization.

/// Longest filename base we emit. Leaves room under Linux NAME_MAX (255) for a
/// collision counter prefix, a variant size suffix, and the extension.
const MAX_BASE_BYTES: usize = 200;

/// Characters dropped outright from filenames.
const SPECIAL_CHARS: &[char] = &[
    '?', '[', ']', '/', '\\', '=', '<', '>', ':', ';', ',', '\'', '"', '&', '$', '#', '*', '(',
    ')', '|', '~', '`', '!', '{', '}', '%', '+', '^', '@',
];

/// Sanitizes a resolved filename base for safe use on disk.
///
/// - Drops path separators and shell/URL special characters
/// - Replaces whitespace and control characters with `-`
/// - Collapses consecutive `-`
/// - Trims leading/trailing dots, dashes, and underscores
/// - Limits length to 200 bytes on a char boundary
///
/// May return an empty string; callers decide the fallback.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_dash = false;

    for c in name.chars() {
        if SPECIAL_CHARS.contains(&c) {
            continue;
        }
        if c.is_whitespace() || c.is_control() || c == '-' {
            if !prev_dash {
                out.push('-');
            }
            prev_dash = true;
        } else {
            out.push(c);
            prev_dash = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '-' || c == '_');

    if trimmed.len() > MAX_BASE_BYTES {
        let mut take = MAX_BASE_BYTES;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take]
            .trim_end_matches(|c| c == '.' || c == '-' || c == '_')
            .to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sanitizes alt text for display: strips markup tags, turns control
/// characters into spaces, collapses whitespace runs, and trims.
pub fn sanitize_alt_text(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_control() => stripped.push(' '),
            c => stripped.push(c),
        }
    }
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

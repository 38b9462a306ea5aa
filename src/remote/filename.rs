//! Suggested archive name from the `Content-Disposition` response header.
//!
//! The download service answers with `attachment; filename=<name>`, and
//! proxies in front of it sometimes rewrite that to the extended
//! `filename*=UTF-8''<percent-encoded>` form. Both are read here.

/// Returns the file name carried by a `Content-Disposition` value.
///
/// The extended `filename*` parameter wins over plain `filename`.
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in header.split(';').skip(1) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => extended = decode_extended(value.trim()),
            "filename" => plain = Some(unquote(value.trim()).to_string()),
            _ => {}
        }
    }

    extended.or(plain).filter(|name| !name.is_empty())
}

/// Decodes `charset'lang'percent-encoded`.
fn decode_extended(value: &str) -> Option<String> {
    let (_, encoded) = value.split_once("''")?;
    urlencoding::decode(encoded).ok().map(|name| name.into_owned())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

/// Reduces a suggested name to a single harmless path segment.
///
/// Only the part after the last `/` or `\` is kept, and control
/// characters become `_`. Returns `None` when nothing usable remains.
pub(crate) fn sanitize_filename(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = last
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim();

    match cleaned {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

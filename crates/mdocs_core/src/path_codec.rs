//! Conversion between path segment lists and encoded path keys.
//!
//! A key is the segments joined with `/` and percent-encoded as a single
//! URI component, so `["guide", "install"]` becomes `guide%2Finstall`. The
//! empty key `""` stands for the root.

use crate::error::AppError;

const SEPARATOR: char = '/';

/// Characters `urlencoding` escapes but browsers' `encodeURIComponent`
/// leaves as-is, with their escaped form.
const URI_COMPONENT_MARKS: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
];

/// Encode path segments into a single opaque key.
///
/// # Arguments
/// - `segments`: Path segments from the doc root.
///
/// # Returns
/// The percent-encoded key; `encode(&[])` is the empty root key. The
/// escaped set matches `encodeURIComponent`.
pub fn encode<S: AsRef<str>>(segments: &[S]) -> String {
    let joined = segments
        .iter()
        .map(|segment| segment.as_ref())
        .collect::<Vec<_>>()
        .join("/");
    let mut key = urlencoding::encode(&joined).into_owned();
    // A literal '%' is always escaped as "%25", so these never match inside
    // another escape.
    for (escaped, mark) in URI_COMPONENT_MARKS {
        if key.contains(escaped) {
            key = key.replace(escaped, mark);
        }
    }
    key
}

/// Decode a key back into path segments.
///
/// # Arguments
/// - `token`: Percent-encoded key.
///
/// # Returns
/// The path segments; the empty key decodes to an empty list.
///
/// # Errors
/// Returns [`AppError::BadRequest`] when the decoded bytes are not UTF-8.
pub fn decode(token: &str) -> Result<Vec<String>, AppError> {
    if token.is_empty() {
        return Ok(Vec::new());
    }
    let decoded = urlencoding::decode(token)
        .map_err(|err| AppError::BadRequest(format!("Invalid path key '{}': {}", token, err)))?;
    Ok(decoded.split(SEPARATOR).map(str::to_string).collect())
}

/// Decode a key and reject segments that cannot name a document.
///
/// # Returns
/// Non-empty, validated path segments.
///
/// # Errors
/// Returns [`AppError::BadRequest`] for the root key, undecodable keys, or
/// any segment rejected by [`validate_segment`].
pub fn decode_doc_path(token: &str) -> Result<Vec<String>, AppError> {
    let segments = decode(token)?;
    if segments.is_empty() {
        return Err(AppError::BadRequest(
            "Document path must not be empty".to_string(),
        ));
    }
    for segment in &segments {
        validate_segment(segment)?;
    }
    Ok(segments)
}

/// Re-encode a key so differently-escaped spellings map to one index key.
///
/// # Errors
/// Propagates decoding and validation errors from [`decode_doc_path`].
pub fn canonicalize(token: &str) -> Result<String, AppError> {
    decode_doc_path(token).map(|segments| encode(&segments))
}

/// Check that a single segment is a usable file or directory name.
///
/// # Errors
/// Returns [`AppError::BadRequest`] for empty names, `.`/`..`, or names
/// containing path separators.
pub fn validate_segment(segment: &str) -> Result<(), AppError> {
    if segment.trim().is_empty() {
        return Err(AppError::BadRequest("Path segment must not be empty".to_string()));
    }
    if segment == "." || segment == ".." {
        return Err(AppError::BadRequest(format!(
            "Path segment '{}' is not allowed",
            segment
        )));
    }
    if segment.contains(['/', '\\']) {
        return Err(AppError::BadRequest(format!(
            "Path segment '{}' must not contain a path separator",
            segment
        )));
    }
    Ok(())
}

/// Return the key of the parent of `segments` (`""` for top-level paths).
pub fn parent_key<S: AsRef<str>>(segments: &[S]) -> String {
    match segments.split_last() {
        Some((_, parent)) => encode(parent),
        None => String::new(),
    }
}

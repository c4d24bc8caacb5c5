//! `Content-Disposition` filename extraction

use regex::Regex;

/// Name used when the response does not carry one
pub const DEFAULT_FILENAME: &str = "output.epub";

/// Disposition assumed when the header is missing
pub const DEFAULT_DISPOSITION: &str = "attachment; filename=\"output.epub\"";

lazy_static::lazy_static! {
    static ref FILENAME_PATTERN: Regex =
        Regex::new(r#"filename="([^"]+)""#).expect("filename pattern is valid");
}

/// First non-empty double-quoted `filename="..."` token of the header.
///
/// Unquoted values and RFC 5987 `filename*=` parameters are not recognised
/// and fall back to [`DEFAULT_FILENAME`].
pub fn filename_from_disposition(header: Option<&str>) -> String {
    let disposition = header.unwrap_or(DEFAULT_DISPOSITION);
    FILENAME_PATTERN
        .captures(disposition)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

//! Filename negotiation from `Content-Disposition` response headers.

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;

/// Name used when the server does not suggest one.
pub const DEFAULT_DOWNLOAD_NAME: &str = "nsl_kdd_splits.zip";

static EXTENDED_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|;)\s*filename\*\s*=\s*([^;\s]+)").expect("valid extended filename regex"));
static QUOTED_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*"((?:[^"\\]|\\.)*)""#).expect("valid quoted filename regex"));
static TOKEN_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*([^";\s]+)"#).expect("valid token filename regex"));

/// Resolve the name a downloaded archive is saved under.
pub fn resolve_download_name(content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string())
}

/// Extract a safe filename from a `Content-Disposition` value.
///
/// `filename*` (RFC 5987, UTF-8 only) takes precedence over `filename`.
/// The result is reduced to its last path component; empty, `.` and `..`
/// results are rejected.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let extended = EXTENDED_FILENAME
        .captures(value)
        .and_then(|caps| decode_extended(caps.get(1)?.as_str()));
    let plain = || {
        QUOTED_FILENAME
            .captures(value)
            .map(|caps| unescape_quoted(&caps[1]))
            .or_else(|| TOKEN_FILENAME.captures(value).map(|caps| caps[1].to_string()))
    };
    extended.or_else(plain).and_then(|name| sanitize(&name))
}

fn decode_extended(raw: &str) -> Option<String> {
    let (charset, rest) = raw.split_once('\'')?;
    let (_language, encoded) = rest.split_once('\'')?;
    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }
    percent_decode_str(encoded).decode_utf8().ok().map(|s| s.into_owned())
}

fn unescape_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn sanitize(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }
    Some(cleaned.to_string())
}

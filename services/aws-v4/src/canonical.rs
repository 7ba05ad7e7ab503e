//! Canonical forms of the request parts covered by the signature.

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, X_AMZ_CLIENT_CONTEXT};
use cloudsign_core::{Error, Result};
use http::header::HOST;
use http::{HeaderMap, Uri};
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Canonical header block and the matching signed header list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalHeaders {
    /// `name:value\n` lines sorted by name.
    pub headers: String,
    /// Lowercase header names joined by `;`.
    pub signed_headers: String,
}

/// Build the canonical path of a request.
///
/// Anything after the first `?` is kept verbatim and appended back to the
/// result. The path part is normalized (empty and `.` segments dropped,
/// `..` resolved), keeps its trailing `/` and gets URI encoded with `/`
/// and `~` left alone. Services `s3` and `host` percent-decode the
/// normalized path first so that an already encoded path isn't encoded
/// twice.
pub fn canonicalize_path(path: &str, service: &str) -> String {
    let (path, query) = match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    };

    let mut normalized = normalize_path(path);
    if path.ends_with('/') && !normalized.ends_with('/') {
        normalized.push('/');
    }

    let decoded = if service == "s3" || service == "host" {
        percent_decode_str(&normalized).decode_utf8_lossy()
    } else {
        Cow::Borrowed(normalized.as_str())
    };

    let mut canonical = utf8_percent_encode(&decoded, &AWS_URI_ENCODE_SET).to_string();
    if let Some(query) = query.filter(|v| !v.is_empty()) {
        canonical.push('?');
        canonical.push_str(query);
    }
    canonical
}

fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|v| *v != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            v => segments.push(v),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Build the canonical query string of a request.
///
/// The raw query is cut at the first space and `;` is treated as data
/// instead of a separator. Parameters are form decoded (`+` means space,
/// blank values are kept), encoded again with the AWS unreserved set and
/// sorted by name, then by value.
pub fn canonicalize_query(query: &str) -> String {
    let query = query.split_once(' ').map_or(query, |(v, _)| v);
    let query = query.replace(';', "%3B");

    let mut params: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| {
            (
                utf8_percent_encode(&k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(&v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect();
    params.sort();

    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Collapse runs of whitespace into one space and trim both ends.
///
/// Text between a pair of `"` or `'` is copied as is, including its
/// whitespace. A quote without a matching quote later in the value is an
/// ordinary character, as the apostrophe in `O'Brien`.
pub fn normalize_whitespace(value: &str) -> String {
    let mut normalized = String::with_capacity(value.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;

    for (idx, c) in value.char_indices() {
        match quote {
            Some(q) => {
                normalized.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c.is_ascii_whitespace() => {
                pending_space = !normalized.is_empty();
            }
            None => {
                if pending_space {
                    normalized.push(' ');
                    pending_space = false;
                }
                if (c == '"' || c == '\'') && value[idx + 1..].contains(c) {
                    quote = Some(c);
                }
                normalized.push(c);
            }
        }
    }

    normalized
}

/// Build the canonical header block for the headers selected by `include`.
///
/// `include` holds lowercase header names plus two wildcards: `*` selects
/// every header and `x-amz-*` selects every `x-amz-` header except
/// `x-amz-client-context`, which is only signed when named explicitly.
///
/// A `host` header taken from the uri is added when the caller didn't set
/// one and `host` is selected. It's only used for signing and never written
/// back to the request. A uri without host is rejected only in that case.
pub fn canonicalize_headers<S: AsRef<str>>(
    uri: &Uri,
    headers: &HeaderMap,
    include: &[S],
) -> Result<CanonicalHeaders> {
    let include: Vec<String> = include
        .iter()
        .map(|v| v.as_ref().to_ascii_lowercase())
        .collect();
    let sign_all = include.iter().any(|v| v == "*");
    let sign_amz = include.iter().any(|v| v == "x-amz-*");
    let should_sign = |name: &str| {
        sign_all
            || include.iter().any(|v| v == name)
            || (sign_amz && name.starts_with("x-amz-") && name != X_AMZ_CLIENT_CONTEXT)
    };

    let mut canonical: BTreeMap<String, Vec<String>> = BTreeMap::new();

    if !headers.contains_key(HOST) && should_sign(HOST.as_str()) {
        let host = uri.host().ok_or_else(|| {
            Error::request_invalid(format!("request uri {uri} has no host to sign"))
        })?;
        canonical
            .entry(HOST.as_str().to_string())
            .or_default()
            .push(host.to_string());
    }

    for (name, value) in headers {
        let name = name.as_str();
        if !should_sign(name) {
            continue;
        }

        let value = value.to_str().map_err(|e| {
            Error::request_invalid(format!("header {name} is not valid visible ascii"))
                .with_source(e)
        })?;
        canonical
            .entry(name.to_string())
            .or_default()
            .push(normalize_whitespace(value).trim().to_string());
    }

    let mut block = String::new();
    let mut names = Vec::with_capacity(canonical.len());
    for (name, mut values) in canonical {
        values.sort();
        block.push_str(&name);
        block.push(':');
        block.push_str(&values.join(","));
        block.push('\n');
        names.push(name);
    }

    Ok(CanonicalHeaders {
        headers: block,
        signed_headers: names.join(";"),
    })
}

use crate::types::{Header, HeaderSpec, ProbeError, Target};
use http::Method;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

pub const HTTP_SCHEME: &str = "http";
pub const HTTPS_SCHEME: &str = "https";
pub const HEADER_SEPARATOR: char = ',';
pub const HEADER_ASSIGN: char = '=';
pub const PSEUDO_HEADER_PREFIX: char = ':';
pub const MAX_REDIRECTS: usize = 10;

pub fn parse_target(target: &str) -> Result<Target, ProbeError> {
    let url = Url::parse(target)
        .map_err(|e| ProbeError::InvalidTarget(format!("{} ({})", target, e)))?;

    if url.scheme() != HTTP_SCHEME && url.scheme() != HTTPS_SCHEME {
        return Err(ProbeError::InvalidTarget(format!(
            "Unsupported scheme '{}' in '{}'",
            url.scheme(),
            target
        )));
    }

    if url.host_str().is_none() {
        return Err(ProbeError::InvalidTarget(format!(
            "Target '{}' is missing a host",
            target
        )));
    }

    Ok(Target::new(url))
}

/// Parses `name1=value1,name2=value2`. A leading `:` on a name is dropped so
/// HTTP/2 spellings like `:authority` are accepted. Values may contain `=`.
pub fn parse_header_spec(spec: &str) -> Result<HeaderSpec, ProbeError> {
    let mut headers = HeaderSpec::new();
    if spec.is_empty() {
        return Ok(headers);
    }

    for segment in spec.split(HEADER_SEPARATOR) {
        let (name, value) = segment.split_once(HEADER_ASSIGN).ok_or_else(|| {
            ProbeError::MalformedHeaders(format!("Expected name=value, got '{}'", segment))
        })?;

        let name = name.trim();
        let name = name.strip_prefix(PSEUDO_HEADER_PREFIX).unwrap_or(name);
        if name.is_empty() {
            return Err(ProbeError::MalformedHeaders(format!(
                "Empty header name in '{}'",
                segment
            )));
        }

        headers.insert(name.to_string(), value.to_string());
    }

    Ok(headers)
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Canonical MIME form of a header name: the first letter and every letter
/// following a hyphen upper-cased, the rest lower-cased. Names with bytes
/// outside the token set are returned unchanged.
pub fn canonical_header_key(name: &str) -> String {
    if name.is_empty() || !name.bytes().all(is_token_byte) {
        return name.to_string();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

pub fn header_value<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

pub fn is_redirect_status(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

pub fn resolve_redirect_url(base_url: &Url, location: &str) -> Result<Url, url::ParseError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Url::parse(location)
    } else {
        base_url.join(location)
    }
}

/// Method of the follow-up request and whether the body is sent again.
/// 307 and 308 repeat the request as is; 303 turns anything but HEAD into
/// GET, while 301 and 302 only rewrite POST.
pub fn redirect_method(status: u16, method: &Method) -> (Method, bool) {
    match status {
        307 | 308 => (method.clone(), true),
        303 if *method != Method::HEAD => (Method::GET, false),
        301 | 302 if *method == Method::POST => (Method::GET, false),
        _ => (method.clone(), false),
    }
}

pub async fn timeout_result<F, T>(duration: Option<Duration>, future: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, ProbeError>>,
{
    if let Some(dur) = duration {
        match timeout(dur, future).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout),
        }
    } else {
        future.await
    }
}

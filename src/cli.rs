use clap::Parser;
use std::time::Duration;

use crate::types::{HttpProtocol, ProbeError, RequestConfig, DEFAULT_TIMEOUT_SECS};
use crate::utils::parse_header_spec;

/// Send one HTTP/1.1 or HTTP/2 request and print the response as JSON
#[derive(Parser, Debug)]
#[command(name = "h2probe", author, version, about)]
pub struct Args {
    /// URL to make request to
    #[arg(long)]
    pub url: String,

    /// Skip TLS verification
    #[arg(long = "skip-verify")]
    pub skip_verify: bool,

    /// Timeout in seconds (0 disables it)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Headers to set, comma separated name=value pairs; method, authority
    /// and path (optionally prefixed with ':') rewrite the request line
    #[arg(long, default_value = "")]
    pub headers: String,

    /// Use HTTP/1.[01] protocol
    #[arg(long)]
    pub http1: bool,

    /// Use POST, body is read from standard input
    #[arg(long)]
    pub post: bool,

    /// Send the body unbuffered, so the request has no Content-Length header
    #[arg(long)]
    pub stream: bool,

    /// Log diagnostics to standard error
    #[arg(long)]
    pub verbose: bool,
}

const LONG_FLAGS: &[&str] = &[
    "url",
    "skip-verify",
    "timeout",
    "headers",
    "http1",
    "post",
    "stream",
    "verbose",
    "help",
    "version",
];

fn is_single_dash_long(arg: &str) -> bool {
    match arg.strip_prefix('-') {
        Some(rest) if !rest.starts_with('-') => {
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            LONG_FLAGS.contains(&name)
        }
        _ => false,
    }
}

/// Rewrites `-name` and `-name=value` into `--name` forms for the known long
/// flags. Arguments following a flag that takes a value are left untouched.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out = Vec::new();
    let mut expect_value = false;
    for (index, arg) in args.into_iter().enumerate() {
        if index == 0 || expect_value {
            expect_value = false;
            out.push(arg);
            continue;
        }
        if is_single_dash_long(&arg) {
            let rest = &arg[1..];
            expect_value = !rest.contains('=') && takes_value(rest);
            out.push(format!("-{}", arg));
        } else {
            if let Some(rest) = arg.strip_prefix("--") {
                expect_value = !rest.contains('=') && takes_value(rest);
            }
            out.push(arg);
        }
    }
    out
}

fn takes_value(name: &str) -> bool {
    matches!(name, "url" | "timeout" | "headers")
}

impl Args {
    pub fn into_config(self) -> Result<RequestConfig, ProbeError> {
        let headers = parse_header_spec(&self.headers)?;
        let protocol = if self.http1 {
            HttpProtocol::Http1
        } else {
            HttpProtocol::Http2
        };
        let timeout = match self.timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(RequestConfig::new(self.url)
            .with_post(self.post)
            .with_headers(headers)
            .with_timeout(timeout)
            .with_skip_verify(self.skip_verify)
            .with_protocol(protocol)
            .with_stream(self.stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parse(list: &[&str]) -> Args {
        Args::try_parse_from(normalize_args(args(list))).unwrap()
    }

    #[test]
    fn single_dash_flags() {
        let parsed = parse(&[
            "h2probe",
            "-url",
            "https://example.com",
            "-skip-verify",
            "-timeout=9",
            "-headers",
            ":authority=a.test,x-b=2",
            "-http1",
            "-post",
            "-stream",
        ]);
        assert_eq!(parsed.url, "https://example.com");
        assert!(parsed.skip_verify && parsed.http1 && parsed.post && parsed.stream);
        assert_eq!(parsed.timeout, 9);
        assert_eq!(parsed.headers, ":authority=a.test,x-b=2");
    }

    #[test]
    fn double_dash_flags_and_defaults() {
        let parsed = parse(&["h2probe", "--url", "http://localhost"]);
        assert_eq!(parsed.timeout, 5);
        assert_eq!(parsed.headers, "");
        assert!(!parsed.http1 && !parsed.post && !parsed.stream && !parsed.skip_verify);
    }

    #[test]
    fn values_are_not_rewritten() {
        let normalized = normalize_args(args(&["h2probe", "-headers", "-post", "-url", "x"]));
        assert_eq!(normalized, args(&["h2probe", "--headers", "-post", "--url", "x"]));
    }

    #[test]
    fn url_is_required() {
        assert!(Args::try_parse_from(normalize_args(args(&["h2probe", "-post"]))).is_err());
    }

    #[test]
    fn into_config() {
        let config = parse(&[
            "h2probe",
            "-url",
            "http://localhost:1",
            "-headers",
            "method=PUT,x-a=1",
            "-post",
            "-timeout",
            "0",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.method, "POST");
        assert!(config.post);
        assert_eq!(config.timeout, None);
        assert_eq!(config.protocol, HttpProtocol::Http2);
        assert_eq!(config.headers.get("method"), Some("PUT"));
        assert_eq!(config.headers.get("x-a"), Some("1"));
    }

    #[test]
    fn malformed_headers_fail_fast() {
        let err = parse(&["h2probe", "-url", "http://x", "-headers", "novalue"])
            .into_config()
            .unwrap_err();
        assert!(matches!(err, ProbeError::MalformedHeaders(_)));
    }
}

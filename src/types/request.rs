use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, COOKIE, HOST, REFERER, WWW_AUTHENTICATE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use futures_util::TryStreamExt;
use hyper::body::Frame;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use url::Url;

use super::error::ProbeError;
use super::header::{HeaderSpec, PseudoHeader};
use super::protocol::HttpProtocol;
use super::Target;
use crate::utils::{parse_target, resolve_redirect_url};

pub const METHOD_GET: &str = "GET";
pub const METHOD_POST: &str = "POST";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Body sent to the peer. Either fully buffered or streamed from a reader.
pub type RequestBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// Source for a request body, normally standard input.
pub type BodyReader = Box<dyn AsyncRead + Send + Unpin>;

/// Everything one invocation needs, built once from the command line.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub url: String,
    pub method: String,
    pub headers: HeaderSpec,
    /// Read the request body from standard input.
    pub post: bool,
    /// `None` disables the deadline.
    pub timeout: Option<Duration>,
    pub skip_verify: bool,
    pub protocol: HttpProtocol,
    /// Send the body without buffering it, so no `Content-Length` is computed.
    pub stream: bool,
}

impl RequestConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: METHOD_GET.to_string(),
            headers: HeaderSpec::new(),
            post: false,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            skip_verify: false,
            protocol: HttpProtocol::Http2,
            stream: false,
        }
    }

    pub fn with_post(mut self, post: bool) -> Self {
        self.post = post;
        self.method = if post { METHOD_POST } else { METHOD_GET }.to_string();
        self
    }

    pub fn with_headers(mut self, headers: HeaderSpec) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_skip_verify(mut self, skip_verify: bool) -> Self {
        self.skip_verify = skip_verify;
        self
    }

    pub fn with_protocol(mut self, protocol: HttpProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// A request with pseudo-headers already folded into the request line.
pub struct PreparedRequest {
    pub method: Method,
    pub scheme: String,
    pub authority: String,
    pub path: String,
    pub headers: HeaderMap,
    /// URL this request addresses, with an overridden path applied. Relative
    /// redirect locations resolve against it.
    pub url: Url,
    pub body: RequestBody,
}

impl PreparedRequest {
    /// Applies the header spec to the target. `method`, `authority` and `path`
    /// entries rewrite the request line; every other entry becomes a header.
    pub fn new(method: &str, target: &Target, spec: &HeaderSpec) -> Result<Self, ProbeError> {
        let mut method = method.to_string();
        let mut authority = target.authority()?;
        let mut path = target.path_only().to_string();
        let mut headers = HeaderMap::new();

        for (name, value) in spec.iter() {
            match PseudoHeader::from_name(name) {
                Some(PseudoHeader::Method) => method = value.to_string(),
                Some(PseudoHeader::Authority) => authority = value.to_string(),
                Some(PseudoHeader::Path) => path = value.to_string(),
                None => {
                    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                        ProbeError::MalformedHeaders(format!("Invalid header name '{}'", name))
                    })?;
                    let header_value = HeaderValue::from_str(value).map_err(|_| {
                        ProbeError::MalformedHeaders(format!(
                            "Invalid value for header '{}'",
                            name
                        ))
                    })?;
                    headers.insert(header_name, header_value);
                }
            }
        }

        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| ProbeError::InvalidMethod(method.clone()))?;

        let mut url = target.url.clone();
        if path != target.path_only() {
            url.set_path(&path);
        }

        Ok(Self {
            method,
            scheme: target.scheme().to_string(),
            authority,
            path: with_query(path, target.query()),
            headers,
            url,
            body: empty_body(),
        })
    }

    /// The request line and headers without the body.
    pub fn head(&self) -> PreparedRequest {
        PreparedRequest {
            method: self.method.clone(),
            scheme: self.scheme.clone(),
            authority: self.authority.clone(),
            path: self.path.clone(),
            headers: self.headers.clone(),
            url: self.url.clone(),
            body: empty_body(),
        }
    }

    /// Follow-up request for a redirect to `location`, sent with `method` and
    /// no body. Headers carry over, except credentials when the host changes.
    /// An overridden authority survives only a relative location.
    pub fn redirect_to(
        &self,
        location: &str,
        method: Method,
    ) -> Result<(Target, PreparedRequest), ProbeError> {
        let url = resolve_redirect_url(&self.url, location).map_err(|e| {
            ProbeError::RequestFailed(format!("Invalid redirect location '{}' ({})", location, e))
        })?;
        let target = parse_target(url.as_str())?;

        let relative = Url::parse(location).is_err();
        let authority_overridden = Target::new(self.url.clone()).authority()? != self.authority;
        let authority = if relative && authority_overridden {
            self.authority.clone()
        } else {
            target.authority()?
        };

        let mut headers = self.headers.clone();
        headers.remove(CONTENT_LENGTH);
        if target.host() != self.url.host_str() {
            for name in [AUTHORIZATION, COOKIE, WWW_AUTHENTICATE] {
                headers.remove(name);
            }
        }
        headers.remove(REFERER);
        if let Some(referer) = referer_for(&self.url, &target.url) {
            headers.insert(REFERER, referer);
        }

        let request = PreparedRequest {
            method,
            scheme: target.scheme().to_string(),
            authority,
            path: with_query(target.path_only().to_string(), target.query()),
            headers,
            url: target.url.clone(),
            body: empty_body(),
        };
        Ok((target, request))
    }

    /// Attaches a body. A known length becomes an explicit `Content-Length`
    /// unless the caller already supplied one.
    pub fn set_body(&mut self, body: RequestBody, length: Option<u64>) {
        if let Some(length) = length {
            if !self.headers.contains_key(CONTENT_LENGTH) {
                self.headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
            }
        }
        self.body = body;
    }

    pub fn request_line(&self) -> String {
        format!("{} {}://{}{}", self.method, self.scheme, self.authority, self.path)
    }

    /// Origin-form request target with the authority carried in `Host`.
    pub fn into_h1_request(self) -> Result<http::Request<RequestBody>, ProbeError> {
        let host = HeaderValue::from_str(&self.authority)
            .map_err(|_| ProbeError::InvalidTarget(format!("Invalid authority '{}'", self.authority)))?;
        let uri: Uri = self
            .path
            .parse()
            .map_err(|_| ProbeError::InvalidTarget(format!("Invalid path '{}'", self.path)))?;

        let mut request = http::Request::builder()
            .method(self.method)
            .uri(uri)
            .version(Version::HTTP_11)
            .body(self.body)?;
        *request.headers_mut() = self.headers;
        request.headers_mut().insert(HOST, host);
        Ok(request)
    }

    /// Absolute URI so that `:scheme`, `:authority` and `:path` come from it.
    pub fn into_h2_request(self) -> Result<http::Request<RequestBody>, ProbeError> {
        let uri = Uri::builder()
            .scheme(self.scheme.as_str())
            .authority(self.authority.as_str())
            .path_and_query(self.path.as_str())
            .build()
            .map_err(|e| {
                ProbeError::InvalidTarget(format!(
                    "{}://{}{} ({})",
                    self.scheme, self.authority, self.path, e
                ))
            })?;

        let mut request = http::Request::builder()
            .method(self.method)
            .uri(uri)
            .version(Version::HTTP_2)
            .body(self.body)?;
        *request.headers_mut() = self.headers;
        request.headers_mut().remove(HOST);
        Ok(request)
    }
}

fn with_query(mut path: String, query: Option<&str>) -> String {
    if path.is_empty() {
        path.push('/');
    }
    if let Some(query) = query {
        path.push('?');
        path.push_str(query);
    }
    path
}

/// No referer is sent from an `https` page to an `http` one.
fn referer_for(from: &Url, to: &Url) -> Option<HeaderValue> {
    if from.scheme() == "https" && to.scheme() == "http" {
        return None;
    }
    let mut referer = from.clone();
    let _ = referer.set_username("");
    let _ = referer.set_password(None);
    referer.set_fragment(None);
    HeaderValue::from_str(referer.as_str()).ok()
}

pub fn empty_body() -> RequestBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn buffered_body(bytes: Bytes) -> RequestBody {
    Full::new(bytes).map_err(|never| match never {}).boxed_unsync()
}

pub fn streaming_body(reader: BodyReader) -> RequestBody {
    let frames = ReaderStream::new(reader).map_ok(Frame::data);
    StreamBody::new(frames).boxed_unsync()
}

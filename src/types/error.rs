#[derive(Debug)]
pub enum ProbeError {
    // Configuration errors, detected before any I/O
    MalformedHeaders(String),
    InvalidTarget(String),
    InvalidMethod(String),

    // Transport errors
    ConnectionFailed(String),
    Tls(String),
    Alpn(String),

    Timeout,

    // Read/exchange errors
    Io(std::io::Error),
    BodyRead(String),
    RequestFailed(String),

    Serialization(serde_json::Error),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::MalformedHeaders(msg) => write!(f, "Malformed headers: {}", msg),
            ProbeError::InvalidTarget(msg) => write!(f, "Invalid target: {}", msg),
            ProbeError::InvalidMethod(msg) => write!(f, "Invalid method: {}", msg),

            ProbeError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            ProbeError::Tls(msg) => write!(f, "TLS error: {}", msg),
            ProbeError::Alpn(msg) => write!(f, "ALPN negotiation failed: {}", msg),

            ProbeError::Timeout => write!(f, "Request timeout"),

            ProbeError::Io(err) => write!(f, "IO error: {}", err),
            ProbeError::BodyRead(msg) => write!(f, "Body read failed: {}", msg),
            ProbeError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),

            ProbeError::Serialization(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Io(err) => Some(err),
            ProbeError::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

// From conversions
impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::Io(err)
    }
}

impl From<hyper::Error> for ProbeError {
    fn from(err: hyper::Error) -> Self {
        ProbeError::RequestFailed(err.to_string())
    }
}

impl From<http::Error> for ProbeError {
    fn from(err: http::Error) -> Self {
        ProbeError::RequestFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ProbeError {
    fn from(err: serde_json::Error) -> Self {
        ProbeError::Serialization(err)
    }
}

use super::error::ProbeError;
use super::{PreparedRequest, Response};
use crate::stream::TransportStream;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpProtocol {
    Http1,
    Http2,
    H2C,
}

impl std::fmt::Display for HttpProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpProtocol::Http1 => write!(f, "HTTP/1.1"),
            HttpProtocol::Http2 => write!(f, "HTTP/2"),
            HttpProtocol::H2C => write!(f, "HTTP/2 (cleartext)"),
        }
    }
}

/// Runs one request over an already established stream.
#[async_trait]
pub trait Protocol: Send + Sync {
    async fn response(
        &self,
        stream: TransportStream,
        request: PreparedRequest,
    ) -> Result<Response, ProbeError>;
}

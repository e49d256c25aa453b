use async_trait::async_trait;
use hyper::client::conn::http2;
use hyper_util::rt::{TokioExecutor, TokioIo};
use log::debug;

use crate::stream::{TransportStream, ALPN_H2};
use crate::types::{PreparedRequest, ProbeError, Protocol, Response};
use crate::utils::HTTP_SCHEME;

/// HTTP/2 over a single connection; hyper and h2 handle framing, HPACK and
/// flow control.
pub struct H2Client {
    allow_http: bool,
}

impl H2Client {
    pub fn new() -> Self {
        Self { allow_http: false }
    }

    /// Permits HTTP/2 over a cleartext stream (prior knowledge, no Upgrade).
    pub fn allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }

    fn check_stream(&self, stream: &TransportStream, scheme: &str) -> Result<(), ProbeError> {
        if !stream.is_tls() {
            if self.allow_http {
                return Ok(());
            }
            return Err(ProbeError::ConnectionFailed(format!(
                "HTTP/2 over cleartext is not allowed for scheme '{}'",
                scheme
            )));
        }

        match stream.alpn_protocol() {
            Some(ALPN_H2) => Ok(()),
            Some(other) => Err(ProbeError::Alpn(format!(
                "server selected '{}' instead of 'h2'",
                String::from_utf8_lossy(other)
            ))),
            None => Err(ProbeError::Alpn(
                "server did not negotiate a protocol".to_string(),
            )),
        }
    }
}

impl Default for H2Client {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Protocol for H2Client {
    async fn response(
        &self,
        stream: TransportStream,
        request: PreparedRequest,
    ) -> Result<Response, ProbeError> {
        if request.scheme == HTTP_SCHEME && !self.allow_http {
            return Err(ProbeError::ConnectionFailed(
                "HTTP/2 over cleartext is not allowed".to_string(),
            ));
        }
        self.check_stream(&stream, &request.scheme)?;

        let request = request.into_h2_request()?;

        let (mut sender, connection) =
            http2::handshake(TokioExecutor::new(), TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                debug!("HTTP/2 connection closed with error: {}", err);
            }
        });

        let response = sender.send_request(request).await?;
        Response::read(response).await
    }
}

use async_trait::async_trait;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use log::debug;

use crate::stream::TransportStream;
use crate::types::{PreparedRequest, ProbeError, Protocol, Response};

/// HTTP/1.1 over a single connection; hyper handles the framing.
pub struct H1Client;

impl H1Client {
    pub fn new() -> Self {
        Self
    }
}

impl Default for H1Client {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Protocol for H1Client {
    async fn response(
        &self,
        stream: TransportStream,
        request: PreparedRequest,
    ) -> Result<Response, ProbeError> {
        let request = request.into_h1_request()?;

        let (mut sender, connection) = http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                debug!("HTTP/1.1 connection closed with error: {}", err);
            }
        });

        let response = sender.send_request(request).await?;
        Response::read(response).await
    }
}

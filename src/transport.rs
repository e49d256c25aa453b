use async_trait::async_trait;
use log::debug;
use tokio_rustls::TlsConnector;

use crate::h1::H1Client;
use crate::h2::H2Client;
use crate::stream::{build_tls_connector, create_tcp_stream, create_tls_stream, TransportStream};
use crate::types::{HttpProtocol, PreparedRequest, ProbeError, Protocol, Response, Target};

/// How a connection to the peer is established.
#[async_trait]
pub trait Dial: Send + Sync {
    async fn dial(&self, target: &Target) -> Result<TransportStream, ProbeError>;
}

/// Raw TCP regardless of the URL scheme. Used for HTTP/2 with prior knowledge.
pub struct PlainDial;

#[async_trait]
impl Dial for PlainDial {
    async fn dial(&self, target: &Target) -> Result<TransportStream, ProbeError> {
        create_tcp_stream(&target.dial_host()?, target.port()?).await
    }
}

/// TLS for `https`, raw TCP for `http`.
pub struct SchemeDial {
    connector: TlsConnector,
}

impl SchemeDial {
    pub fn new(connector: TlsConnector) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl Dial for SchemeDial {
    async fn dial(&self, target: &Target) -> Result<TransportStream, ProbeError> {
        let host = target.dial_host()?;
        let port = target.port()?;
        if target.is_tls() {
            create_tls_stream(&self.connector, &host, port).await
        } else {
            create_tcp_stream(&host, port).await
        }
    }
}

/// A dial strategy paired with the protocol spoken over the resulting stream.
pub struct Transport {
    protocol: HttpProtocol,
    dialer: Box<dyn Dial>,
    client: Box<dyn Protocol>,
}

impl Transport {
    /// Chooses the transport for `url`. No I/O happens here, so this cannot
    /// fail; a bad URL surfaces when the request is executed.
    ///
    /// With HTTP/2 selected and an `http://` URL the TLS dial is replaced by a
    /// plain TCP dial and cleartext HTTP/2 is explicitly allowed.
    pub fn new(url: &str, skip_verify: bool, protocol: HttpProtocol) -> Self {
        let verify = !skip_verify;
        match protocol {
            HttpProtocol::Http1 => Self {
                protocol,
                dialer: Box::new(SchemeDial::new(build_tls_connector(
                    verify,
                    crate::stream::ALPN_HTTP11,
                ))),
                client: Box::new(H1Client::new()),
            },
            HttpProtocol::Http2 | HttpProtocol::H2C if is_plain_http(url) => Self {
                protocol: HttpProtocol::H2C,
                dialer: Box::new(PlainDial),
                client: Box::new(H2Client::new().allow_http(true)),
            },
            HttpProtocol::Http2 | HttpProtocol::H2C => Self {
                protocol: HttpProtocol::Http2,
                dialer: Box::new(SchemeDial::new(build_tls_connector(
                    verify,
                    crate::stream::ALPN_H2,
                ))),
                client: Box::new(H2Client::new()),
            },
        }
    }

    pub fn protocol(&self) -> HttpProtocol {
        self.protocol
    }

    pub async fn round_trip(
        &self,
        target: &Target,
        request: PreparedRequest,
    ) -> Result<Response, ProbeError> {
        debug!("{} via {}", request.request_line(), self.protocol);
        let stream = self.dialer.dial(target).await?;
        self.client.response(stream, request).await
    }
}

fn is_plain_http(url: &str) -> bool {
    url.get(..7)
        .map(|prefix| prefix.eq_ignore_ascii_case("http://"))
        .unwrap_or(false)
}

use log::debug;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::ring::default_provider;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::{client::TlsStream, TlsConnector};

use crate::types::ProbeError;

pub const ALPN_HTTP11: &[u8] = b"http/1.1";
pub const ALPN_H2: &[u8] = b"h2";

/// Accepts any certificate chain for any host name.
#[derive(Debug)]
pub struct NoCertificateVerification;

impl ServerCertVerifier for NoCertificateVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// A connected byte stream, either raw TCP or TLS over TCP.
pub enum TransportStream {
    Tcp(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl TransportStream {
    pub fn is_tls(&self) -> bool {
        matches!(self, TransportStream::Tls(_))
    }

    /// Protocol selected by the server during the TLS handshake.
    pub fn alpn_protocol(&self) -> Option<&[u8]> {
        match self {
            TransportStream::Tcp(_) => None,
            TransportStream::Tls(stream) => stream.get_ref().1.alpn_protocol(),
        }
    }
}

impl AsyncRead for TransportStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            TransportStream::Tcp(stream) => Pin::new(stream).poll_read(cx, buf),
            TransportStream::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for TransportStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            TransportStream::Tcp(stream) => Pin::new(stream).poll_write(cx, buf),
            TransportStream::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            TransportStream::Tcp(stream) => Pin::new(stream).poll_flush(cx),
            TransportStream::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            TransportStream::Tcp(stream) => Pin::new(stream).poll_shutdown(cx),
            TransportStream::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}

fn server_name_from_str(name: &str) -> Result<ServerName<'static>, ProbeError> {
    ServerName::try_from(name.to_string())
        .map_err(|_| ProbeError::InvalidTarget(format!("Invalid server name: {}", name)))
}

fn webpki_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    root_store
}

/// Builds a connector offering a single ALPN protocol. With `verify` off, any
/// certificate chain and host name is accepted.
pub fn build_tls_connector(verify: bool, alpn: &[u8]) -> TlsConnector {
    // Ensure a crypto provider is installed (required for rustls >=0.23).
    let _ = default_provider().install_default();

    let builder = ClientConfig::builder();
    let mut config = if verify {
        builder
            .with_root_certificates(webpki_root_store())
            .with_no_client_auth()
    } else {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoCertificateVerification))
            .with_no_client_auth()
    };

    config.alpn_protocols = vec![alpn.to_vec()];

    TlsConnector::from(Arc::new(config))
}

/// Splits handshake failures caused by the peer's certificate or TLS
/// parameters from plain socket errors.
fn classify_tls_error(err: io::Error) -> ProbeError {
    let is_tls = err
        .get_ref()
        .map(|inner| inner.is::<rustls::Error>())
        .unwrap_or(false);

    if is_tls || err.kind() == io::ErrorKind::InvalidData {
        ProbeError::Tls(err.to_string())
    } else {
        ProbeError::ConnectionFailed(err.to_string())
    }
}

pub async fn connect_tcp(host: &str, port: u16) -> Result<TcpStream, ProbeError> {
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(|e| ProbeError::ConnectionFailed(format!("{}:{}: {}", host, port, e)))?;
    stream.set_nodelay(true)?;
    Ok(stream)
}

pub async fn create_tcp_stream(host: &str, port: u16) -> Result<TransportStream, ProbeError> {
    let stream = connect_tcp(host, port).await?;
    debug!("connected to {}:{} over plain TCP", host, port);
    Ok(TransportStream::Tcp(stream))
}

pub async fn create_tls_stream(
    connector: &TlsConnector,
    host: &str,
    port: u16,
) -> Result<TransportStream, ProbeError> {
    let tcp_stream = connect_tcp(host, port).await?;
    let server_name = server_name_from_str(host)?;

    let tls_stream = connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(classify_tls_error)?;

    let stream = TransportStream::Tls(Box::new(tls_stream));
    debug!(
        "TLS established with {}:{}, ALPN {:?}",
        host,
        port,
        stream.alpn_protocol().map(String::from_utf8_lossy)
    );
    Ok(stream)
}

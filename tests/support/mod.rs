#![allow(dead_code)]

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use rcgen::CertifiedKey;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

/// One request as the test server saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: http::Method,
    pub uri: http::Uri,
    pub version: http::Version,
    pub headers: http::HeaderMap,
    pub body: Bytes,
}

#[derive(Default)]
pub struct ServerOptions {
    pub tls: Option<TlsAcceptor>,
    /// Holds the response back this long after the request arrives.
    pub delay: Option<Duration>,
    /// Answer as soon as the request head arrives, without reading the body.
    pub skip_body: bool,
}

pub struct TestServer {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl TestServer {
    pub fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.addr.port(), path)
    }

    /// Uses `localhost` so the name matches the self-signed certificate.
    pub fn https_url(&self, path: &str) -> String {
        format!("https://localhost:{}{}", self.addr.port(), path)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> Seen {
        self.seen().pop().expect("server saw no request")
    }
}

/// Redirecting routes: `/old` and `/see-other` lead to `/new`, `/temporary`
/// to `/new` keeping the method, and `/loop` back to itself.
fn redirect_for(path: &str) -> Option<(u16, &'static str)> {
    match path {
        "/old" => Some((302, "/new")),
        "/see-other" => Some((303, "/new")),
        "/temporary" => Some((307, "/new")),
        "/loop" => Some((302, "/loop")),
        _ => None,
    }
}

async fn handle(
    request: Request<Incoming>,
    seen: Arc<Mutex<Vec<Seen>>>,
    delay: Option<Duration>,
    skip_body: bool,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = request.into_parts();
    let body = if skip_body {
        Bytes::new()
    } else {
        body.collect()
            .await
            .map(|collected| collected.to_bytes())
            .unwrap_or_default()
    };
    let redirect = redirect_for(parts.uri.path());

    {
        let mut seen = seen.lock().unwrap();
        seen.push(Seen {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body: body.clone(),
        });
    }

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if let Some((status, location)) = redirect {
        let response = Response::builder()
            .status(status)
            .header("location", location)
            .body(Full::new(Bytes::new()))
            .unwrap();
        return Ok(response);
    }

    let reply = if body.is_empty() {
        Bytes::from_static(b"hello")
    } else {
        body
    };

    let response = Response::builder()
        .status(200)
        .header("content-type", "text/plain")
        .header("set-cookie", "a=1")
        .header("set-cookie", "b=2")
        .body(Full::new(reply))
        .unwrap();
    Ok(response)
}

/// Serves HTTP/1.1 and HTTP/2 (prior knowledge on cleartext) on a random
/// local port until the test's runtime shuts down.
pub async fn spawn_server(options: ServerOptions) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let recorded = seen.clone();
    let ServerOptions {
        tls,
        delay,
        skip_body,
    } = options;
    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let recorded = recorded.clone();
            let tls = tls.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req| handle(req, recorded.clone(), delay, skip_body));
                let builder = Builder::new(TokioExecutor::new());
                match tls {
                    Some(acceptor) => {
                        if let Ok(stream) = acceptor.accept(tcp).await {
                            let _ = builder.serve_connection(TokioIo::new(stream), service).await;
                        }
                    }
                    None => {
                        let _ = builder.serve_connection(TokioIo::new(tcp), service).await;
                    }
                }
            });
        }
    });

    TestServer { addr, seen }
}

/// Acceptor with a freshly generated self-signed certificate for `localhost`.
pub fn self_signed_acceptor(alpn: &[&str]) -> TlsAcceptor {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

    let mut config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .unwrap();
    config.alpn_protocols = alpn.iter().map(|p| p.as_bytes().to_vec()).collect();

    TlsAcceptor::from(Arc::new(config))
}

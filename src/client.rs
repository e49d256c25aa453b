use bytes::Bytes;
use log::debug;
use tokio::io::AsyncReadExt;

use crate::transport::Transport;
use crate::types::{
    buffered_body, streaming_body, BodyReader, PreparedRequest, ProbeError, RequestConfig,
    Response, Target,
};
use crate::utils::{
    header_value, is_redirect_status, parse_target, redirect_method, timeout_result,
    MAX_REDIRECTS,
};

/// Reads the whole body up front so its length is known before sending.
pub async fn buffer_body(mut reader: BodyReader) -> Result<Bytes, ProbeError> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .await
        .map_err(|e| ProbeError::BodyRead(e.to_string()))?;
    Ok(Bytes::from(buf))
}

/// Sends `request` and follows redirects until a final response, giving up
/// after `MAX_REDIRECTS` hops. `replay` is the buffered body, resent on 307
/// and 308; a streamed body cannot be resent, so those responses are
/// returned as they are.
async fn follow_redirects(
    transport: &Transport,
    mut target: Target,
    mut request: PreparedRequest,
    replay: Option<Bytes>,
    streamed: bool,
) -> Result<Response, ProbeError> {
    let mut redirects = 0;
    loop {
        let head = request.head();
        let response = transport.round_trip(&target, request).await?;
        if !is_redirect_status(response.status) {
            return Ok(response);
        }
        let location = match header_value(&response.headers, "location") {
            Some(location) => location.to_string(),
            None => return Ok(response),
        };

        let (method, resend_body) = redirect_method(response.status, &head.method);
        if resend_body && streamed {
            debug!("not following {}: streamed body cannot be resent", response.status);
            return Ok(response);
        }
        if redirects == MAX_REDIRECTS {
            return Err(ProbeError::RequestFailed(format!(
                "stopped after {} redirects",
                MAX_REDIRECTS
            )));
        }
        redirects += 1;

        let (next_target, mut next) = head.redirect_to(&location, method)?;
        if resend_body {
            if let Some(bytes) = &replay {
                next.set_body(buffered_body(bytes.clone()), Some(bytes.len() as u64));
            }
        }
        debug!("{} redirect to {}", response.status, next_target);
        target = next_target;
        request = next;
    }
}

/// Performs the request described by `config` over `transport`.
///
/// Configuration problems are reported before any connection is made. The
/// deadline covers connecting, the TLS handshake, sending, every redirect
/// hop and reading the full response; a buffered body is read before the
/// clock starts.
pub async fn execute(
    config: &RequestConfig,
    transport: &Transport,
    body: Option<BodyReader>,
) -> Result<Response, ProbeError> {
    let target = parse_target(&config.url)?;
    let mut request = PreparedRequest::new(&config.method, &target, &config.headers)?;

    let mut replay = None;
    let streamed = config.stream && body.is_some();
    if let Some(reader) = body {
        if config.stream {
            debug!("streaming request body without Content-Length");
            request.set_body(streaming_body(reader), None);
        } else {
            let bytes = buffer_body(reader).await?;
            debug!("buffered {} byte request body", bytes.len());
            request.set_body(buffered_body(bytes.clone()), Some(bytes.len() as u64));
            replay = Some(bytes);
        }
    }

    let exchange = follow_redirects(transport, target, request, replay, streamed);
    let response = timeout_result(config.timeout, exchange).await?;
    debug!(
        "{} {} with {} header(s) and {} byte body",
        response.protocol,
        response.status,
        response.headers.len(),
        response.body.len()
    );
    Ok(response)
}

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;

use super::{Header, ProbeError};

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub protocol: String,
    /// Header pairs in receipt order; repeated names appear once per value.
    pub headers: Vec<Header>,
    pub body: Bytes,
}

impl Response {
    /// Drains a hyper response fully into memory.
    pub async fn read(response: http::Response<Incoming>) -> Result<Self, ProbeError> {
        let (parts, body) = response.into_parts();

        let headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                Header::new(
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = body
            .collect()
            .await
            .map_err(|e| ProbeError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self {
            status: parts.status.as_u16(),
            protocol: format!("{:?}", parts.version),
            headers,
            body,
        })
    }
}

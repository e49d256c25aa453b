use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use super::{Header, ProbeError, Response};
use crate::utils::canonical_header_key;

/// Key under which the numeric status code is reported alongside the headers.
pub const STATUS_KEY: &str = "status";

/// A header seen once is reported as a string, a repeated one as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Scalar(String),
    List(Vec<String>),
}

impl From<Vec<String>> for HeaderValue {
    fn from(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            HeaderValue::Scalar(values.remove(0))
        } else {
            HeaderValue::List(values)
        }
    }
}

/// The JSON document printed for a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    pub headers: BTreeMap<String, HeaderValue>,
    pub body: String,
}

impl ResponseEnvelope {
    pub fn new(status: u16, headers: &[Header], body: &[u8]) -> Self {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for header in headers {
            grouped
                .entry(canonical_header_key(&header.name))
                .or_default()
                .push(header.value.clone());
        }

        let mut headers: BTreeMap<String, HeaderValue> = grouped
            .into_iter()
            .map(|(name, values)| (name, HeaderValue::from(values)))
            .collect();
        headers.insert(
            STATUS_KEY.to_string(),
            HeaderValue::Scalar(status.to_string()),
        );

        Self {
            headers,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    pub fn from_response(response: &Response) -> Self {
        Self::new(response.status, &response.headers, &response.body)
    }
}

/// Writes the envelope as a single JSON line.
pub fn write_envelope<W: Write>(writer: &mut W, envelope: &ResponseEnvelope) -> Result<(), ProbeError> {
    serde_json::to_writer(&mut *writer, envelope)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

//! Replay: rebuilding a captured request for re-sending.
//!
//! The builder produces a one-shot [`ReplayRequest`] from a source
//! [`Transaction`], with optional per-field overrides. Sending is behind the
//! [`Transport`] seam; this crate ships no transport implementation, only
//! the convention that a transport's raw response is wrapped into a new
//! Transaction Record and appended to the source's replay history.

use tracing::debug;
use url::Url;

use crate::headers::HeaderMap;
use crate::record::{RawRecord, RawRequest, RawResponse};
use crate::transaction::{RecordError, Transaction};

/// Failure reported by a [`Transport`] implementation.
#[derive(Debug, thiserror::Error)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("replay response could not be normalized: {0}")]
    Record(#[from] RecordError),
}

/// Ready-to-send request parameters. Handed off to a transport and not
/// retained; the source record is never mutated by building one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRequest {
    pub url: String,
    pub method: String,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

/// The out-of-scope wire side of a replay. Implementations actually issue
/// the request and hand back the raw response shape a log decoder would
/// produce, so the outcome can be normalized like any other record.
pub trait Transport {
    fn send(&self, request: &ReplayRequest) -> Result<RawResponse, TransportError>;
}

/// Builder for a [`ReplayRequest`]. Fields left unset default from the
/// source record at [`build`](Self::build) time.
#[derive(Debug, Clone, Default)]
pub struct ReplayRequestBuilder {
    url: Option<String>,
    method: Option<String>,
    body: Option<Vec<u8>>,
    headers: Option<HeaderMap>,
}

impl ReplayRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Resolve against a source record: unset overrides default from the
    /// record (headers by deep copy, never shared). A `POST` with a
    /// non-empty body always gets its `Content-Length` rewritten to the
    /// effective body length, whatever the caller supplied.
    pub fn build(self, source: &Transaction) -> ReplayRequest {
        let url = self
            .url
            .unwrap_or_else(|| source.url().map(Url::to_string).unwrap_or_default());
        let method = self
            .method
            .unwrap_or_else(|| source.request_method().unwrap_or("").to_string());
        let body = self.body.unwrap_or_else(|| source.request_body().to_vec());
        let mut headers = self
            .headers
            .unwrap_or_else(|| source.request_headers().clone());

        if method == "POST" && !body.is_empty() {
            headers.insert("Content-Length", body.len().to_string());
        }

        ReplayRequest {
            url,
            method,
            body,
            headers,
        }
    }
}

/// Replay a transaction through `transport`, wrapping the outcome into a
/// new Transaction Record appended to the source's replay history. Returns
/// the appended record.
pub fn replay<'a, T: Transport>(
    source: &'a mut Transaction,
    transport: &T,
    overrides: ReplayRequestBuilder,
) -> Result<&'a Transaction, ReplayError> {
    let request = overrides.build(source);
    let raw_response = transport.send(&request)?;

    let (host, path) = split_url(&request.url);
    let raw = RawRecord {
        host,
        ip_address: None,
        time: None,
        request: Some(RawRequest {
            method: Some(request.method),
            path,
            version: Some("HTTP/1.1".to_string()),
            headers: Some(request.headers.format_block()),
            body: Some(String::from_utf8_lossy(&request.body).into_owned()),
        }),
        response: Some(raw_response),
    };

    let outcome = Transaction::from_record(raw, source.index())?;
    debug!(index = source.index(), "replay outcome recorded");
    Ok(source.record_replay(outcome))
}

/// Split an effective URL back into the raw-record shape: a scheme-qualified
/// host and an origin-form path. An unparseable url keeps everything on the
/// path side.
fn split_url(url: &str) -> (Option<String>, Option<String>) {
    match Url::parse(url) {
        Ok(parsed) if !parsed.cannot_be_a_base() => {
            let host = parsed.host_str().map(|host| match parsed.port() {
                Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
                None => format!("{}://{}", parsed.scheme(), host),
            });
            let mut path = parsed.path().to_string();
            if let Some(query) = parsed.query() {
                path.push('?');
                path.push_str(query);
            }
            (host, Some(path))
        }
        _ => (None, Some(url.to_string())),
    }
}

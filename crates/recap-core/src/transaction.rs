//! The canonical Transaction Record: one captured request/response pair.
//!
//! Construction normalizes a loose [`RawRecord`](crate::record::RawRecord)
//! into a queryable structure, derives the full URL and request parameters,
//! and reconciles body lengths against the declared `Content-Length`
//! headers. Log capture may pick up an extra CRLF or two past the real body,
//! so reconciliation trims each body down to the declared length — and only
//! down; a declared length longer than the captured body is untrustworthy
//! and never padded toward.
//!
//! A record is effectively immutable after construction, except for appends
//! to its replay history.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::headers::HeaderMap;
use crate::params;
use crate::record::RawRecord;

/// Errors from normalizing a raw log record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("raw record is missing its `{0}` section")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Default)]
struct Request {
    method: Option<String>,
    path: Option<String>,
    version: Option<String>,
    headers: HeaderMap,
    body: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
struct Response {
    version: Option<String>,
    status: u16,
    reason: Option<String>,
    headers: HeaderMap,
    body: Vec<u8>,
}

/// One captured HTTP transaction from an intercepting-proxy log.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    index: usize,
    host: Option<String>,
    ip_address: Option<String>,
    time: Option<String>,
    request: Request,
    response: Response,
    url: Option<Url>,
    parameters: HashMap<String, String>,
    replay_history: Vec<Transaction>,
}

impl Transaction {
    /// An empty, inert record for programmatic construction.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Normalize a raw log record into a Transaction Record.
    ///
    /// Missing leaf fields default (absent strings stay absent, absent
    /// bodies become empty, an unparseable status degrades to 0); only a
    /// missing `request` or `response` section fails construction.
    pub fn from_record(raw: RawRecord, index: usize) -> Result<Self, RecordError> {
        let req = raw.request.ok_or(RecordError::MissingField("request"))?;
        let resp = raw.response.ok_or(RecordError::MissingField("response"))?;

        let request = Request {
            method: req.method,
            path: req.path,
            version: req.version,
            headers: req
                .headers
                .as_deref()
                .map(HeaderMap::parse_block)
                .unwrap_or_default(),
            body: req.body.map(String::into_bytes).unwrap_or_default(),
        };

        let response = Response {
            version: resp.version,
            status: parse_status(resp.status.as_ref()),
            reason: resp.reason,
            headers: resp
                .headers
                .as_deref()
                .map(HeaderMap::parse_block)
                .unwrap_or_default(),
            body: resp.body.map(String::into_bytes).unwrap_or_default(),
        };

        let mut transaction = Self {
            index,
            host: raw.host,
            ip_address: raw.ip_address,
            time: raw.time,
            request,
            response,
            url: None,
            parameters: HashMap::new(),
            replay_history: Vec::new(),
        };

        transaction.url = derive_url(
            transaction.host.as_deref(),
            transaction.request.path.as_deref(),
        );
        transaction.parameters = params::parse_parameters(&transaction);
        transaction.reconcile_response_body();
        transaction.reconcile_request_body();

        debug!(index = transaction.index, "transaction record created");
        Ok(transaction)
    }

    fn reconcile_response_body(&mut self) {
        let Some(declared) = declared_content_length(&self.response.headers) else {
            return;
        };
        let actual = self.response.body.len();
        if actual > declared {
            debug!(
                index = self.index,
                excess = actual - declared,
                "trimming response body to declared Content-Length"
            );
            self.response.body.truncate(declared);
        }
    }

    fn reconcile_request_body(&mut self) {
        // Binary AMF payloads carry internal length prefixes that a naive
        // trim would corrupt, so they keep whatever the log captured.
        if self.request_header("Content-Type").contains("amf") {
            return;
        }
        let Some(declared) = declared_content_length(&self.request.headers) else {
            return;
        };
        let actual = self.request.body.len();
        if actual > declared {
            debug!(
                index = self.index,
                excess = actual - declared,
                "trimming request body to declared Content-Length"
            );
            self.request.body.truncate(declared);
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// Opaque capture timestamp, verbatim from the log.
    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    /// Derived full URL: the request path resolved against the logged host.
    /// Absent when neither side yields a parseable URL.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Parameters extracted from the query string and form-encoded body.
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn request_method(&self) -> Option<&str> {
        self.request.method.as_deref()
    }

    pub fn request_path(&self) -> Option<&str> {
        self.request.path.as_deref()
    }

    pub fn request_version(&self) -> Option<&str> {
        self.request.version.as_deref()
    }

    pub fn request_body(&self) -> &[u8] {
        &self.request.body
    }

    pub fn request_headers(&self) -> &HeaderMap {
        &self.request.headers
    }

    /// Case-insensitive request header lookup; empty string when absent.
    pub fn request_header(&self, name: &str) -> &str {
        self.request.headers.get(name).unwrap_or("")
    }

    pub fn response_version(&self) -> Option<&str> {
        self.response.version.as_deref()
    }

    /// Response status code; 0 when absent or unparseable in the log.
    pub fn response_status(&self) -> u16 {
        self.response.status
    }

    pub fn response_reason(&self) -> Option<&str> {
        self.response.reason.as_deref()
    }

    pub fn response_body(&self) -> &[u8] {
        &self.response.body
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response.headers
    }

    /// Case-insensitive response header lookup; `None` when absent (unlike
    /// [`request_header`](Self::request_header), which defaults to "").
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response.headers.get(name)
    }

    /// Summary length of the record: the reconciled response-body byte
    /// length.
    pub fn len(&self) -> usize {
        self.response.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.response.body.is_empty()
    }

    /// Transactions produced by replaying this one, in replay order.
    pub fn replay_history(&self) -> &[Transaction] {
        &self.replay_history
    }

    /// Append a replay outcome. History is append-only; entries are never
    /// removed or reordered.
    pub fn record_replay(&mut self, outcome: Transaction) -> &Transaction {
        self.replay_history.push(outcome);
        self.replay_history.last().expect("history just extended")
    }
}

/// Parse a logged status into a code, degrading to 0 on anything
/// unparseable. Logs encode status as a number or a digit string.
fn parse_status(value: Option<&Value>) -> u16 {
    match value {
        None => 0,
        Some(Value::Number(n)) => match n.as_u64().and_then(|v| u16::try_from(v).ok()) {
            Some(code) => code,
            None => {
                warn!(status = %n, "unparseable response status, defaulting to 0");
                0
            }
        },
        Some(Value::String(s)) => match s.trim().parse::<u16>() {
            Ok(code) => code,
            Err(_) => {
                warn!(status = %s, "unparseable response status, defaulting to 0");
                0
            }
        },
        Some(other) => {
            warn!(status = %other, "unparseable response status, defaulting to 0");
            0
        }
    }
}

/// Declared `Content-Length`, or `None` when absent or unparseable.
fn declared_content_length(headers: &HeaderMap) -> Option<usize> {
    let raw = headers.get("Content-Length")?;
    match raw.trim().parse::<usize>() {
        Ok(length) => Some(length),
        Err(_) => {
            warn!(value = raw, "unparseable Content-Length, skipping body reconciliation");
            None
        }
    }
}

/// Resolve the derived URL: an absolute request path wins outright, a
/// relative one is joined against the logged host. A host without a scheme
/// is assumed to be plain HTTP.
fn derive_url(host: Option<&str>, path: Option<&str>) -> Option<Url> {
    let path = path.unwrap_or("");
    if let Ok(absolute) = Url::parse(path) {
        if !absolute.cannot_be_a_base() {
            return Some(absolute);
        }
    }
    let host = host?;
    if host.is_empty() {
        return None;
    }
    let base = if host.contains("://") {
        Url::parse(host)
    } else {
        Url::parse(&format!("http://{host}"))
    };
    base.ok()?.join(path).ok()
}

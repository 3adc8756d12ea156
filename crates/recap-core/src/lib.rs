//! Recap core: a canonical in-memory model of captured HTTP transactions.
//!
//! A Transaction Record normalizes one entry of an intercepting-proxy log —
//! arbitrary header casing, optional fields, trailing capture garbage —
//! into a queryable request/response pair, reconciling each body against
//! its declared `Content-Length`. The replay builder turns such a record
//! back into ready-to-send request parameters, with overrides, for an
//! external transport.
//!
//! No network I/O lives here; the [`replay::Transport`] trait is the seam
//! where a real client plugs in.

// ===== Transaction Record =====
pub mod headers;
pub mod params;
pub mod record;
pub mod transaction;

// ===== Replay Builder =====
pub mod replay;

pub use headers::HeaderMap;
pub use record::{RawRecord, RawRequest, RawResponse};
pub use replay::{
    replay, ReplayError, ReplayRequest, ReplayRequestBuilder, Transport, TransportError,
};
pub use transaction::{RecordError, Transaction};

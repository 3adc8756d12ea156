//! Canonicalizing header map and raw header-blob parsing.
//!
//! Proxy logs store headers as a raw blob of `Name: value` lines with
//! whatever casing the client or server happened to emit. Every name is
//! canonicalized (title-cased per dash segment) on insertion so lookups are
//! case-insensitive regardless of how the header appeared on the wire.

use std::collections::HashMap;

/// Header name → value mapping with canonicalized keys.
///
/// Ordering is irrelevant; duplicate names keep the last value seen, which
/// matches how intercepting-proxy logs collapse repeated headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: HashMap<String, String>,
}

/// Title-case a header name per dash segment: `content-length` and
/// `CONTENT-LENGTH` both canonicalize to `Content-Length`.
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name.split('-').enumerate() {
        if i > 0 {
            out.push('-');
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(|c| c.to_lowercase()));
        }
    }
    out
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw header blob (CRLF- or LF-separated `Name: value` lines).
    ///
    /// Blank lines and lines without a colon are skipped; a log capture may
    /// carry trailing garbage that is not worth failing over.
    pub fn parse_block(raw: &str) -> Self {
        let mut headers = Self::new();
        for line in raw.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                headers.insert(name, value.trim());
            }
        }
        headers
    }

    /// Render back to a CRLF-terminated header blob.
    pub fn format_block(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.entries {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        }
        out
    }

    /// Insert a header, canonicalizing the name. Returns the displaced
    /// value when the header was already present.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        self.entries.insert(canonical_name(name), value.into())
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&canonical_name(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&canonical_name(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_title_cases_dash_segments() {
        assert_eq!(canonical_name("content-length"), "Content-Length");
        assert_eq!(canonical_name("CONTENT-TYPE"), "Content-Type");
        assert_eq!(canonical_name("x-api-key"), "X-Api-Key");
        assert_eq!(canonical_name("Host"), "Host");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", "5");
        assert_eq!(headers.get("Content-Length"), Some("5"));
        assert_eq!(headers.get("CONTENT-LENGTH"), Some("5"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn insert_collapses_case_variants() {
        let mut headers = HeaderMap::new();
        headers.insert("Host", "a");
        let displaced = headers.insert("HOST", "b");
        assert_eq!(displaced.as_deref(), Some("a"));
        assert_eq!(headers.get("host"), Some("b"));
    }

    #[test]
    fn parse_block_handles_crlf_and_garbage() {
        let headers = HeaderMap::parse_block(
            "Host: example.net\r\ncontent-type: text/html\r\nnot a header line\r\n\r\n",
        );
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("host"), Some("example.net"));
        assert_eq!(headers.get("Content-Type"), Some("text/html"));
    }

    #[test]
    fn parse_block_trims_whitespace_around_values() {
        let headers = HeaderMap::parse_block("X-Padded:    spaced out   \n");
        assert_eq!(headers.get("x-padded"), Some("spaced out"));
    }

    #[test]
    fn format_block_round_trips() {
        let mut headers = HeaderMap::new();
        headers.insert("Host", "example.net");
        let reparsed = HeaderMap::parse_block(&headers.format_block());
        assert_eq!(reparsed, headers);
    }
}

//! Request parameter extraction.

use std::collections::HashMap;

use url::form_urlencoded;

use crate::transaction::Transaction;

/// Extract the parameters of a populated transaction: query-string pairs
/// from its derived URL, merged with body pairs when the request carries a
/// form-encoded `Content-Type`. Body pairs win on key collision.
pub fn parse_parameters(transaction: &Transaction) -> HashMap<String, String> {
    let mut parameters = HashMap::new();

    if let Some(url) = transaction.url() {
        for (name, value) in url.query_pairs() {
            parameters.insert(name.into_owned(), value.into_owned());
        }
    }

    let form_encoded = transaction
        .request_header("Content-Type")
        .contains("application/x-www-form-urlencoded");
    if form_encoded && !transaction.request_body().is_empty() {
        for (name, value) in form_urlencoded::parse(transaction.request_body()) {
            parameters.insert(name.into_owned(), value.into_owned());
        }
    }

    parameters
}

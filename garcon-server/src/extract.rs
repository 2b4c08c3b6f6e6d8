//! Order extraction from completion text.
//!
//! The system prompt instructs the model to append a line of the form
//! `ORDER_COMPLETE:{"name":...,"phone":...,"items":[...],"total":...}`
//! once an order is confirmed. This module finds that marker, parses the
//! payload, and splices the matched span out of the user-visible reply.
//!
//! Extraction failure is silent and non-fatal: a partially-formed payload
//! must never break the chat response, so a malformed span leaves the
//! reply untouched (dangling marker included) and records nothing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Literal prefix signaling an embedded order payload.
pub const ORDER_MARKER: &str = "ORDER_COMPLETE:";

// Greedy to the last `}` on the line; `.` does not cross newlines, so a
// payload is always taken from the marker's own line.
static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ORDER_COMPLETE:(\{.*\})").expect("valid marker pattern"));

/// Parsed order payload from the marker JSON.
///
/// Missing fields default; a present field of the wrong type makes the
/// whole payload malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub rating: Option<u32>,
}

/// Outcome of scanning a reply for an order marker.
///
/// `Malformed` and `NoMarker` both pass the reply through unchanged; they
/// are distinguished so callers can log and tests can assert the difference.
#[derive(Debug)]
pub enum Extraction {
    /// No marker in the reply. The common case.
    NoMarker,
    /// Marker present but no parseable payload follows. The reply is left
    /// untouched, dangling marker and all.
    Malformed,
    /// A payload parsed; `span` is the byte range of the matched
    /// `marker + json` substring within the reply.
    Order {
        payload: OrderPayload,
        span: Range<usize>,
    },
}

/// Scan a reply for the first order marker and try to parse its payload.
pub fn scan(reply: &str) -> Extraction {
    if !reply.contains(ORDER_MARKER) {
        return Extraction::NoMarker;
    }

    // Marker without a following brace span counts as malformed
    let Some(caps) = MARKER_RE.captures(reply) else {
        return Extraction::Malformed;
    };

    let full = caps.get(0).expect("group 0 always present");
    let json = caps.get(1).expect("payload group always present");

    match serde_json::from_str::<OrderPayload>(json.as_str()) {
        Ok(payload) => Extraction::Order {
            payload,
            span: full.range(),
        },
        Err(e) => {
            tracing::debug!(error = %e, "Order marker present but payload failed to parse");
            Extraction::Malformed
        }
    }
}

/// Extract an order from a reply.
///
/// Returns the cleaned reply text and the parsed payload, if any. Only the
/// first matched span is removed; later marker occurrences stay in the
/// text. Without a usable marker the reply comes back unchanged.
pub fn extract(reply: &str) -> (String, Option<OrderPayload>) {
    match scan(reply) {
        Extraction::Order { payload, span } => {
            let mut cleaned = String::with_capacity(reply.len() - span.len());
            cleaned.push_str(&reply[..span.start]);
            cleaned.push_str(&reply[span.end..]);
            (cleaned.trim().to_string(), Some(payload))
        }
        Extraction::NoMarker | Extraction::Malformed => (reply.to_string(), None),
    }
}

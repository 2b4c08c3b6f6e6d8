//! Order ledger and aggregate queries.
//!
//! The ledger is append-only and lives for the process lifetime; records
//! are never mutated or deleted. One mutex guards the record list, which
//! makes id allocation (read length, increment, append) atomic: ids are
//! unique, 1-based, and gap-free even under concurrent extraction.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::extract::OrderPayload;

/// Timestamp format used on order records.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A completed order, derived from an extracted payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Monotonic, 1-based, assigned at insertion
    pub id: u64,
    pub name: String,
    pub phone: String,
    pub items: Vec<String>,
    pub total: f64,
    /// Insertion time, `YYYY-MM-DD HH:MM:SS`
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
}

/// Append-only, process-lifetime collection of orders.
pub struct OrderLedger {
    records: Mutex<Vec<OrderRecord>>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Turn an extracted payload into a record and append it.
    ///
    /// Id and timestamp are assigned under the ledger lock, so concurrent
    /// callers always receive distinct consecutive ids.
    pub fn record(&self, payload: OrderPayload) -> OrderRecord {
        self.record_at(payload, Local::now().format(TIME_FORMAT).to_string())
    }

    fn record_at(&self, payload: OrderPayload, time: String) -> OrderRecord {
        let mut records = self.records.lock().expect("ledger poisoned");
        let record = OrderRecord {
            id: records.len() as u64 + 1,
            name: payload.name,
            phone: payload.phone,
            items: payload.items,
            total: payload.total,
            time,
            rating: payload.rating,
        };
        records.push(record.clone());
        record
    }

    /// Clone of all records in insertion order.
    pub fn snapshot(&self) -> Vec<OrderRecord> {
        self.records.lock().expect("ledger poisoned").clone()
    }

    /// Number of recorded orders.
    pub fn len(&self) -> u64 {
        self.records.lock().expect("ledger poisoned").len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for OrderLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Aggregate queries
// ============================================================================

/// Sum of order totals. A payload that omitted `total` parsed as 0.
pub fn total_revenue(records: &[OrderRecord]) -> f64 {
    records.iter().map(|r| r.total).sum()
}

/// Count of distinct phone values; an empty phone is one distinct value.
pub fn unique_customers(records: &[OrderRecord]) -> usize {
    records
        .iter()
        .map(|r| r.phone.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Mean rating over records with a present, non-zero rating.
/// 0.0 when no record qualifies.
pub fn average_rating(records: &[OrderRecord]) -> f64 {
    let rated: Vec<u32> = records
        .iter()
        .filter_map(|r| r.rating.filter(|&x| x > 0))
        .collect();

    if rated.is_empty() {
        return 0.0;
    }
    f64::from(rated.iter().sum::<u32>()) / rated.len() as f64
}

/// The `n` most frequent item names across all orders as (item, count)
/// pairs. Ties rank by first encounter (stable sort over first-encounter
/// order).
pub fn top_items(records: &[OrderRecord], n: usize) -> Vec<(String, u32)> {
    let mut first_seen: Vec<String> = Vec::new();
    let mut counts: HashMap<&str, u32> = HashMap::new();

    for record in records {
        for item in &record.items {
            if !counts.contains_key(item.as_str()) {
                first_seen.push(item.clone());
            }
            *counts.entry(item.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, u32)> = first_seen
        .into_iter()
        .map(|name| {
            let count = counts[name.as_str()];
            (name, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Aggregate view over the ledger, consumed by the dashboard renderer.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub unique_customers: usize,
    pub average_rating: f64,
    pub top_items: Vec<(String, u32)>,
}

impl LedgerStats {
    /// Compute all aggregates in one pass over a snapshot.
    pub fn compute(records: &[OrderRecord], top_n: usize) -> Self {
        Self {
            total_orders: records.len() as u64,
            total_revenue: total_revenue(records),
            unique_customers: unique_customers(records),
            average_rating: average_rating(records),
            top_items: top_items(records, top_n),
        }
    }
}

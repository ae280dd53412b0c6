//! Declaration metrics.
//!
//! # Responsibilities
//! - Count inclusion verdicts by deciding step
//! - Count routes claimed by block-defined sitemaps
//! - Track the number of registered routes
//!
//! # Metrics
//! - `sitemap_routes_evaluated_total` (counter): verdicts by `verdict` label
//! - `sitemap_routes_claimed_total` (counter): routes claimed by a sitemap block
//! - `sitemap_routes_registered` (gauge): routes currently registered
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the host installs the recorder
//! - Without a recorder every call is a no-op

use crate::filter::Verdict;

/// Record one predicate outcome.
pub fn record_verdict(verdict: Verdict) {
    metrics::counter!("sitemap_routes_evaluated_total", "verdict" => verdict.label()).increment(1);
}

/// Record routes claimed when a sitemap block exits.
pub fn record_claimed(count: usize) {
    metrics::counter!("sitemap_routes_claimed_total").increment(count as u64);
}

/// Record the current number of registered routes.
pub fn record_registered(total: usize) {
    metrics::gauge!("sitemap_routes_registered").set(total as f64);
}

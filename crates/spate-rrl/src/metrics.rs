//! Rate-limiting metrics.
//!
//! Two process-wide counters, labelled by client IP. The embedding server
//! owns the exporter; these only record.

use metrics::{counter, describe_counter};

/// Counter of requests dropped (or, in report-only mode, merely flagged)
/// for exceeding the request rate.
pub const REQUESTS_EXCEEDED: &str = "plugin_rrl_requests_exceeded_total";

/// Counter of responses dropped or slipped (or flagged) for exceeding a
/// response rate.
pub const RESPONSES_EXCEEDED: &str = "plugin_rrl_responses_exceeded_total";

/// Registers metric descriptions with the installed recorder. Safe to call
/// more than once.
pub fn describe() {
    describe_counter!(
        REQUESTS_EXCEEDED,
        "Counter of requests exceeding QPS limit."
    );
    describe_counter!(
        RESPONSES_EXCEEDED,
        "Counter of responses exceeding QPS limit."
    );
}

/// Records a request-rate exceed event for the given client prefix.
pub(crate) fn requests_exceeded(client_ip: &str) {
    counter!(REQUESTS_EXCEEDED, "client_ip" => client_ip.to_string()).increment(1);
}

/// Records a response-rate exceed event for the given client prefix.
pub(crate) fn responses_exceeded(client_ip: &str) {
    counter!(RESPONSES_EXCEEDED, "client_ip" => client_ip.to_string()).increment(1);
}

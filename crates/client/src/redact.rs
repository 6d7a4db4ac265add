//! Query redaction for logging.
//!
//! Search text may carry tokens, user names or incident identifiers, so it is
//! logged only as its length and a short hash. Operators can still correlate
//! the log lines of one request without seeing the query.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Redact a query string for logging, showing only length and a short hash prefix.
pub fn redact_query(query: &str) -> String {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    let hash = hasher.finish() & 0xffff_ffff;
    format!("<{} chars, hash={:08x}>", query.len(), hash)
}

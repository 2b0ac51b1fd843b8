//! # Spate Response Rate Limiting
//!
//! Middleware that protects a DNS server against reflection-amplification
//! abuse by limiting the rate at which equivalent responses are sent toward
//! any one client prefix.
//!
//! ## Architecture
//!
//! The middleware sits in the server's handler chain. Each query flows
//! through:
//!
//! - **Zone matching**: only queries under the configured zones are limited
//! - **Request debit** (optional): a pre-query charge keyed by client prefix
//! - **Capture**: the downstream handler writes into an in-memory sink
//! - **Classification**: the captured response falls into one of five
//!   categories (response, nodata, nxdomain, referral, error)
//! - **Token derivation**: client prefix + category + qtype + name collapse
//!   equivalent responses onto one accounting token
//! - **Debit**: interval arithmetic against a sharded account table decides
//!   whether to send, drop, or slip (send truncated) the response
//!
//! Accounting state lives in a fixed 256-shard table with per-shard locking
//! and opportunistic eviction, so memory stays bounded under floods and
//! distinct clients rarely contend on the same lock.
//!
//! ## Example
//!
//! ```rust,ignore
//! use spate_rrl::{Rrl, RrlConfig};
//! use std::sync::Arc;
//!
//! let config = RrlConfig::from_yaml(r#"
//! zones: ["example.com."]
//! responses-per-second: 10
//! slip: 2
//! "#)?;
//! let rrl = Rrl::new(config, upstream_handler)?;
//! server.set_handler(Arc::new(rrl));
//! ```

pub mod account;
pub mod capture;
pub mod classify;
pub mod config;
pub mod metrics;
pub mod plugin;
pub mod rrl;
pub mod table;
pub mod token;
pub mod zone;

mod clock;
mod handler;

pub use account::{Account, Debit};
pub use capture::CaptureWriter;
pub use classify::{classify, Category};
pub use config::{ConfigError, RrlConfig};
pub use plugin::{
    DnsHandler, Protocol, QueryContext, ResponseWriter, ServeError, ServeResult,
};
pub use rrl::Rrl;
pub use table::{Table, TableError};

//! The rate limiter core: configuration resolved to intervals, the sharded
//! account table, and the debit operation that every outbound response goes
//! through.

use crate::account::{Account, Debit};
use crate::classify::Category;
use crate::clock::Clock;
use crate::config::{ConfigError, Intervals, RrlConfig};
use crate::plugin::DnsHandler;
use crate::table::{Table, TableError};
use crate::{metrics, token};
use spate_proto::Name;
use std::net::IpAddr;
use std::sync::Arc;

/// Response rate limiting middleware.
///
/// Sits in the handler chain in front of the resolver (or any other
/// response source) and throttles equivalent responses per client prefix.
/// See the crate documentation for the flow; construction happens once at
/// startup via [`Rrl::new`] and the instance is then shared by every
/// server task.
pub struct Rrl {
    pub(crate) zones: Vec<Name>,
    pub(crate) intervals: Intervals,
    pub(crate) ipv4_prefix_length: u8,
    pub(crate) ipv6_prefix_length: u8,
    pub(crate) slip_ratio: u32,
    pub(crate) report_only: bool,
    pub(crate) table: Table,
    pub(crate) clock: Arc<Clock>,
    pub(crate) next: Arc<dyn DnsHandler>,
}

impl Rrl {
    /// Builds the middleware from its configuration, delegating resolution
    /// to `next`.
    pub fn new(config: RrlConfig, next: Arc<dyn DnsHandler>) -> Result<Self, ConfigError> {
        config.validate()?;
        metrics::describe();

        let zones = if config.zones.is_empty() {
            vec![Name::root()]
        } else {
            config
                .zones
                .iter()
                .map(|z| {
                    z.parse().map_err(|source| ConfigError::InvalidZone {
                        zone: z.clone(),
                        source,
                    })
                })
                .collect::<Result<_, _>>()?
        };

        let intervals = config.intervals();
        let clock = Arc::new(Clock::new());
        let table = Table::new(config.max_table_size);

        // An account whose debt has fully drained carries no pending limit,
        // so discarding it loses nothing.
        let window = intervals.window;
        let eviction_clock = Arc::clone(&clock);
        table.set_evict(move |account: &Account| {
            eviction_clock.now() - account.allow_time >= window
        });

        Ok(Self {
            zones,
            intervals,
            ipv4_prefix_length: config.ipv4_prefix_length,
            ipv6_prefix_length: config.ipv6_prefix_length,
            slip_ratio: config.slip,
            report_only: config.report_only,
            table,
            clock,
            next,
        })
    }

    /// Returns the per-unit cost for responses of the given category.
    /// Zero means the category is not limited.
    pub fn allowance(&self, category: Category) -> i64 {
        match category {
            Category::Response => self.intervals.responses,
            Category::Nodata => self.intervals.nodata,
            Category::Nxdomain => self.intervals.nxdomains,
            Category::Referral => self.intervals.referrals,
            Category::Error => self.intervals.errors,
        }
    }

    /// Charges one response of cost `interval` against `token` and returns
    /// the resulting balance and slip decision.
    ///
    /// A token seen for the first time gets a fresh account and a zero
    /// balance: the first response is always admitted. The table rejecting
    /// the new account (shard full, nothing evictable) is the only error,
    /// and callers treat it as an allowance.
    pub fn debit(&self, interval: i64, token: &str) -> Result<Debit, TableError> {
        let now = self.clock.now();
        let window = self.intervals.window;
        let slip_ratio = self.slip_ratio;
        let result = self.table.update_or_insert(
            token,
            |account| account.debit(now, interval, window, slip_ratio),
            || Account::new(now, interval, slip_ratio),
        )?;
        Ok(result.unwrap_or(Debit::FIRST))
    }

    /// Returns the client's address masked to the configured prefix.
    pub(crate) fn client_prefix(&self, addr: IpAddr) -> String {
        token::client_prefix(addr, self.ipv4_prefix_length, self.ipv6_prefix_length)
    }

    /// Returns an estimate of the number of live accounts.
    pub fn account_count(&self) -> usize {
        self.table.len()
    }
}

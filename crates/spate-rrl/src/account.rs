//! Per-token rate-limit accounting.
//!
//! Each account stores a deadline rather than a token count: `allow_time` is
//! the instant at or after which the next response on this token is
//! permitted. Every admitted response pushes the deadline one interval
//! further into the future; idle time pulls it back. The balance reported by
//! a debit is `now - allow_time - interval`, so a negative balance means the
//! sender is ahead of its allowance.

use crate::clock::SECOND;

/// Rate-limiter state for one equivalence-class token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    /// Monotonic nanosecond timestamp at or after which the next response
    /// is permitted.
    pub(crate) allow_time: i64,

    /// Countdown to the next slipped response. Zero disables slipping.
    pub(crate) slip_countdown: u32,
}

/// Outcome of one debit against an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debit {
    /// Signed balance in nanoseconds; negative means over the limit.
    pub balance: i64,

    /// True when this particular over-limit response should be sent
    /// truncated instead of dropped. Only ever true for negative balances.
    pub slip: bool,
}

impl Debit {
    /// The debit reported for a token's very first response, which is
    /// always admitted.
    pub(crate) const FIRST: Self = Self {
        balance: 0,
        slip: false,
    };
}

impl Account {
    /// Creates the account for a token's first response.
    ///
    /// The initial deadline is set one second back (minus the interval just
    /// charged), so a fresh token starts with the maximum credit the clamp
    /// in [`Account::debit`] would ever allow it to accumulate.
    pub(crate) fn new(now: i64, interval: i64, slip_ratio: u32) -> Self {
        Self {
            allow_time: now - SECOND + interval,
            slip_countdown: slip_ratio,
        }
    }

    /// Charges one response of cost `interval` at time `now` and returns the
    /// resulting balance and slip decision.
    ///
    /// The balance is clamped to `second - interval` from above (credit for
    /// at most one second of idle time) and to `-window` from below (debt is
    /// bounded), and `allow_time` is rewritten so the clamped balance is
    /// what the next debit starts from.
    pub(crate) fn debit(&mut self, now: i64, interval: i64, window: i64, slip_ratio: u32) -> Debit {
        let mut balance = now - self.allow_time - interval;
        if balance >= SECOND {
            balance = SECOND - interval;
        }
        if balance < -window {
            balance = -window;
        }
        self.allow_time = now - balance;

        if balance >= 0 || slip_ratio == 0 {
            return Debit {
                balance,
                slip: false,
            };
        }

        self.slip_countdown = self.slip_countdown.saturating_sub(1);
        if self.slip_countdown == 0 {
            self.slip_countdown = slip_ratio;
            Debit {
                balance,
                slip: true,
            }
        } else {
            Debit {
                balance,
                slip: false,
            }
        }
    }
}

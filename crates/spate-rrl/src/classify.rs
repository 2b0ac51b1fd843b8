//! Response classification.
//!
//! Every outbound response falls into one of five categories. Rate limits
//! are configured per category, and the category is baked into the
//! accounting token so that, for example, all NXDOMAIN answers beneath one
//! delegation share a single account.

use spate_proto::{Message, RecordType};
use std::fmt;

/// The rate-limiting category of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Category {
    /// A non-empty answer for an existing name.
    Response = 0,

    /// NOERROR with an empty answer section.
    Nodata = 1,

    /// NXDOMAIN.
    Nxdomain = 2,

    /// A delegation: NOERROR, empty answer, NS first in authority.
    Referral = 3,

    /// Any other rcode (SERVFAIL, FORMERR, ...).
    Error = 4,
}

impl Category {
    /// Returns the digit used for this category in accounting tokens.
    #[inline]
    pub const fn digit(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digit())
    }
}

/// Classifies a fully-populated response message.
pub fn classify(msg: &Message) -> Category {
    if !msg.answers().is_empty() {
        return Category::Response;
    }
    if msg.rcode().is_nxdomain() {
        return Category::Nxdomain;
    }
    if msg.rcode().is_success() {
        // NS leading the authority section marks a delegation. NOERROR
        // answers can carry NS authority records for other reasons; those
        // are counted as referrals too, per the coarser BIND rule.
        if msg
            .authority()
            .first()
            .is_some_and(|r| r.record_type() == RecordType::NS)
        {
            return Category::Referral;
        }
        return Category::Nodata;
    }
    Category::Error
}

//! DNS record types.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS resource record type.
///
/// Only the types the middleware and its tests touch are enumerated; unknown
/// types coming from the host are carried by their numeric value elsewhere.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum RecordType {
    /// IPv4 host address - RFC 1035
    A = 1,

    /// Authoritative name server - RFC 1035
    NS = 2,

    /// Canonical name alias - RFC 1035
    CNAME = 5,

    /// Start of authority - RFC 1035
    SOA = 6,

    /// Domain name pointer - RFC 1035
    PTR = 12,

    /// Mail exchange - RFC 1035
    MX = 15,

    /// Text record - RFC 1035
    TXT = 16,

    /// IPv6 host address - RFC 3596
    AAAA = 28,

    /// Service locator - RFC 2782
    SRV = 33,

    /// EDNS(0) option pseudo-record - RFC 6891
    OPT = 41,

    /// Request for all records - RFC 1035
    ANY = 255,
}

impl RecordType {
    /// Returns the numeric value of the record type.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Returns the record type for a numeric value, if known.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Returns the conventional mnemonic for the record type.
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::NS => "NS",
            Self::CNAME => "CNAME",
            Self::SOA => "SOA",
            Self::PTR => "PTR",
            Self::MX => "MX",
            Self::TXT => "TXT",
            Self::AAAA => "AAAA",
            Self::SRV => "SRV",
            Self::OPT => "OPT",
            Self::ANY => "ANY",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

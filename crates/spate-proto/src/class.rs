//! DNS record classes.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record class. IN is the only class seen in practice.
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
pub enum RecordClass {
    /// Internet - RFC 1035
    IN = 1,

    /// Chaos - RFC 1035
    CH = 3,

    /// Hesiod - RFC 1035
    HS = 4,

    /// None - RFC 2136
    NONE = 254,

    /// Any class - RFC 1035
    ANY = 255,
}

impl RecordClass {
    /// Returns the numeric value of the class.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Returns the class for a numeric value, if known.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IN => "IN",
            Self::CH => "CH",
            Self::HS => "HS",
            Self::NONE => "NONE",
            Self::ANY => "ANY",
        };
        f.write_str(name)
    }
}

//! DNS response codes (RCODEs).
//!
//! Defined in RFC 1035 Section 4.1.1 with extensions from RFC 2136.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS response code.
///
/// The RCODE field in the DNS header indicates the status of the response.
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
pub enum ResponseCode {
    /// No error condition - RFC 1035
    NoError = 0,

    /// Format error - RFC 1035
    FormErr = 1,

    /// Server failure - RFC 1035
    ServFail = 2,

    /// Name error (NXDOMAIN) - RFC 1035
    ///
    /// The domain name referenced in the query does not exist.
    NXDomain = 3,

    /// Not implemented - RFC 1035
    NotImp = 4,

    /// Query refused - RFC 1035
    Refused = 5,

    /// Name exists when it should not - RFC 2136
    YXDomain = 6,

    /// RR set exists when it should not - RFC 2136
    YXRRSet = 7,

    /// RR set that should exist does not - RFC 2136
    NXRRSet = 8,

    /// Server not authoritative for zone - RFC 2136
    NotAuth = 9,

    /// Name not contained in zone - RFC 2136
    NotZone = 10,
}

impl ResponseCode {
    /// Returns the numeric value of the response code.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Returns the response code for a numeric value, if known.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Returns true for NOERROR.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Self::NoError)
    }

    /// Returns true for NXDOMAIN.
    #[inline]
    pub fn is_nxdomain(self) -> bool {
        matches!(self, Self::NXDomain)
    }

    /// Returns true for SERVFAIL.
    #[inline]
    pub fn is_server_error(self) -> bool {
        matches!(self, Self::ServFail)
    }

    /// Returns true if a handler returning this rcode has written the
    /// response message itself.
    ///
    /// For SERVFAIL, REFUSED, FORMERR and NOTIMP the handler leaves writing
    /// the (error) response to the server; middleware that captures responses
    /// must pass these upward untouched.
    pub fn is_client_writable(self) -> bool {
        !matches!(
            self,
            Self::ServFail | Self::Refused | Self::FormErr | Self::NotImp
        )
    }

    /// Returns the conventional mnemonic for the response code.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NXDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
            Self::YXDomain => "YXDOMAIN",
            Self::YXRRSet => "YXRRSET",
            Self::NXRRSet => "NXRRSET",
            Self::NotAuth => "NOTAUTH",
            Self::NotZone => "NOTZONE",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(ResponseCode::NXDomain.to_u16(), 3);
        assert_eq!(ResponseCode::from_u16(3), Some(ResponseCode::NXDomain));
        assert_eq!(ResponseCode::from_u16(4095), None);
    }

    #[test]
    fn test_client_writable() {
        assert!(ResponseCode::NoError.is_client_writable());
        assert!(ResponseCode::NXDomain.is_client_writable());
        assert!(!ResponseCode::ServFail.is_client_writable());
        assert!(!ResponseCode::Refused.is_client_writable());
        assert!(!ResponseCode::FormErr.is_client_writable());
        assert!(!ResponseCode::NotImp.is_client_writable());
    }

    #[test]
    fn test_display() {
        assert_eq!(ResponseCode::NoError.to_string(), "NOERROR");
        assert_eq!(ResponseCode::ServFail.to_string(), "SERVFAIL");
    }
}

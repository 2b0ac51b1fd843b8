//! DNS message header.
//!
//! The header carries the message ID, the control flags, the opcode, and the
//! response code. Section counts are not stored; with an in-memory model the
//! section vectors themselves are authoritative.

use crate::rcode::ResponseCode;
use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// DNS header flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HeaderFlags: u16 {
        /// Query/Response flag: 0 = query, 1 = response
        const QR = 0x8000;

        /// Authoritative Answer: server is authoritative for the domain
        const AA = 0x0400;

        /// Truncation: message was truncated
        const TC = 0x0200;

        /// Recursion Desired: client wants recursive resolution
        const RD = 0x0100;

        /// Recursion Available: server supports recursion
        const RA = 0x0080;

        /// Authentic Data: response data is authenticated (DNSSEC)
        const AD = 0x0020;

        /// Checking Disabled: disable DNSSEC validation
        const CD = 0x0010;
    }
}

impl Default for HeaderFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// DNS operation code.
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
#[repr(u8)]
pub enum OpCode {
    /// Standard query - RFC 1035
    Query = 0,

    /// Inverse query (obsolete) - RFC 3425
    IQuery = 1,

    /// Server status request - RFC 1035
    Status = 2,

    /// Zone change notification - RFC 1996
    Notify = 4,

    /// Dynamic update - RFC 2136
    Update = 5,
}

/// DNS message header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Message identifier for matching requests to responses.
    pub id: u16,

    /// Query/Response flag and other flags.
    pub flags: HeaderFlags,

    /// Operation code.
    pub opcode: OpCode,

    /// Response code.
    pub rcode: ResponseCode,
}

impl Header {
    /// Creates a new query header with the given message ID.
    #[inline]
    pub const fn new(id: u16) -> Self {
        Self {
            id,
            flags: HeaderFlags::empty(),
            opcode: OpCode::Query,
            rcode: ResponseCode::NoError,
        }
    }

    /// Creates a response header from a query header.
    pub fn response_from(query: &Header) -> Self {
        Self {
            id: query.id,
            flags: HeaderFlags::QR | (query.flags & HeaderFlags::RD),
            opcode: query.opcode,
            rcode: ResponseCode::NoError,
        }
    }

    /// Returns true if this is a query.
    #[inline]
    pub fn is_query(&self) -> bool {
        !self.flags.contains(HeaderFlags::QR)
    }

    /// Returns true if this is a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.flags.contains(HeaderFlags::QR)
    }

    /// Returns true if the response is from an authoritative server.
    #[inline]
    pub fn is_authoritative(&self) -> bool {
        self.flags.contains(HeaderFlags::AA)
    }

    /// Returns true if the message was truncated.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.flags.contains(HeaderFlags::TC)
    }

    /// Returns true if recursion was requested.
    #[inline]
    pub fn recursion_desired(&self) -> bool {
        self.flags.contains(HeaderFlags::RD)
    }

    /// Sets the QR flag (marks as response).
    #[inline]
    pub fn set_response(&mut self, response: bool) {
        self.flags.set(HeaderFlags::QR, response);
    }

    /// Sets the AA flag.
    #[inline]
    pub fn set_authoritative(&mut self, aa: bool) {
        self.flags.set(HeaderFlags::AA, aa);
    }

    /// Sets the TC flag.
    #[inline]
    pub fn set_truncated(&mut self, tc: bool) {
        self.flags.set(HeaderFlags::TC, tc);
    }

    /// Sets the RD flag.
    #[inline]
    pub fn set_recursion_desired(&mut self, rd: bool) {
        self.flags.set(HeaderFlags::RD, rd);
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID:{:04X} {:?} {}",
            self.id, self.opcode, self.rcode
        )?;
        if self.is_truncated() {
            write!(f, " TC")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_flags() {
        let mut header = Header::new(0);

        header.set_response(true);
        assert!(header.is_response());
        assert!(!header.is_query());

        header.set_truncated(true);
        assert!(header.is_truncated());
        header.set_truncated(false);
        assert!(!header.is_truncated());
    }

    #[test]
    fn test_response_from_query() {
        let mut query = Header::new(0x1234);
        query.set_recursion_desired(true);

        let response = Header::response_from(&query);
        assert_eq!(response.id, 0x1234);
        assert!(response.is_response());
        assert!(response.recursion_desired());
        assert_eq!(response.rcode, ResponseCode::NoError);
    }
}

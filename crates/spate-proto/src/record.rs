//! DNS resource records.

use crate::class::RecordClass;
use crate::name::Name;
use crate::rtype::RecordType;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Record data, covering the types middleware inspects. Anything else is
/// carried opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RData {
    /// IPv4 address.
    A(Ipv4Addr),

    /// IPv6 address.
    Aaaa(Ipv6Addr),

    /// Delegation to a name server.
    Ns(Name),

    /// Alias to the canonical name.
    Cname(Name),

    /// Free-form text.
    Txt(String),

    /// Uninterpreted record data.
    Opaque(Bytes),
}

/// A DNS resource record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// The owner name of the record.
    pub name: Name,

    /// The record type.
    pub rtype: RecordType,

    /// The record class.
    pub rclass: RecordClass,

    /// Time to live in seconds.
    pub ttl: u32,

    /// The record data.
    pub rdata: RData,
}

impl ResourceRecord {
    /// Creates a new resource record.
    pub fn new(name: Name, rtype: RecordType, rclass: RecordClass, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        }
    }

    /// Creates an A record.
    pub fn a(name: Name, ttl: u32, addr: Ipv4Addr) -> Self {
        Self::new(name, RecordType::A, RecordClass::IN, ttl, RData::A(addr))
    }

    /// Creates an AAAA record.
    pub fn aaaa(name: Name, ttl: u32, addr: Ipv6Addr) -> Self {
        Self::new(
            name,
            RecordType::AAAA,
            RecordClass::IN,
            ttl,
            RData::Aaaa(addr),
        )
    }

    /// Creates an NS record.
    pub fn ns(name: Name, ttl: u32, nameserver: Name) -> Self {
        Self::new(
            name,
            RecordType::NS,
            RecordClass::IN,
            ttl,
            RData::Ns(nameserver),
        )
    }

    /// Creates a CNAME record.
    pub fn cname(name: Name, ttl: u32, target: Name) -> Self {
        Self::new(
            name,
            RecordType::CNAME,
            RecordClass::IN,
            ttl,
            RData::Cname(target),
        )
    }

    /// Creates a record with opaque data of the given type.
    pub fn opaque(name: Name, rtype: RecordType, ttl: u32, data: impl Into<Bytes>) -> Self {
        Self::new(
            name,
            rtype,
            RecordClass::IN,
            ttl,
            RData::Opaque(data.into()),
        )
    }

    /// Returns the record type.
    #[inline]
    pub fn record_type(&self) -> RecordType {
        self.rtype
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.name, self.ttl, self.rclass, self.rtype
        )?;
        match &self.rdata {
            RData::A(addr) => write!(f, " {addr}"),
            RData::Aaaa(addr) => write!(f, " {addr}"),
            RData::Ns(ns) => write!(f, " {ns}"),
            RData::Cname(target) => write!(f, " {target}"),
            RData::Txt(text) => write!(f, " {text:?}"),
            RData::Opaque(data) => write!(f, " \\# {}", data.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_record_constructors() {
        let name = Name::from_str("example.com").unwrap();

        let a = ResourceRecord::a(name.clone(), 300, Ipv4Addr::new(192, 0, 2, 1));
        assert_eq!(a.record_type(), RecordType::A);
        assert_eq!(a.rdata, RData::A(Ipv4Addr::new(192, 0, 2, 1)));

        let ns = ResourceRecord::ns(name.clone(), 300, Name::from_str("ns1.example.com").unwrap());
        assert_eq!(ns.record_type(), RecordType::NS);
        assert_eq!(ns.name, name);
    }

    #[test]
    fn test_record_display() {
        let name = Name::from_str("example.com").unwrap();
        let a = ResourceRecord::a(name, 300, Ipv4Addr::new(192, 0, 2, 1));
        assert_eq!(a.to_string(), "example.com. 300 IN A 192.0.2.1");
    }
}

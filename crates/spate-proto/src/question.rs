//! DNS question section.

use crate::class::RecordClass;
use crate::name::Name;
use crate::rtype::RecordType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A DNS question: the name, type, and class being queried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    /// The domain name being queried.
    pub qname: Name,

    /// The type of record being requested.
    pub qtype: RecordType,

    /// The class of the query (usually IN for Internet).
    pub qclass: RecordClass,
}

impl Question {
    /// Creates a new question.
    #[inline]
    pub fn new(qname: Name, qtype: RecordType, qclass: RecordClass) -> Self {
        Self {
            qname,
            qtype,
            qclass,
        }
    }

    /// Creates a question for an A record lookup.
    #[inline]
    pub fn a(name: Name) -> Self {
        Self::new(name, RecordType::A, RecordClass::IN)
    }

    /// Creates a question for an AAAA record lookup.
    #[inline]
    pub fn aaaa(name: Name) -> Self {
        Self::new(name, RecordType::AAAA, RecordClass::IN)
    }

    /// Creates a question for an NS record lookup.
    #[inline]
    pub fn ns(name: Name) -> Self {
        Self::new(name, RecordType::NS, RecordClass::IN)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.qname, self.qclass, self.qtype)
    }
}

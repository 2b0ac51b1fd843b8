//! # Spate DNS message model
//!
//! A compact, in-memory representation of DNS messages for middleware that
//! inspects and reshapes responses before they reach the wire.
//!
//! The model covers the header (including the TC flag), the question section,
//! and the three resource record sections. There is deliberately no wire
//! codec here: serialization and transport belong to the embedding server,
//! which hands fully-populated messages to middleware such as `spate-rrl`.

pub mod class;
pub mod error;
pub mod header;
pub mod message;
pub mod name;
pub mod question;
pub mod rcode;
pub mod record;
pub mod rtype;

pub use class::RecordClass;
pub use error::{Error, Result};
pub use header::{Header, HeaderFlags, OpCode};
pub use message::Message;
pub use name::Name;
pub use question::Question;
pub use rcode::ResponseCode;
pub use record::{RData, ResourceRecord};
pub use rtype::RecordType;

/// Maximum length of a single label in octets.
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length of a domain name in presentation format, excluding the
/// trailing root dot.
pub const MAX_NAME_LENGTH: usize = 253;

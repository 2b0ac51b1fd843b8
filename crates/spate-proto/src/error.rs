//! Error types for the DNS message model.

use thiserror::Error;

/// Errors produced while building model types from untrusted input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The domain name was empty.
    #[error("empty domain name")]
    EmptyName,

    /// A label within the name was empty (two consecutive dots).
    #[error("empty label in domain name")]
    EmptyLabel,

    /// A label exceeded the 63 octet limit.
    #[error("label exceeds 63 octets: {length}")]
    LabelTooLong {
        /// The offending label length.
        length: usize,
    },

    /// The whole name exceeded the 253 octet limit.
    #[error("domain name exceeds 253 octets: {length}")]
    NameTooLong {
        /// The offending name length.
        length: usize,
    },

    /// A character not valid in a hostname label.
    #[error("invalid character {character:?} in domain name")]
    InvalidCharacter {
        /// The offending character.
        character: char,
    },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, Error>;

//! DNS domain name representation.
//!
//! Names are stored in normalized presentation format: lowercase labels
//! separated by dots, always fully qualified with a trailing root dot.
//! Comparison is therefore a plain string comparison, and the DNS rule of
//! case-insensitive matching falls out of the normalization.

use crate::error::{Error, Result};
use crate::{MAX_LABEL_LENGTH, MAX_NAME_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized, fully-qualified DNS domain name.
///
/// # Example
///
/// ```rust
/// use spate_proto::Name;
/// use std::str::FromStr;
///
/// let name = Name::from_str("WWW.Example.COM").unwrap();
/// assert_eq!(name.as_str(), "www.example.com.");
/// assert_eq!(name.label_count(), 3);
///
/// let zone = Name::from_str("example.com.").unwrap();
/// assert!(name.is_subdomain_of(&zone));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name {
    /// Lowercase presentation form with trailing root dot; `"."` is the root.
    text: Box<str>,
}

impl Name {
    /// Returns the root domain name.
    pub fn root() -> Self {
        Self { text: ".".into() }
    }

    /// Returns the fully-qualified presentation form, including the trailing
    /// root dot. The root name renders as `"."`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the presentation form without the trailing root dot.
    /// The root name renders as the empty string.
    #[inline]
    pub fn trimmed(&self) -> &str {
        self.text.trim_end_matches('.')
    }

    /// Returns true if this is the root domain.
    #[inline]
    pub fn is_root(&self) -> bool {
        &*self.text == "."
    }

    /// Returns an iterator over the labels, leftmost first. The root label
    /// is not yielded.
    pub fn labels(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.text.split('.').filter(|l| !l.is_empty())
    }

    /// Returns the number of labels, excluding the root.
    pub fn label_count(&self) -> usize {
        self.labels().count()
    }

    /// Returns true if this name equals `other` or sits below it in the
    /// DNS tree. Every name is a subdomain of the root.
    pub fn is_subdomain_of(&self, other: &Name) -> bool {
        if other.is_root() {
            return true;
        }
        if self.label_count() < other.label_count() {
            return false;
        }
        self.labels()
            .rev()
            .zip(other.labels().rev())
            .all(|(a, b)| a == b)
    }

    /// Validates a single label.
    fn validate_label(label: &str) -> Result<()> {
        if label.is_empty() {
            return Err(Error::EmptyLabel);
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err(Error::LabelTooLong {
                length: label.len(),
            });
        }
        for c in label.chars() {
            if !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '*') {
                return Err(Error::InvalidCharacter { character: c });
            }
        }
        Ok(())
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::EmptyName);
        }
        if s == "." {
            return Ok(Self::root());
        }

        let trimmed = s.strip_suffix('.').unwrap_or(s);
        if trimmed.len() > MAX_NAME_LENGTH {
            return Err(Error::NameTooLong {
                length: trimmed.len(),
            });
        }

        for label in trimmed.split('.') {
            Self::validate_label(label)?;
        }

        let mut text = trimmed.to_ascii_lowercase();
        text.push('.');
        Ok(Self { text: text.into() })
    }
}

impl TryFrom<String> for Name {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.text.into()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

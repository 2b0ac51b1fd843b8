//! DNS message representation.
//!
//! A message consists of a header, a question section, and the answer,
//! authority, and additional record sections.

use crate::header::Header;
use crate::question::Question;
use crate::rcode::ResponseCode;
use crate::record::ResourceRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete DNS message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// The message header.
    header: Header,
    /// The question section.
    questions: Vec<Question>,
    /// The answer section.
    answers: Vec<ResourceRecord>,
    /// The authority section.
    authority: Vec<ResourceRecord>,
    /// The additional section.
    additional: Vec<ResourceRecord>,
}

impl Message {
    /// Creates a new empty message with the given header.
    pub fn new(header: Header) -> Self {
        Self {
            header,
            questions: Vec::new(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Creates a query message with a single question.
    pub fn query(question: Question) -> Self {
        let mut msg = Self::new(Header::new(0));
        msg.header.set_recursion_desired(true);
        msg.questions.push(question);
        msg
    }

    /// Creates a response message from a query, echoing its question section.
    pub fn response_from(query: &Message) -> Self {
        Self {
            header: Header::response_from(&query.header),
            questions: query.questions.clone(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    // =========================================================================
    // Header accessors
    // =========================================================================

    /// Returns the message header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to the header.
    #[inline]
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the message ID.
    #[inline]
    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Returns the response code.
    #[inline]
    pub fn rcode(&self) -> ResponseCode {
        self.header.rcode
    }

    /// Sets the response code.
    #[inline]
    pub fn set_rcode(&mut self, rcode: ResponseCode) {
        self.header.rcode = rcode;
    }

    // =========================================================================
    // Section accessors
    // =========================================================================

    /// Returns the question section.
    #[inline]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns the first question if present.
    #[inline]
    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Returns the answer section.
    #[inline]
    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answers
    }

    /// Returns the authority section.
    #[inline]
    pub fn authority(&self) -> &[ResourceRecord] {
        &self.authority
    }

    /// Returns the additional section.
    #[inline]
    pub fn additional(&self) -> &[ResourceRecord] {
        &self.additional
    }

    // =========================================================================
    // Section mutators
    // =========================================================================

    /// Adds a question.
    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    /// Adds an answer record.
    pub fn add_answer(&mut self, record: ResourceRecord) {
        self.answers.push(record);
    }

    /// Adds an authority record.
    pub fn add_authority(&mut self, record: ResourceRecord) {
        self.authority.push(record);
    }

    /// Adds an additional record.
    pub fn add_additional(&mut self, record: ResourceRecord) {
        self.additional.push(record);
    }

    /// Clears all answer records.
    pub fn clear_answers(&mut self) {
        self.answers.clear();
    }

    /// Clears all authority records.
    pub fn clear_authority(&mut self) {
        self.authority.clear();
    }

    /// Clears all additional records.
    pub fn clear_additional(&mut self) {
        self.additional.clear();
    }

    // =========================================================================
    // Response helpers
    // =========================================================================

    /// Returns true if this response indicates no data (NOERROR, no answers).
    pub fn is_nodata(&self) -> bool {
        self.rcode().is_success() && self.answers.is_empty()
    }

    /// Returns true if this is an NXDOMAIN response.
    pub fn is_nxdomain(&self) -> bool {
        self.rcode().is_nxdomain()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ";; ->>HEADER<<- {}", self.header)?;

        writeln!(f, ";; QUESTION SECTION:")?;
        for q in &self.questions {
            writeln!(f, ";{q}")?;
        }

        if !self.answers.is_empty() {
            writeln!(f, ";; ANSWER SECTION:")?;
            for r in &self.answers {
                writeln!(f, "{r}")?;
            }
        }

        if !self.authority.is_empty() {
            writeln!(f, ";; AUTHORITY SECTION:")?;
            for r in &self.authority {
                writeln!(f, "{r}")?;
            }
        }

        if !self.additional.is_empty() {
            writeln!(f, ";; ADDITIONAL SECTION:")?;
            for r in &self.additional {
                writeln!(f, "{r}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::Name;
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    #[test]
    fn test_response_creation() {
        let q = Question::a(Name::from_str("example.com").unwrap());
        let mut query = Message::query(q);
        query.header_mut().id = 0x1234;

        let mut response = Message::response_from(&query);
        response.add_answer(ResourceRecord::a(
            Name::from_str("example.com").unwrap(),
            300,
            Ipv4Addr::new(192, 0, 2, 1),
        ));

        assert!(response.header().is_response());
        assert_eq!(response.id(), 0x1234);
        assert_eq!(response.questions(), query.questions());
        assert_eq!(response.answers().len(), 1);
    }

    #[test]
    fn test_response_helpers() {
        let q = Question::a(Name::from_str("example.com").unwrap());
        let mut msg = Message::response_from(&Message::query(q));

        assert!(msg.is_nodata());

        msg.add_answer(ResourceRecord::a(
            Name::from_str("example.com").unwrap(),
            300,
            Ipv4Addr::new(192, 0, 2, 1),
        ));
        assert!(!msg.is_nodata());

        msg.clear_answers();
        msg.set_rcode(ResponseCode::NXDomain);
        assert!(msg.is_nxdomain());
    }

    #[test]
    fn test_clear_sections() {
        let q = Question::a(Name::from_str("example.com").unwrap());
        let mut msg = Message::response_from(&Message::query(q));
        let name = Name::from_str("example.com").unwrap();

        msg.add_answer(ResourceRecord::a(name.clone(), 300, Ipv4Addr::new(192, 0, 2, 1)));
        msg.add_authority(ResourceRecord::ns(
            name.clone(),
            300,
            Name::from_str("ns1.example.com").unwrap(),
        ));
        msg.add_additional(ResourceRecord::a(
            Name::from_str("ns1.example.com").unwrap(),
            300,
            Ipv4Addr::new(192, 0, 2, 2),
        ));

        msg.clear_answers();
        msg.clear_authority();
        msg.clear_additional();

        assert!(msg.answers().is_empty());
        assert!(msg.authority().is_empty());
        assert!(msg.additional().is_empty());
        // The question survives
        assert_eq!(msg.questions().len(), 1);
    }
}

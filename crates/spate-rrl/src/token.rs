//! Accounting token derivation.
//!
//! A token names one equivalence class of responses toward one client
//! prefix: `prefix/category/qtype/name`, where qtype and name are included
//! or left empty depending on the category. Responses sharing a token share
//! one account and therefore one budget.

use crate::classify::Category;
use spate_proto::Message;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Returns the client's address masked to the configured prefix length, in
/// canonical text form. This alone is the token for request-rate limiting.
pub fn client_prefix(addr: IpAddr, ipv4_bits: u8, ipv6_bits: u8) -> String {
    match addr {
        IpAddr::V4(v4) => {
            let mask = if ipv4_bits >= 32 {
                u32::MAX
            } else {
                u32::MAX << (32 - ipv4_bits)
            };
            Ipv4Addr::from(u32::from(v4) & mask).to_string()
        }
        IpAddr::V6(v6) => {
            let mask = if ipv6_bits >= 128 {
                u128::MAX
            } else {
                u128::MAX << (128 - ipv6_bits)
            };
            Ipv6Addr::from(u128::from(v6) & mask).to_string()
        }
    }
}

/// Builds the accounting token for a classified response.
///
/// The name and qtype fields follow the BIND equivalence rules:
///
/// - `Response`: all answers for one (qname, qtype) are identical
/// - `Nodata`: all empty answers for one qname are identical, whatever the
///   query type
/// - `Nxdomain`: all denials beneath one existing domain are identical; the
///   first authority owner names that domain
/// - `Referral`: all delegations to one zone are identical
/// - `Error`: all errors are identical, whatever was asked
pub fn response_token(prefix: &str, category: Category, msg: &Message) -> String {
    let qtype = msg
        .question()
        .map(|q| q.qtype.to_u16().to_string())
        .unwrap_or_default();
    let qname = msg.question().map(|q| q.qname.trimmed()).unwrap_or_default();
    let authority_name = msg
        .authority()
        .first()
        .map(|r| r.name.trimmed())
        .unwrap_or_default();

    match category {
        Category::Response => join(prefix, category, &qtype, qname),
        Category::Nodata => join(prefix, category, "", qname),
        Category::Nxdomain => join(prefix, category, "", authority_name),
        Category::Referral => join(prefix, category, &qtype, authority_name),
        Category::Error => join(prefix, category, "", ""),
    }
}

fn join(prefix: &str, category: Category, qtype: &str, name: &str) -> String {
    format!("{prefix}/{category}/{qtype}/{name}")
}

//! The handler-chain contract between the middleware and its host.
//!
//! The embedding server drives a chain of [`DnsHandler`]s. Each handler
//! receives the query, a [`ResponseWriter`] for the client, and a
//! [`QueryContext`] describing the transport; it either writes a response
//! and returns the rcode it answered with, or returns without writing and
//! lets the server answer (see [`ResponseCode::is_client_writable`]).
//!
//! [`ResponseCode::is_client_writable`]: spate_proto::ResponseCode::is_client_writable

use async_trait::async_trait;
use spate_proto::{Message, ResponseCode};
use std::net::SocketAddr;
use std::time::Instant;
use thiserror::Error;

/// DNS transport protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Plain UDP.
    Udp,
    /// Plain TCP.
    Tcp,
    /// DNS over TLS.
    Dot,
    /// DNS over HTTPS.
    Doh,
    /// DNS over QUIC.
    Doq,
}

impl Protocol {
    /// Returns true for connection-oriented transports. Responses on these
    /// cannot be spoofed toward a victim, so they are never rate-limited.
    pub const fn is_stream(&self) -> bool {
        !matches!(self, Protocol::Udp)
    }

    /// Returns the protocol name.
    pub const fn name(&self) -> &'static str {
        match self {
            Protocol::Udp => "UDP",
            Protocol::Tcp => "TCP",
            Protocol::Dot => "DoT",
            Protocol::Doh => "DoH",
            Protocol::Doq => "DoQ",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Context for a DNS query.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Client address.
    pub client: SocketAddr,

    /// Protocol used.
    pub protocol: Protocol,

    /// When the query was received.
    pub received_at: Instant,
}

impl QueryContext {
    /// Creates a new query context.
    pub fn new(client: SocketAddr, protocol: Protocol) -> Self {
        Self {
            client,
            protocol,
            received_at: Instant::now(),
        }
    }
}

/// Errors flowing up the handler chain.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Failure writing a response toward the client.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The query was discarded because its client prefix exceeded the
    /// request rate. Nothing was written; the server must stay silent.
    #[error("query rate exceeded the limit")]
    RequestRateLimited,

    /// The response was discarded because its token exceeded the response
    /// rate. Nothing was written; the server must stay silent.
    #[error("response rate exceeded the limit")]
    ResponseRateLimited,

    /// A downstream handler failed.
    #[error("handler error: {0}")]
    Handler(String),
}

impl ServeError {
    /// Returns true for the rate-limit markers. These are bookkeeping, not
    /// failures: the server must neither retry nor write an error response,
    /// because silence toward the (possibly spoofed) client is the point.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RequestRateLimited | Self::ResponseRateLimited)
    }

    /// Returns the rcode the server should account this outcome under.
    /// Rate-limited queries count as successes so that no error response is
    /// generated toward the client.
    pub fn rcode(&self) -> ResponseCode {
        if self.is_rate_limited() {
            ResponseCode::NoError
        } else {
            ResponseCode::ServFail
        }
    }
}

/// Result of serving one query: the rcode the handler answered with.
pub type ServeResult = Result<ResponseCode, ServeError>;

/// A sink for response messages.
///
/// The server passes its transmitting implementation down the chain;
/// middleware may substitute an in-memory one to inspect a response before
/// deciding its fate.
#[async_trait]
pub trait ResponseWriter: Send {
    /// Returns the address the response is destined for.
    fn remote_addr(&self) -> SocketAddr;

    /// Writes a response message toward the client.
    async fn write_msg(&mut self, msg: &Message) -> std::io::Result<()>;
}

/// A handler in the server's query-processing chain.
#[async_trait]
pub trait DnsHandler: Send + Sync {
    /// Serves one query, writing any response through `writer`.
    async fn serve(
        &self,
        ctx: &QueryContext,
        writer: &mut dyn ResponseWriter,
        query: &Message,
    ) -> ServeResult;
}

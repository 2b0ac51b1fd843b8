//! Capturing response sink.

use crate::plugin::ResponseWriter;
use async_trait::async_trait;
use spate_proto::Message;
use std::net::SocketAddr;

/// A [`ResponseWriter`] that records the response in memory instead of
/// transmitting it, so the middleware can classify and account a response
/// before deciding whether the client sees it.
#[derive(Debug)]
pub struct CaptureWriter {
    remote: SocketAddr,
    msg: Option<Message>,
}

impl CaptureWriter {
    /// Creates a capturing writer for the given client address.
    pub fn new(remote: SocketAddr) -> Self {
        Self { remote, msg: None }
    }

    /// Returns the captured response, if one was written.
    pub fn message(&self) -> Option<&Message> {
        self.msg.as_ref()
    }

    /// Consumes the writer, yielding the captured response.
    pub fn into_message(self) -> Option<Message> {
        self.msg
    }
}

#[async_trait]
impl ResponseWriter for CaptureWriter {
    fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    async fn write_msg(&mut self, msg: &Message) -> std::io::Result<()> {
        self.msg = Some(msg.clone());
        Ok(())
    }
}

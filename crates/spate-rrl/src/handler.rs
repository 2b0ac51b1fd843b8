//! The per-query flow of the middleware.

use crate::capture::CaptureWriter;
use crate::classify::classify;
use crate::metrics;
use crate::plugin::{DnsHandler, QueryContext, ResponseWriter, ServeError, ServeResult};
use crate::rrl::Rrl;
use crate::{token, zone};
use async_trait::async_trait;
use spate_proto::Message;
use tracing::{debug, warn};

#[async_trait]
impl DnsHandler for Rrl {
    async fn serve(
        &self,
        ctx: &QueryContext,
        writer: &mut dyn ResponseWriter,
        query: &Message,
    ) -> ServeResult {
        // Only queries under the configured zones are limited.
        let in_zone = query
            .question()
            .is_some_and(|q| zone::matches(&self.zones, &q.qname).is_some());
        if !in_zone {
            return self.next.serve(ctx, writer, query).await;
        }

        // Request-rate limiting charges the client prefix alone, before any
        // work is done on the query. A flood need not share qnames.
        if self.intervals.requests != 0 {
            let prefix = self.client_prefix(ctx.client.ip());
            match self.debit(self.intervals.requests, &prefix) {
                Ok(debit) if debit.balance < 0 => {
                    debug!(
                        client_ip = %ctx.client.ip(),
                        token = %prefix,
                        balance = debit.balance as f64 / self.intervals.requests as f64,
                        "request rate exceeded"
                    );
                    metrics::requests_exceeded(&prefix);
                    if !self.report_only {
                        return Err(ServeError::RequestRateLimited);
                    }
                }
                Ok(_) => {}
                Err(err) => warn!(%err, "request debit failed, allowing query"),
            }
        }

        // Responses over connection-oriented transports cannot be reflected
        // at a spoofed victim; pass them through untouched.
        if ctx.protocol.is_stream() {
            return self.next.serve(ctx, writer, query).await;
        }

        // Resolve into a capturing sink so the response can be examined
        // before anything reaches the wire.
        let mut capture = CaptureWriter::new(ctx.client);
        let rcode = self.next.serve(ctx, &mut capture, query).await?;
        if !rcode.is_client_writable() {
            return Ok(rcode);
        }
        let Some(mut msg) = capture.into_message() else {
            return Ok(rcode);
        };

        let category = classify(&msg);
        let interval = self.allowance(category);
        if interval == 0 {
            writer.write_msg(&msg).await?;
            return Ok(rcode);
        }

        let prefix = self.client_prefix(ctx.client.ip());
        let response_token = token::response_token(&prefix, category, &msg);
        match self.debit(interval, &response_token) {
            Ok(debit) if debit.balance < 0 => {
                debug!(
                    client_ip = %ctx.client.ip(),
                    rcode = %msg.rcode(),
                    token = %response_token,
                    balance = debit.balance as f64 / interval as f64,
                    "response rate exceeded"
                );
                metrics::responses_exceeded(&prefix);
                if !self.report_only {
                    if !debit.slip {
                        return Err(ServeError::ResponseRateLimited);
                    }
                    // Slip: answer with just the truncated header so a real
                    // client retries over TCP while a reflector gains
                    // nothing.
                    msg.clear_answers();
                    msg.clear_authority();
                    msg.clear_additional();
                    msg.header_mut().set_truncated(true);
                }
            }
            Ok(_) => {}
            Err(err) => warn!(%err, "response debit failed, allowing response"),
        }

        writer.write_msg(&msg).await?;
        Ok(rcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RrlConfig;
    use crate::plugin::Protocol;
    use spate_proto::{Name, Question, ResourceRecord, ResponseCode};
    use std::net::{Ipv4Addr, SocketAddr};
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Downstream handler answering every query with a fixed A record.
    struct FixedAnswer {
        calls: AtomicUsize,
    }

    impl FixedAnswer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DnsHandler for FixedAnswer {
        async fn serve(
            &self,
            _ctx: &QueryContext,
            writer: &mut dyn ResponseWriter,
            query: &Message,
        ) -> ServeResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut response = Message::response_from(query);
            response.add_answer(ResourceRecord::a(
                Name::from_str("example.com").unwrap(),
                5,
                Ipv4Addr::new(1, 2, 3, 4),
            ));
            writer.write_msg(&response).await?;
            Ok(ResponseCode::NoError)
        }
    }

    /// Downstream handler that refuses without writing anything.
    struct Refuser;

    #[async_trait]
    impl DnsHandler for Refuser {
        async fn serve(
            &self,
            _ctx: &QueryContext,
            _writer: &mut dyn ResponseWriter,
            _query: &Message,
        ) -> ServeResult {
            Ok(ResponseCode::Refused)
        }
    }

    fn client() -> SocketAddr {
        "1.2.3.4:1234".parse().unwrap()
    }

    fn query() -> Message {
        Message::query(Question::a(Name::from_str("example.com").unwrap()))
    }

    fn one_per_second() -> RrlConfig {
        RrlConfig {
            zones: vec!["example.com.".to_string()],
            window: 2.0,
            responses_per_second: 1.0,
            ..Default::default()
        }
    }

    async fn run(rrl: &Rrl, protocol: Protocol) -> (ServeResult, Option<Message>) {
        let ctx = QueryContext::new(client(), protocol);
        let mut writer = CaptureWriter::new(client());
        let result = rrl.serve(&ctx, &mut writer, &query()).await;
        (result, writer.into_message())
    }

    #[tokio::test]
    async fn test_steady_state_drop() {
        let rrl = Rrl::new(one_per_second(), FixedAnswer::new()).unwrap();

        // First response goes out; the next two rapid duplicates do not.
        let (result, written) = run(&rrl, Protocol::Udp).await;
        assert_eq!(result.unwrap(), ResponseCode::NoError);
        assert!(written.is_some());

        for _ in 0..2 {
            let (result, written) = run(&rrl, Protocol::Udp).await;
            let err = result.unwrap_err();
            assert!(matches!(err, ServeError::ResponseRateLimited));
            assert_eq!(err.rcode(), ResponseCode::NoError);
            assert!(written.is_none());
        }
    }

    #[tokio::test]
    async fn test_tcp_bypass() {
        let next = FixedAnswer::new();
        let rrl = Rrl::new(one_per_second(), next.clone()).unwrap();

        for _ in 0..3 {
            let (result, written) = run(&rrl, Protocol::Tcp).await;
            assert_eq!(result.unwrap(), ResponseCode::NoError);
            assert!(written.is_some());
        }
        assert_eq!(next.calls.load(Ordering::SeqCst), 3);
        // TCP never touches the table.
        assert_eq!(rrl.account_count(), 0);
    }

    #[tokio::test]
    async fn test_foreign_zone_passes_through() {
        let config = RrlConfig {
            zones: vec!["not.example.com.".to_string()],
            ..one_per_second()
        };
        let rrl = Rrl::new(config, FixedAnswer::new()).unwrap();

        for _ in 0..3 {
            let (result, written) = run(&rrl, Protocol::Udp).await;
            assert_eq!(result.unwrap(), ResponseCode::NoError);
            assert!(written.is_some());
        }
        assert_eq!(rrl.account_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_allowance_disables_limiting() {
        let config = RrlConfig {
            responses_per_second: 0.0,
            ..one_per_second()
        };
        let rrl = Rrl::new(config, FixedAnswer::new()).unwrap();

        for _ in 0..3 {
            let (result, written) = run(&rrl, Protocol::Udp).await;
            assert_eq!(result.unwrap(), ResponseCode::NoError);
            assert!(written.is_some());
        }
    }

    #[tokio::test]
    async fn test_slip_sends_truncated_header() {
        let config = RrlConfig {
            slip: 2,
            ..one_per_second()
        };
        let rrl = Rrl::new(config, FixedAnswer::new()).unwrap();

        // Prime the account with the one admitted response.
        let (result, _) = run(&rrl, Protocol::Udp).await;
        result.unwrap();

        let mut slipped = 0;
        let mut dropped = 0;
        for _ in 0..10 {
            let (result, written) = run(&rrl, Protocol::Udp).await;
            match result {
                Ok(_) => {
                    let msg = written.expect("slipped response must be written");
                    assert!(msg.header().is_truncated());
                    assert!(msg.answers().is_empty());
                    assert!(msg.authority().is_empty());
                    assert!(msg.additional().is_empty());
                    slipped += 1;
                }
                Err(err) => {
                    assert!(matches!(err, ServeError::ResponseRateLimited));
                    assert!(written.is_none());
                    dropped += 1;
                }
            }
        }
        assert_eq!(slipped, 5);
        assert_eq!(dropped, 5);
    }

    #[tokio::test]
    async fn test_report_only_always_transmits() {
        let config = RrlConfig {
            report_only: true,
            ..one_per_second()
        };
        let rrl = Rrl::new(config, FixedAnswer::new()).unwrap();

        for _ in 0..5 {
            let (result, written) = run(&rrl, Protocol::Udp).await;
            assert_eq!(result.unwrap(), ResponseCode::NoError);
            let msg = written.expect("report-only must still transmit");
            assert!(!msg.header().is_truncated());
            assert_eq!(msg.answers().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_request_limit_drops_before_downstream() {
        let next = FixedAnswer::new();
        let config = RrlConfig {
            requests_per_second: 1.0,
            responses_per_second: 0.0,
            ..one_per_second()
        };
        let rrl = Rrl::new(config, next.clone()).unwrap();

        let (result, written) = run(&rrl, Protocol::Udp).await;
        assert_eq!(result.unwrap(), ResponseCode::NoError);
        assert!(written.is_some());

        let (result, written) = run(&rrl, Protocol::Udp).await;
        let err = result.unwrap_err();
        assert!(matches!(err, ServeError::RequestRateLimited));
        assert_eq!(err.rcode(), ResponseCode::NoError);
        assert!(written.is_none());

        // The second query never reached the resolver.
        assert_eq!(next.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_limit_applies_to_tcp_queries_too() {
        // The request debit runs before the transport check; only response
        // limiting is UDP-only.
        let config = RrlConfig {
            requests_per_second: 1.0,
            responses_per_second: 0.0,
            ..one_per_second()
        };
        let rrl = Rrl::new(config, FixedAnswer::new()).unwrap();

        let (result, _) = run(&rrl, Protocol::Tcp).await;
        result.unwrap();
        let (result, _) = run(&rrl, Protocol::Tcp).await;
        assert!(matches!(
            result.unwrap_err(),
            ServeError::RequestRateLimited
        ));
    }

    #[tokio::test]
    async fn test_non_client_writable_rcode_passes_upward() {
        let rrl = Rrl::new(one_per_second(), Arc::new(Refuser)).unwrap();

        for _ in 0..3 {
            let (result, written) = run(&rrl, Protocol::Udp).await;
            assert_eq!(result.unwrap(), ResponseCode::Refused);
            assert!(written.is_none());
        }
        // Nothing was classified or debited.
        assert_eq!(rrl.account_count(), 0);
    }

    async fn serve_from(rrl: &Rrl, addr: &str) -> ServeResult {
        let ctx = QueryContext::new(addr.parse().unwrap(), Protocol::Udp);
        let mut writer = CaptureWriter::new(ctx.client);
        rrl.serve(&ctx, &mut writer, &query()).await
    }

    #[tokio::test]
    async fn test_clients_in_one_prefix_share_an_account() {
        let rrl = Rrl::new(one_per_second(), FixedAnswer::new()).unwrap();

        serve_from(&rrl, "1.2.3.4:1000").await.unwrap();
        // A neighbour in the same /24 is over the shared limit...
        assert!(serve_from(&rrl, "1.2.3.5:1000").await.is_err());
        // ...while a client in another /24 is untouched.
        serve_from(&rrl, "1.2.4.4:1000").await.unwrap();
    }
}

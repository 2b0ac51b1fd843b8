//! Debit hot-path benchmarks.

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use spate_proto::{Message, ResponseCode};
use spate_rrl::{DnsHandler, QueryContext, ResponseWriter, Rrl, RrlConfig, ServeResult};
use std::sync::Arc;

struct NoopHandler;

#[async_trait]
impl DnsHandler for NoopHandler {
    async fn serve(
        &self,
        _ctx: &QueryContext,
        _writer: &mut dyn ResponseWriter,
        _query: &Message,
    ) -> ServeResult {
        Ok(ResponseCode::NoError)
    }
}

fn limiter() -> Rrl {
    let config = RrlConfig {
        responses_per_second: 10.0,
        ..Default::default()
    };
    Rrl::new(config, Arc::new(NoopHandler)).unwrap()
}

fn debit_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("debit");
    group.throughput(Throughput::Elements(1));

    group.bench_function("single_token", |b| {
        let rrl = limiter();
        let interval = 100_000_000;
        b.iter(|| rrl.debit(black_box(interval), black_box("1.2.3.0/0/1/example.com")));
    });

    group.bench_function("many_tokens", |b| {
        let rrl = limiter();
        let interval = 100_000_000;
        let tokens: Vec<String> = (0..1024)
            .map(|i| format!("1.2.{}.0/0/1/host{i}.example.com", i % 256))
            .collect();
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % tokens.len();
            rrl.debit(black_box(interval), black_box(&tokens[i]))
        });
    });

    group.finish();
}

criterion_group!(benches, debit_benchmarks);
criterion_main!(benches);

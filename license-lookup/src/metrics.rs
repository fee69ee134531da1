// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics (C9): request timing, panic recovery, and cache
//! hit/miss counters, served over a plain HTTP `/metrics` endpoint
//! separate from the gRPC listener.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Buckets, in seconds, binding per the external interface contract.
const DURATION_BUCKETS: &[f64] = &[
    0.001, 0.01, 0.1, 0.3, 0.6, 1.0, 3.0, 6.0, 9.0, 20.0, 30.0, 60.0, 90.0, 120.0,
];

pub struct Metrics {
    registry: Registry,
    request_duration: HistogramVec,
    panics_recovered: prometheus::IntCounter,
    cache_result: IntCounterVec,
}

impl Metrics {
    pub fn new(registry: Registry) -> prometheus::Result<Self> {
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "grpc_req_duration_seconds",
                "gRPC unary request duration in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["method"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let panics_recovered = prometheus::IntCounter::new(
            "grpc_req_panics_recovered_total",
            "gRPC handler panics caught by the recovery interceptor",
        )?;
        registry.register(Box::new(panics_recovered.clone()))?;

        let cache_result = IntCounterVec::new(
            Opts::new(
                "lookup_cache_result_total",
                "Lookup service cache probe outcomes",
            ),
            &["result"],
        )?;
        registry.register(Box::new(cache_result.clone()))?;

        Ok(Metrics {
            registry,
            request_duration,
            panics_recovered,
            cache_result,
        })
    }

    pub fn observe_request_duration(&self, method: &str, seconds: f64) {
        self.request_duration
            .with_label_values(&[method])
            .observe(seconds);
    }

    pub fn record_panic_recovered(&self) {
        self.panics_recovered.inc();
    }

    pub fn record_cache_result(&self, hit: bool) {
        let label = if hit { "hit" } else { "miss" };
        self.cache_result.with_label_values(&[label]).inc();
    }

    fn render(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        encoder.encode(&families, &mut buffer).expect("prometheus text encoding cannot fail");
        buffer
    }
}

/// Serve `/metrics` on its own listener until the process shuts down.
/// Deliberately minimal: no routing framework, since there is exactly
/// one route.
pub async fn serve(metrics: Arc<Metrics>, addr: SocketAddr) -> std::io::Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "metrics endpoint listening");

    loop {
        let (mut stream, _) = listener.accept().await?;
        let metrics = metrics.clone();
        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            // We don't parse the request; any connection gets the current
            // snapshot. This is a metrics scrape endpoint, not a general
            // HTTP server.
            let _ = stream.read(&mut buf).await;

            let body = metrics.render();
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain; version=0.0.4\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(header.as_bytes()).await;
            let _ = stream.write_all(&body).await;
            let _: Result<(), Infallible> = Ok(());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_without_panicking_metric_name_collisions() {
        let metrics = Metrics::new(Registry::new()).unwrap();
        metrics.observe_request_duration("GetPackageInfo", 0.05);
        metrics.record_panic_recovered();
        metrics.record_cache_result(true);
        metrics.record_cache_result(false);

        let rendered = String::from_utf8(metrics.render()).unwrap();
        assert!(rendered.contains("grpc_req_duration_seconds"));
        assert!(rendered.contains("grpc_req_panics_recovered_total 1"));
        assert!(rendered.contains("lookup_cache_result_total"));
    }
}

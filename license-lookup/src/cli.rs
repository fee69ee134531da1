// SPDX-License-Identifier: Apache-2.0

//! Command-line arguments for the `license-lookup` binary.

use std::path::PathBuf;

/// A unified license-lookup gRPC service for PyPI, npm, Maven Central,
/// crates.io, and Go module proxy packages.
#[derive(Debug, clap::Parser)]
#[command(about, long_about = None, version)]
pub struct Args {
    /// Address the gRPC server binds to.
    #[arg(long, default_value = "0.0.0.0:50051", env = "LICENSE_LOOKUP_BIND")]
    pub bind: String,

    /// Address the Prometheus `/metrics` endpoint binds to.
    #[arg(long, default_value = "0.0.0.0:9090", env = "LICENSE_LOOKUP_METRICS_BIND")]
    pub metrics_bind: String,

    /// Disable the metrics listener entirely.
    #[arg(long, env = "LICENSE_LOOKUP_DISABLE_METRICS")]
    pub disable_metrics: bool,

    /// Database connection string; `postgres://...` in production,
    /// `:memory:` or a `sqlite://` path for local development.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum number of pooled database connections.
    #[arg(long, default_value_t = 10, env = "LICENSE_LOOKUP_DB_POOL_SIZE")]
    pub db_pool_size: u32,

    /// TLS certificate (PEM). Requires `--tls-key`. Cleartext if omitted.
    #[arg(long, requires = "tls_key", env = "LICENSE_LOOKUP_TLS_CERT")]
    pub tls_cert: Option<PathBuf>,

    /// TLS private key (PEM). Requires `--tls-cert`.
    #[arg(long, requires = "tls_cert", env = "LICENSE_LOOKUP_TLS_KEY")]
    pub tls_key: Option<PathBuf>,

    /// `User-Agent` header sent with every upstream request.
    #[arg(
        long,
        default_value = concat!("license-lookup/", env!("CARGO_PKG_VERSION")),
        env = "LICENSE_LOOKUP_HTTP_UA"
    )]
    pub http_ua: String,

    /// Maximum bytes buffered from a single upstream HTTP response.
    #[arg(long, default_value_t = 20 * 1024 * 1024, env = "LICENSE_LOOKUP_HTTP_BODY_CAP_BYTES")]
    pub http_body_cap_bytes: usize,

    /// Directory used for the Go adapter's zipball downloads and
    /// extraction trees.
    #[arg(long, env = "LICENSE_LOOKUP_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// `tracing-subscriber` env-filter directive, e.g. `info` or
    /// `license_lookup=debug,tower=warn`.
    #[arg(long, default_value = "info", env = "LICENSE_LOOKUP_LOG_LEVEL")]
    pub log_level: String,

    /// Emit logs as newline-delimited JSON instead of human-readable text.
    #[arg(long, env = "LICENSE_LOOKUP_LOG_JSON")]
    pub log_json: bool,
}

// SPDX-License-Identifier: Apache-2.0

mod cli;
mod config;
mod datastore;
mod distributor;
mod error;
mod http;
mod metrics;
mod model;
mod rpc;
mod service;
mod spdx;

use std::sync::Arc;

use clap::Parser;
use rustls::crypto::ring;
use rustls::crypto::CryptoProvider;
use tonic::transport::Server;

use crate::cli::Args;
use crate::config::Config;
use crate::datastore::Datastore;
use crate::distributor::Registry;
use crate::error::AppResult;
use crate::http::QueryClient;
use crate::metrics::Metrics;
use crate::rpc::LicenseLookupSvc;
use crate::service::LookupService;
use crate::spdx::SpdxTable;

fn init_tracing(config: &Config) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Rustls needs a process-wide default crypto provider installed before
    // the first TLS connection (outbound via reqwest, or inbound if TLS is
    // configured for the gRPC listener).
    CryptoProvider::install_default(ring::default_provider())
        .expect("installed process-wide default crypto provider");

    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_args(args)?;
    init_tracing(&config);

    tracing::info!(bind = %config.bind, "starting license-lookup");

    let datastore = Arc::new(Datastore::connect(&config.database_url, config.db_pool_size)?);

    let spdx = SpdxTable::global();

    let query_client = QueryClient::new(config.http.clone())
        .map_err(|e| error::Error::Config(format!("failed to build HTTP client: {e}")))?;
    let registry = Arc::new(Registry::new(
        query_client,
        config.base_urls.clone(),
        config.temp_dir.clone(),
    ));

    let metrics_registry = prometheus::Registry::new();
    let metrics = Arc::new(
        Metrics::new(metrics_registry)
            .map_err(|e| error::Error::Config(format!("failed to register metrics: {e}")))?,
    );

    if let Some(metrics_bind) = config.metrics_bind {
        let metrics_for_task = metrics.clone();
        tokio::spawn(async move {
            if let Err(e) = metrics::serve(metrics_for_task, metrics_bind).await {
                tracing::error!(error = %e, "metrics endpoint stopped");
            }
        });
    }

    let lookup_service = Arc::new(LookupService::new(
        datastore,
        registry,
        spdx,
        metrics.clone(),
    ));

    let grpc_service = rpc::into_server(LicenseLookupSvc::new(lookup_service, metrics));

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_service_status("", tonic_health::ServingStatus::Serving)
        .await;

    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(license_lookup_proto::FILE_DESCRIPTOR_SET)
        .build_v1()
        .map_err(|e| error::Error::Config(format!("failed to build reflection service: {e}")))?;

    let mut server_builder = Server::builder();

    if let Some(tls) = &config.tls {
        let cert = tokio::fs::read(&tls.cert_path)
            .await
            .map_err(|e| error::Error::Config(format!("reading TLS cert: {e}")))?;
        let key = tokio::fs::read(&tls.key_path)
            .await
            .map_err(|e| error::Error::Config(format!("reading TLS key: {e}")))?;
        let identity = tonic::transport::Identity::from_pem(cert, key);
        server_builder = server_builder
            .tls_config(tonic::transport::ServerTlsConfig::new().identity(identity))
            .map_err(|e| error::Error::Config(format!("configuring TLS: {e}")))?;
    }

    server_builder
        .add_service(health_service)
        .add_service(reflection_service)
        .add_service(grpc_service)
        .serve_with_shutdown(config.bind, shutdown_signal())
        .await
        .map_err(|e| error::Error::Bind(config.bind, std::io::Error::other(e)))?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

// SPDX-License-Identifier: Apache-2.0

//! Process-wide configuration (C8), assembled once at startup from
//! `cli::Args` into an explicit, immutable structure. No functional
//! options, no runtime reconfiguration — everything here is fixed for
//! the lifetime of the process.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Args;
use crate::distributor::BaseUrls;
use crate::error::{AppResult, Error};
use crate::http::QueryClientConfig;

#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub metrics_bind: Option<SocketAddr>,
    pub database_url: String,
    pub db_pool_size: u32,
    pub tls: Option<TlsConfig>,
    pub http: QueryClientConfig,
    pub base_urls: BaseUrls,
    pub temp_dir: PathBuf,
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    pub fn from_args(args: Args) -> AppResult<Self> {
        let bind = args
            .bind
            .parse()
            .map_err(|e| Error::Config(format!("invalid --bind address {:?}: {e}", args.bind)))?;

        let metrics_bind = if args.disable_metrics {
            None
        } else {
            Some(args.metrics_bind.parse().map_err(|e| {
                Error::Config(format!(
                    "invalid --metrics-bind address {:?}: {e}",
                    args.metrics_bind
                ))
            })?)
        };

        let tls = match (args.tls_cert, args.tls_key) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig { cert_path, key_path }),
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "--tls-cert and --tls-key must be set together".to_owned(),
                ))
            }
        };

        if args.database_url.trim().is_empty() {
            return Err(Error::Config("--database-url must not be empty".to_owned()));
        }

        let temp_dir = args.temp_dir.unwrap_or_else(std::env::temp_dir);

        Ok(Config {
            bind,
            metrics_bind,
            database_url: args.database_url,
            db_pool_size: args.db_pool_size,
            tls,
            http: QueryClientConfig {
                user_agent: args.http_ua,
                body_cap_bytes: args.http_body_cap_bytes,
                timeout: Duration::from_secs(30),
            },
            base_urls: BaseUrls::default(),
            temp_dir,
            log_level: args.log_level,
            log_json: args.log_json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            bind: "127.0.0.1:50051".to_owned(),
            metrics_bind: "127.0.0.1:9090".to_owned(),
            disable_metrics: false,
            database_url: ":memory:".to_owned(),
            db_pool_size: 10,
            tls_cert: None,
            tls_key: None,
            http_ua: "test-agent".to_owned(),
            http_body_cap_bytes: 1024,
            temp_dir: None,
            log_level: "info".to_owned(),
            log_json: false,
        }
    }

    #[test]
    fn rejects_mismatched_tls_flags() {
        let mut args = base_args();
        args.tls_cert = Some(PathBuf::from("/tmp/cert.pem"));
        let err = Config::from_args(args).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn disable_metrics_clears_the_bind_address() {
        let mut args = base_args();
        args.disable_metrics = true;
        let config = Config::from_args(args).unwrap();
        assert!(config.metrics_bind.is_none());
    }

    #[test]
    fn rejects_empty_database_url() {
        let mut args = base_args();
        args.database_url = String::new();
        let err = Config::from_args(args).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

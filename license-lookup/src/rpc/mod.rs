// SPDX-License-Identifier: Apache-2.0

//! RPC Framing (C7): the one-method gRPC service plus health, reflection,
//! and the unary interceptor chain (metrics timing, structured request
//! logging, error mapping, panic recovery).
//!
//! Each RPC's handler body runs inside `tokio::spawn` so a panic surfaces
//! as a `JoinError` instead of tearing down the server; that's the panic
//! recovery step. Timing and logging wrap the same spawn, and any
//! non-gRPC-shaped error is logged server-side and replaced with a
//! generic `Internal` before it reaches the wire.

use std::sync::Arc;
use std::time::Instant;

use license_lookup_proto::proto::license_lookup_server::{LicenseLookup, LicenseLookupServer};
use license_lookup_proto::proto::{DistributionPoint, GetPackageInfoRequest, GetPackageInfoResponse};
use tonic::{Request, Response, Status};

use crate::metrics::Metrics;
use crate::model::Entry;
use crate::service::{LookupService, ServiceError};

const METHOD_NAME: &str = "GetPackageInfo";

pub struct LicenseLookupSvc {
    service: Arc<LookupService>,
    metrics: Arc<Metrics>,
}

impl LicenseLookupSvc {
    pub fn new(service: Arc<LookupService>, metrics: Arc<Metrics>) -> Self {
        LicenseLookupSvc { service, metrics }
    }
}

fn to_response(entry: Entry) -> GetPackageInfoResponse {
    GetPackageInfoResponse {
        name: entry.name,
        version: entry.version,
        license: entry.license,
        distribution_points: entry
            .distribution_points
            .into_iter()
            .map(|dp| DistributionPoint {
                name: dp.name,
                url: dp.url,
                distributor: dp.distributor.tag().to_owned(),
            })
            .collect(),
    }
}

fn to_status(err: ServiceError) -> Status {
    match err {
        ServiceError::InvalidDistributor(tag) => {
            Status::invalid_argument(format!("unknown distributor {tag:?}"))
        }
        ServiceError::Upstream(cause) => {
            tracing::error!(error = %cause, "distributor adapter failed");
            Status::internal("lookup failed")
        }
    }
}

#[tonic::async_trait]
impl LicenseLookup for LicenseLookupSvc {
    async fn get_package_info(
        &self,
        request: Request<GetPackageInfoRequest>,
    ) -> Result<Response<GetPackageInfoResponse>, Status> {
        let started = Instant::now();
        let req = request.into_inner();
        let service = self.service.clone();

        tracing::info!(
            name = %req.name,
            version = %req.version,
            distributor = %req.distributor,
            "handling {}",
            METHOD_NAME
        );

        let handler = tokio::spawn(async move {
            service
                .get_package_info(&req.name, &req.version, &req.distributor)
                .await
        });

        let outcome = handler.await;
        self.metrics
            .observe_request_duration(METHOD_NAME, started.elapsed().as_secs_f64());

        match outcome {
            Ok(Ok(entry)) => Ok(Response::new(to_response(entry))),
            Ok(Err(service_err)) => Err(to_status(service_err)),
            Err(join_err) if join_err.is_panic() => {
                self.metrics.record_panic_recovered();
                tracing::error!(error = %join_err, "panic recovered in {}", METHOD_NAME);
                Err(Status::internal("internal error"))
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "request task failed to complete");
                Err(Status::internal("internal error"))
            }
        }
    }
}

pub fn into_server(svc: LicenseLookupSvc) -> LicenseLookupServer<LicenseLookupSvc> {
    LicenseLookupServer::new(svc)
}

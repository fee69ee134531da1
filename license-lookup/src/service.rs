// SPDX-License-Identifier: Apache-2.0

//! The Lookup Service (C6): cache probe, adapter dispatch, license
//! normalization, cache fill.

use std::sync::Arc;

use crate::datastore::Datastore;
use crate::distributor::Registry;
use crate::error::Error as DatastoreError;
use crate::metrics::Metrics;
use crate::model::{Distributor, Entry, LookupKey};
use crate::spdx::{normalize_id, SpdxTable};

/// Errors the service surfaces to the RPC layer; deliberately coarse —
/// `rpc::mod` maps every variant but `InvalidDistributor` to `Internal`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("unknown distributor {0:?}")]
    InvalidDistributor(String),

    #[error("upstream lookup failed")]
    Upstream(#[source] crate::error::DistributorError),
}

pub struct LookupService {
    datastore: Arc<Datastore>,
    registry: Arc<Registry>,
    spdx: &'static SpdxTable,
    metrics: Arc<Metrics>,
}

impl LookupService {
    pub fn new(
        datastore: Arc<Datastore>,
        registry: Arc<Registry>,
        spdx: &'static SpdxTable,
        metrics: Arc<Metrics>,
    ) -> Self {
        LookupService {
            datastore,
            registry,
            spdx,
            metrics,
        }
    }

    /// `getPackageInfo`: cache probe → adapter dispatch → normalize →
    /// best-effort cache fill.
    pub async fn get_package_info(
        &self,
        name: &str,
        version: &str,
        distributor_tag: &str,
    ) -> Result<Entry, ServiceError> {
        let distributor = Distributor::from_tag(distributor_tag)
            .ok_or_else(|| ServiceError::InvalidDistributor(distributor_tag.to_owned()))?;

        // The cache key is the requested triple, unresolved version
        // included — see `spec.md` §9 on cache keying.
        let key = LookupKey {
            name: name.to_owned(),
            version: version.to_owned(),
            distributor,
        };

        if let Some(entry) = self.probe_cache(&key).await {
            self.metrics.record_cache_result(true);
            return Ok(entry);
        }
        self.metrics.record_cache_result(false);

        let adapter = self.registry.get(key.distributor);
        let mut entry = if key.version.is_empty() {
            adapter.get_package(&key.name).await
        } else {
            adapter.get_package_version(&key.name, &key.version).await
        }
        .map_err(ServiceError::Upstream)?;

        entry.license = normalize_id(self.spdx, &entry.license);

        self.best_effort_save(&entry);

        Ok(entry)
    }

    async fn probe_cache(&self, key: &LookupKey) -> Option<Entry> {
        let datastore = self.datastore.clone();
        let key = key.clone();

        let result = tokio::task::spawn_blocking(move || {
            datastore.retrieve(&key.name, &key.version, key.distributor)
        })
        .await;

        match result {
            Ok(Ok(entry)) => Some(entry),
            Ok(Err(DatastoreError::ObjectNotFound { .. })) => None,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "datastore retrieve failed; treating as cache miss");
                None
            }
            Err(join_err) => {
                tracing::warn!(error = %join_err, "datastore retrieve task panicked");
                None
            }
        }
    }

    fn best_effort_save(&self, entry: &Entry) {
        let datastore = self.datastore.clone();
        let entry = entry.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || datastore.save(&entry)).await;
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "failed to persist lookup result"),
                Err(join_err) => tracing::warn!(error = %join_err, "datastore save task panicked"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributor::BaseUrls;
    use crate::http::{QueryClient, QueryClientConfig};

    fn make_service() -> LookupService {
        let datastore = Arc::new(Datastore::connect_sqlite_in_memory().unwrap());
        let client = QueryClient::new(QueryClientConfig::default()).unwrap();
        let registry = Arc::new(Registry::new(
            client,
            BaseUrls::default(),
            std::env::temp_dir(),
        ));
        let metrics = Arc::new(Metrics::new(prometheus::Registry::new()).unwrap());
        LookupService::new(datastore, registry, SpdxTable::global(), metrics)
    }

    #[tokio::test]
    async fn unknown_distributor_is_rejected() {
        let service = make_service();
        let err = service
            .get_package_info("foo", "", "not-a-real-distributor")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidDistributor(_)));
    }

    #[tokio::test]
    async fn cache_hit_short_circuits_without_calling_adapter() {
        let service = make_service();
        let entry = Entry {
            name: "requests".to_owned(),
            version: "2.32.3".to_owned(),
            license: "Apache-2.0".to_owned(),
            distribution_points: vec![crate::model::DistributionPoint {
                name: "requests".to_owned(),
                url: "https://pypi.org/project/requests/".to_owned(),
                distributor: Distributor::Pypi,
            }],
        };
        service.datastore.save(&entry).unwrap();

        let fetched = service
            .get_package_info("requests", "2.32.3", "pypi")
            .await
            .unwrap();
        assert_eq!(fetched, entry);
    }
}

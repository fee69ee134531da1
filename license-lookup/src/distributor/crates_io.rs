// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use serde::Deserialize;

use super::Distributor;
use crate::error::{DistributorError, Result};
use crate::http::QueryClient;
use crate::model::{DistributionPoint, Entry, UNKNOWN_LICENSE};

const TAG: &str = "crates.io";

pub struct CratesIo {
    client: QueryClient,
    base: String,
}

impl CratesIo {
    pub fn new(client: QueryClient, base: String) -> Self {
        CratesIo { client, base }
    }

    fn url(&self, name: &str, version: &str) -> String {
        if version.is_empty() {
            format!("{}/api/v1/crates/{}", self.base, name)
        } else {
            format!("{}/api/v1/crates/{}/{}", self.base, name, version)
        }
    }
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: VersionEntry,
}

#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateMeta,
    versions: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct CrateMeta {
    #[serde(rename = "newest_version", default)]
    newest_version: String,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    num: String,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    links: VersionLinks,
}

#[derive(Debug, Default, Deserialize)]
struct VersionLinks {
    #[serde(rename = "version_downloads", default)]
    version_downloads: Option<String>,
}

fn license_or_unknown(license: &Option<String>) -> String {
    match license {
        Some(l) if !l.is_empty() => l.clone(),
        _ => UNKNOWN_LICENSE.to_owned(),
    }
}

#[async_trait]
impl Distributor for CratesIo {
    fn tag(&self) -> &'static str {
        TAG
    }

    async fn get_package(&self, name: &str) -> Result<Entry> {
        self.get_package_version(name, "").await
    }

    async fn get_package_version(&self, name: &str, version: &str) -> Result<Entry> {
        let response = self
            .client
            .get(&self.url(name, version))
            .await
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        if response.status == reqwest::StatusCode::NOT_FOUND {
            let excerpt = response.logging_excerpt(400);
            return if excerpt.contains("does not have a version") {
                Err(DistributorError::version_not_found(TAG))
            } else {
                Err(DistributorError::no_such_package(TAG))
            };
        }
        if !response.is_success() {
            return Err(DistributorError::upstream_msg(
                TAG,
                format!("unexpected status {}", response.status),
            ));
        }

        if version.is_empty() {
            let decoded: CrateResponse = response
                .json()
                .map_err(|e| DistributorError::upstream(TAG, e))?;

            if decoded.krate.newest_version.is_empty() {
                return Err(DistributorError::version_not_found(TAG));
            }

            let newest = decoded
                .versions
                .into_iter()
                .find(|v| v.num == decoded.krate.newest_version)
                .ok_or_else(|| DistributorError::version_not_found(TAG))?;

            Ok(self.to_entry(name, newest))
        } else {
            let decoded: VersionResponse = response
                .json()
                .map_err(|e| DistributorError::upstream(TAG, e))?;
            Ok(self.to_entry(name, decoded.version))
        }
    }
}

impl CratesIo {
    /// `links.version_downloads` is root-relative (e.g.
    /// `/api/v1/crates/snarkvm-marlin/0.8.0/downloads`); prefix it with
    /// `self.base` to get the canonical distribution-point URL.
    fn to_entry(&self, name: &str, version: VersionEntry) -> Entry {
        let license = license_or_unknown(&version.license);
        let mut distribution_points = Vec::new();
        if let Some(downloads) = version.links.version_downloads {
            distribution_points.push(DistributionPoint {
                name: name.to_owned(),
                url: format!("{}{}", self.base, downloads),
                distributor: crate::model::Distributor::CratesIo,
            });
        }
        Entry {
            name: name.to_owned(),
            version: version.num,
            license,
            distribution_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::QueryClientConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client() -> QueryClient {
        QueryClient::new(QueryClientConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn resolves_newest_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/crates/snarkvm-marlin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "crate": { "newest_version": "0.8.0" },
                "versions": [
                    { "num": "0.7.0", "license": "GPL-3.0", "links": {} },
                    { "num": "0.8.0", "license": "GPL-3.0", "links": { "version_downloads": "/api/v1/crates/snarkvm-marlin/0.8.0/downloads" } }
                ]
            })))
            .mount(&server)
            .await;

        let adapter = CratesIo::new(client().await, server.uri());
        let entry = adapter.get_package("snarkvm-marlin").await.unwrap();
        assert_eq!(entry.version, "0.8.0");
        assert_eq!(entry.license, "GPL-3.0");
        assert_eq!(
            entry.distribution_points[0].url,
            format!("{}/api/v1/crates/snarkvm-marlin/0.8.0/downloads", server.uri())
        );
    }

    #[tokio::test]
    async fn not_found_body_distinguishes_version_vs_package() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/crates/serde/999.0.0"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_string(r#"{"errors":[{"detail":"crate `serde` does not have a version `999.0.0`"}]}"#),
            )
            .mount(&server)
            .await;

        let adapter = CratesIo::new(client().await, server.uri());
        let err = adapter
            .get_package_version("serde", "999.0.0")
            .await
            .unwrap_err();
        assert!(err.is_version_not_found());
    }

    #[tokio::test]
    async fn missing_license_becomes_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/crates/foo/1.0.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "version": { "num": "1.0.0", "links": {} }
            })))
            .mount(&server)
            .await;

        let adapter = CratesIo::new(client().await, server.uri());
        let entry = adapter.get_package_version("foo", "1.0.0").await.unwrap();
        assert_eq!(entry.license, "Unknown");
    }
}

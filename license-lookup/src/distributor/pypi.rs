// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use serde::Deserialize;

use super::Distributor;
use crate::error::{DistributorError, Result};
use crate::http::QueryClient;
use crate::model::{DistributionPoint, Entry, UNKNOWN_LICENSE};

const TAG: &str = "pypi";

pub struct Pypi {
    client: QueryClient,
    base: String,
}

impl Pypi {
    pub fn new(client: QueryClient, base: String) -> Self {
        Pypi { client, base }
    }

    fn url(&self, name: &str, version: &str) -> String {
        if version.is_empty() {
            format!("{}/pypi/{}/json", self.base, name)
        } else {
            format!("{}/pypi/{}/{}/json", self.base, name, version)
        }
    }

    async fn probe_exists(&self, name: &str) -> Result<bool> {
        let url = format!("{}/pypi/{}/json", self.base, name);
        let response = self
            .client
            .get(&url)
            .await
            .map_err(|e| DistributorError::upstream(TAG, e))?;
        Ok(response.is_success())
    }
}

#[derive(Debug, Deserialize)]
struct PypiResponse {
    info: PypiInfo,
}

#[derive(Debug, Deserialize)]
struct PypiInfo {
    name: String,
    version: String,
    #[serde(default)]
    license: String,
    #[serde(default)]
    package_url: String,
}

#[async_trait]
impl Distributor for Pypi {
    fn tag(&self) -> &'static str {
        TAG
    }

    async fn get_package(&self, name: &str) -> Result<Entry> {
        self.get_package_version(name, "").await
    }

    async fn get_package_version(&self, name: &str, version: &str) -> Result<Entry> {
        let url = self.url(name, version);
        let response = self
            .client
            .get(&url)
            .await
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        if response.status == reqwest::StatusCode::NOT_FOUND {
            return if self.probe_exists(name).await? {
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

        let decoded: PypiResponse = response
            .json()
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        let license = if decoded.info.license.is_empty() {
            UNKNOWN_LICENSE.to_owned()
        } else {
            decoded.info.license
        };

        let mut distribution_points = Vec::new();
        if !decoded.info.package_url.is_empty() {
            distribution_points.push(DistributionPoint {
                name: decoded.info.name.clone(),
                url: decoded.info.package_url,
                distributor: crate::model::Distributor::Pypi,
            });
        }

        Ok(Entry {
            name: decoded.info.name,
            version: decoded.info.version,
            license,
            distribution_points,
        })
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
    async fn decodes_a_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pypi/requests/2.32.3/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "info": {
                    "name": "requests",
                    "version": "2.32.3",
                    "license": "Apache-2.0",
                    "package_url": "https://pypi.org/project/requests/"
                }
            })))
            .mount(&server)
            .await;

        let adapter = Pypi::new(client().await, server.uri());
        let entry = adapter.get_package_version("requests", "2.32.3").await.unwrap();

        assert_eq!(entry.name, "requests");
        assert_eq!(entry.version, "2.32.3");
        assert_eq!(entry.license, "Apache-2.0");
        assert_eq!(entry.distribution_points.len(), 1);
        assert_eq!(entry.distribution_points[0].url, "https://pypi.org/project/requests/");
    }

    #[tokio::test]
    async fn missing_version_but_existing_package_is_version_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pypi/requests/9.9.9/json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pypi/requests/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "info": { "name": "requests", "version": "2.32.3", "license": "Apache-2.0" }
            })))
            .mount(&server)
            .await;

        let adapter = Pypi::new(client().await, server.uri());
        let err = adapter
            .get_package_version("requests", "9.9.9")
            .await
            .unwrap_err();
        assert!(err.is_version_not_found());
    }

    #[tokio::test]
    async fn missing_package_is_no_such_package() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pypi/doesnotexist/json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let adapter = Pypi::new(client().await, server.uri());
        let err = adapter.get_package("doesnotexist").await.unwrap_err();
        assert!(err.is_no_such_package());
    }

    #[tokio::test]
    async fn missing_license_becomes_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pypi/foo/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "info": { "name": "foo", "version": "1.0.0" }
            })))
            .mount(&server)
            .await;

        let adapter = Pypi::new(client().await, server.uri());
        let entry = adapter.get_package("foo").await.unwrap();
        assert_eq!(entry.license, "Unknown");
    }
}

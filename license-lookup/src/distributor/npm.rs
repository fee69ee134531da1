// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::Distributor;
use crate::error::{DistributorError, Result};
use crate::http::QueryClient;
use crate::model::{DistributionPoint, Entry, UNKNOWN_LICENSE, UNKNOWN_VERSION};

const TAG: &str = "npm";

pub struct Npm {
    client: QueryClient,
    base: String,
}

impl Npm {
    pub fn new(client: QueryClient, base: String) -> Self {
        Npm { client, base }
    }

    fn distribution_point(&self, name: &str) -> DistributionPoint {
        DistributionPoint {
            name: name.to_owned(),
            url: format!("https://www.npmjs.com/package/{}", name),
            distributor: crate::model::Distributor::Npm,
        }
    }

    fn license_string(value: Option<&Value>) -> Option<String> {
        match value {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Object(map)) => map
                .get("type")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
            _ => None,
        }
    }

    /// The package doc fetched without a version segment: carries
    /// `dist-tags` and the full `versions` map.
    async fn fetch_package_doc(&self, name: &str) -> Result<PackageDoc> {
        let url = format!("{}/{}", self.base, name);
        let response = self
            .client
            .get(&url)
            .await
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        if response.status == reqwest::StatusCode::NOT_FOUND {
            return Err(DistributorError::no_such_package(TAG));
        }
        if !response.is_success() {
            return Err(DistributorError::upstream_msg(
                TAG,
                format!("unexpected status {}", response.status),
            ));
        }
        response
            .json()
            .map_err(|e| DistributorError::upstream(TAG, e))
    }
}

#[derive(Debug, Deserialize)]
struct PackageDoc {
    name: String,
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, VersionDoc>,
    #[serde(default)]
    license: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct VersionDoc {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    license: Option<Value>,
}

#[async_trait]
impl Distributor for Npm {
    fn tag(&self) -> &'static str {
        TAG
    }

    async fn get_package(&self, name: &str) -> Result<Entry> {
        let doc = self.fetch_package_doc(name).await?;

        let latest_tag = doc.dist_tags.get("latest");
        let latest = latest_tag.and_then(|tag| doc.versions.get(tag));

        let version = latest
            .and_then(|v| v.version.clone())
            .or_else(|| latest_tag.cloned())
            .unwrap_or_else(|| UNKNOWN_VERSION.to_owned());

        let license = Self::license_string(doc.license.as_ref())
            .or_else(|| latest.and_then(|v| Self::license_string(v.license.as_ref())))
            .unwrap_or_else(|| UNKNOWN_LICENSE.to_owned());

        Ok(Entry {
            name: doc.name.clone(),
            version,
            license,
            distribution_points: vec![self.distribution_point(&doc.name)],
        })
    }

    async fn get_package_version(&self, name: &str, version: &str) -> Result<Entry> {
        if version.is_empty() {
            return self.get_package(name).await;
        }

        let url = format!("{}/{}/{}", self.base, name, version);
        let response = self
            .client
            .get(&url)
            .await
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        if response.status == reqwest::StatusCode::NOT_FOUND {
            // npm's single-version lookup can't distinguish "no such
            // package" from "no such version" in one response; probe the
            // package-level document to disambiguate.
            return match self.fetch_package_doc(name).await {
                Ok(_) => Err(DistributorError::version_not_found(TAG)),
                Err(e) if e.is_no_such_package() => Err(DistributorError::no_such_package(TAG)),
                Err(e) => Err(e),
            };
        }
        if !response.is_success() {
            return Err(DistributorError::upstream_msg(
                TAG,
                format!("unexpected status {}", response.status),
            ));
        }

        let decoded: VersionDoc = response
            .json()
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        let resolved_version = decoded.version.unwrap_or_else(|| version.to_owned());
        let license = Self::license_string(decoded.license.as_ref())
            .unwrap_or_else(|| UNKNOWN_LICENSE.to_owned());

        Ok(Entry {
            name: name.to_owned(),
            version: resolved_version,
            license,
            distribution_points: vec![self.distribution_point(name)],
        })
    }
}

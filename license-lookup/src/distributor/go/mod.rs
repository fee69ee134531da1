// SPDX-License-Identifier: Apache-2.0

mod license_detect;

use async_trait::async_trait;
use serde::Deserialize;
use std::io::Cursor;
use std::path::PathBuf;

use super::Distributor;
use crate::error::{DistributorError, Result};
use crate::http::QueryClient;
use crate::model::{DistributionPoint, Entry};

const TAG: &str = "go";

pub struct Go {
    client: QueryClient,
    base: String,
    temp_dir: PathBuf,
}

impl Go {
    pub fn new(client: QueryClient, base: String, temp_dir: PathBuf) -> Self {
        Go { client, base, temp_dir }
    }

    fn info_url(&self, name: &str, version: &str) -> String {
        if version.is_empty() {
            format!("{}/{}/@latest", self.base, name)
        } else {
            format!("{}/{}/@v/{}.info", self.base, name, version)
        }
    }

    fn zip_url(&self, name: &str, version: &str) -> String {
        format!("{}/{}/@v/{}.zip", self.base, name, version)
    }

    async fn get_info(&self, name: &str, version: &str) -> Result<GoInfo> {
        let response = self
            .client
            .get(&self.info_url(name, version))
            .await
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        if response.status == reqwest::StatusCode::NOT_FOUND {
            let probe = self
                .client
                .get(&format!("{}/{}/@latest", self.base, name))
                .await
                .map_err(|e| DistributorError::upstream(TAG, e))?;
            return if probe.is_success() {
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

        response
            .json()
            .map_err(|e| DistributorError::upstream(TAG, e))
    }

    /// Download the zipball for `name@version`, extract it under a
    /// random subdirectory of the configured temp root, and run
    /// license detection against the extracted tree. The temp file and
    /// directory are removed on every exit path — success or failure —
    /// because both are RAII guards.
    async fn get_license(&self, name: &str, version: &str) -> Result<String> {
        let zip_url = self.zip_url(name, version);
        let response = self
            .client
            .get(&zip_url)
            .await
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        if !response.is_success() {
            return Err(DistributorError::upstream_msg(
                TAG,
                format!("unexpected status {} fetching zipball", response.status),
            ));
        }

        let extract_dir = tempfile::Builder::new()
            .prefix("license-lookup-go-")
            .tempdir_in(&self.temp_dir)
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        {
            let mut archive = zip::ZipArchive::new(Cursor::new(&response.body))
                .map_err(|e| DistributorError::upstream(TAG, e))?;
            archive
                .extract(extract_dir.path())
                .map_err(|e| DistributorError::upstream(TAG, e))?;
        }

        let module_root = extract_dir.path().join(format!("{}@{}", name, version));
        let scan_root = if module_root.is_dir() {
            module_root.as_path()
        } else {
            extract_dir.path()
        };

        let detected = license_detect::detect(scan_root);
        let mut certain: Vec<&String> = detected
            .iter()
            .filter(|(_, confidence)| **confidence >= 1.0)
            .map(|(id, _)| id)
            .collect();
        certain.sort();

        certain
            .into_iter()
            .next()
            .cloned()
            .ok_or_else(|| DistributorError::upstream_msg(TAG, "no license detected"))
    }
}

#[derive(Debug, Deserialize)]
struct GoInfo {
    #[serde(rename = "Version")]
    version: String,
}

#[async_trait]
impl Distributor for Go {
    fn tag(&self) -> &'static str {
        TAG
    }

    async fn get_package(&self, name: &str) -> Result<Entry> {
        self.get_package_version(name, "").await
    }

    async fn get_package_version(&self, name: &str, version: &str) -> Result<Entry> {
        let info = self.get_info(name, version).await?;
        let license = self.get_license(name, &info.version).await?;

        Ok(Entry {
            name: name.to_owned(),
            version: info.version.clone(),
            license,
            distribution_points: vec![DistributionPoint {
                name: name.to_owned(),
                url: self.zip_url(name, &info.version),
                distributor: crate::model::Distributor::Go,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::QueryClientConfig;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client() -> QueryClient {
        QueryClient::new(QueryClientConfig::default()).unwrap()
    }

    fn build_zip_with_license(module_at_version: &str, license_body: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut writer = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default();
            writer
                .start_file(format!("{}/LICENSE", module_at_version), options)
                .unwrap();
            writer.write_all(license_body.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    #[tokio::test]
    async fn resolves_version_and_detects_license() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/github.com/keltia/leftpad/@v/v0.1.0.info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Version": "v0.1.0"
            })))
            .mount(&server)
            .await;

        let zip_bytes = build_zip_with_license(
            "github.com/keltia/leftpad@v0.1.0",
            "Redistribution and use in source and binary forms, with or without \
             modification, are permitted provided that the following conditions are met: \
             Redistributions of source code must retain the above copyright notice, this \
             list of conditions and the following disclaimer.",
        );
        Mock::given(method("GET"))
            .and(path("/github.com/keltia/leftpad/@v/v0.1.0.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(zip_bytes))
            .mount(&server)
            .await;

        let temp_dir = tempfile::tempdir().unwrap();
        let adapter = Go::new(client().await, server.uri(), temp_dir.path().to_path_buf());
        let entry = adapter
            .get_package_version("github.com/keltia/leftpad", "v0.1.0")
            .await
            .unwrap();

        assert_eq!(entry.version, "v0.1.0");
        assert_eq!(entry.license, "BSD-2-Clause");
        assert_eq!(
            entry.distribution_points[0].url,
            format!("{}/github.com/keltia/leftpad/@v/v0.1.0.zip", server.uri())
        );
    }

    #[tokio::test]
    async fn missing_version_but_existing_module_is_version_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/example.com/mod/@v/v9.9.9.info"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/example.com/mod/@latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Version": "v1.0.0"
            })))
            .mount(&server)
            .await;

        let temp_dir = tempfile::tempdir().unwrap();
        let adapter = Go::new(client().await, server.uri(), temp_dir.path().to_path_buf());
        let err = adapter
            .get_package_version("example.com/mod", "v9.9.9")
            .await
            .unwrap_err();
        assert!(err.is_version_not_found());
    }
}

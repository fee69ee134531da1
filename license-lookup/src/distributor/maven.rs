// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use serde::Deserialize;
use xml::reader::{EventReader, XmlEvent};

use super::Distributor;
use crate::error::{DistributorError, Result};
use crate::http::QueryClient;
use crate::model::{DistributionPoint, Entry, UNKNOWN_LICENSE};

const TAG: &str = "maven";

pub struct Maven {
    client: QueryClient,
    base: String,
}

impl Maven {
    pub fn new(client: QueryClient, base: String) -> Self {
        Maven { client, base }
    }

    fn split_coordinate(name: &str) -> Option<(&str, &str)> {
        let mut parts = name.splitn(2, ':');
        let group = parts.next()?;
        let artifact = parts.next()?;
        if group.is_empty() || artifact.is_empty() || artifact.contains(':') {
            return None;
        }
        Some((group, artifact))
    }

    fn pom_url(&self, group: &str, artifact: &str, version: &str) -> String {
        let path_group = group.replace('.', "/");
        format!(
            "{}/remotecontent?filepath={}/{}/{}/{}-{}.pom",
            self.base, path_group, artifact, version, artifact, version
        )
    }

    fn solr_url(&self, group: &str, artifact: &str) -> String {
        format!(
            "{}/solrsearch/select?q=g:{}+AND+a:{}&rows=1&wt=json",
            self.base, group, artifact
        )
    }

    async fn solr_latest_version(&self, group: &str, artifact: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.solr_url(group, artifact))
            .await
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        if !response.is_success() {
            return Err(DistributorError::upstream_msg(
                TAG,
                format!("solr search returned status {}", response.status),
            ));
        }

        let decoded: SolrResponse = response
            .json()
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        Ok(decoded.response.docs.into_iter().next().map(|d| d.latest_version))
    }

    async fn exists_at_all(&self, group: &str, artifact: &str) -> Result<bool> {
        Ok(self.solr_latest_version(group, artifact).await?.is_some())
    }
}

#[derive(Debug, Deserialize)]
struct SolrResponse {
    response: SolrDocs,
}

#[derive(Debug, Deserialize)]
struct SolrDocs {
    docs: Vec<SolrDoc>,
}

#[derive(Debug, Deserialize)]
struct SolrDoc {
    #[serde(rename = "latestVersion")]
    latest_version: String,
}

/// Pull the first `<licenses><license><name>` text node out of a POM.
fn first_license_name(pom: &str) -> Option<String> {
    let mut parser = EventReader::new(pom.as_bytes());
    let mut path: Vec<String> = Vec::new();
    loop {
        match parser.next() {
            Ok(XmlEvent::StartElement { name, .. }) => {
                path.push(name.local_name);
                if path.ends_with(&[
                    "licenses".to_owned(),
                    "license".to_owned(),
                    "name".to_owned(),
                ]) {
                    if let Ok(XmlEvent::Characters(text)) = parser.next() {
                        return Some(text);
                    }
                }
            }
            Ok(XmlEvent::EndElement { .. }) => {
                path.pop();
            }
            Ok(XmlEvent::EndDocument) | Err(_) => break,
            _ => {}
        }
    }
    None
}

#[async_trait]
impl Distributor for Maven {
    fn tag(&self) -> &'static str {
        TAG
    }

    async fn get_package(&self, name: &str) -> Result<Entry> {
        self.get_package_version(name, "").await
    }

    async fn get_package_version(&self, name: &str, version: &str) -> Result<Entry> {
        let (group, artifact) =
            Self::split_coordinate(name).ok_or_else(|| DistributorError::no_such_package(TAG))?;

        let resolved_version = if version.is_empty() || version == "latest" {
            self.solr_latest_version(group, artifact)
                .await?
                .ok_or_else(|| DistributorError::no_such_package(TAG))?
        } else {
            version.to_owned()
        };

        let pom_response = self
            .client
            .get(&self.pom_url(group, artifact, &resolved_version))
            .await
            .map_err(|e| DistributorError::upstream(TAG, e))?;

        if !pom_response.is_success() {
            return if self.exists_at_all(group, artifact).await? {
                Err(DistributorError::version_not_found(TAG))
            } else {
                Err(DistributorError::no_such_package(TAG))
            };
        }

        let pom_body = pom_response.body_str().into_owned();
        let license = first_license_name(&pom_body).unwrap_or_else(|| UNKNOWN_LICENSE.to_owned());

        Ok(Entry {
            name: name.to_owned(),
            version: resolved_version,
            license,
            distribution_points: vec![DistributionPoint {
                name: name.to_owned(),
                url: format!("https://central.sonatype.com/artifact/{}/{}", group, artifact),
                distributor: crate::model::Distributor::Maven,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_valid_coordinate() {
        assert_eq!(
            Maven::split_coordinate("org.apache.logging.log4j:log4j"),
            Some(("org.apache.logging.log4j", "log4j"))
        );
    }

    #[test]
    fn rejects_malformed_coordinate() {
        assert_eq!(Maven::split_coordinate("no-colon-here"), None);
        assert_eq!(Maven::split_coordinate("g:"), None);
        assert_eq!(Maven::split_coordinate(":a"), None);
        assert_eq!(Maven::split_coordinate("g:a:extra"), None);
    }

    #[test]
    fn extracts_first_license_name() {
        let pom = r#"
            <project>
                <licenses>
                    <license>
                        <name>Apache-2.0</name>
                        <url>https://example.com</url>
                    </license>
                </licenses>
            </project>
        "#;
        assert_eq!(first_license_name(pom), Some("Apache-2.0".to_owned()));
    }

    #[test]
    fn missing_licenses_section_yields_none() {
        let pom = "<project><name>no-licenses</name></project>";
        assert_eq!(first_license_name(pom), None);
    }
}

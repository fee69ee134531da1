// SPDX-License-Identifier: Apache-2.0

//! Distributor adapters (C4): one module per upstream package registry,
//! each implementing [`Distributor`] over the same `QueryClient`.
//!
//! Dispatch is a closed-set match over [`crate::model::Distributor`]
//! rather than a trait-object hierarchy, per the design notes: the set of
//! distributors is fixed and known at compile time.

mod crates_io;
mod go;
mod maven;
mod npm;
mod pypi;

use crate::error::Result;
use crate::http::QueryClient;
use crate::model::{Distributor as DistributorTag, Entry};
use async_trait::async_trait;

/// The uniform contract every upstream adapter implements.
#[async_trait]
pub trait Distributor: Send + Sync {
    /// Wire-exact tag, e.g. `"pypi"`.
    fn tag(&self) -> &'static str;

    /// Fetch the latest version of `name`.
    async fn get_package(&self, name: &str) -> Result<Entry>;

    /// Fetch a specific `version` of `name`; empty `version` behaves like
    /// [`Self::get_package`].
    async fn get_package_version(&self, name: &str, version: &str) -> Result<Entry>;
}

/// Construct the fixed registry of adapters, one per [`DistributorTag`],
/// sharing one [`QueryClient`].
pub struct Registry {
    pypi: pypi::Pypi,
    npm: npm::Npm,
    maven: maven::Maven,
    crates_io: crates_io::CratesIo,
    go: go::Go,
}

impl Registry {
    pub fn new(client: QueryClient, base_urls: BaseUrls, temp_dir: std::path::PathBuf) -> Self {
        Registry {
            pypi: pypi::Pypi::new(client.clone(), base_urls.pypi),
            npm: npm::Npm::new(client.clone(), base_urls.npm),
            maven: maven::Maven::new(client.clone(), base_urls.maven),
            crates_io: crates_io::CratesIo::new(client.clone(), base_urls.crates_io),
            go: go::Go::new(client, base_urls.go, temp_dir),
        }
    }

    pub fn get(&self, tag: DistributorTag) -> &dyn Distributor {
        match tag {
            DistributorTag::Pypi => &self.pypi,
            DistributorTag::Npm => &self.npm,
            DistributorTag::Maven => &self.maven,
            DistributorTag::CratesIo => &self.crates_io,
            DistributorTag::Go => &self.go,
        }
    }
}

/// The upstream base URL for each distributor, overridable for tests
/// (wiremock servers) and for alternate mirrors in production.
#[derive(Debug, Clone)]
pub struct BaseUrls {
    pub pypi: String,
    pub npm: String,
    pub maven: String,
    pub crates_io: String,
    pub go: String,
}

impl Default for BaseUrls {
    fn default() -> Self {
        BaseUrls {
            pypi: "https://pypi.org".to_owned(),
            npm: "https://registry.npmjs.org".to_owned(),
            maven: "https://search.maven.org".to_owned(),
            crates_io: "https://crates.io".to_owned(),
            go: "https://proxy.golang.org".to_owned(),
        }
    }
}

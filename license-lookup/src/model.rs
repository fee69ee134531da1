// SPDX-License-Identifier: Apache-2.0

//! The canonical data model shared by every distributor adapter, the
//! datastore, and the lookup service.

use serde::{Deserialize, Serialize};

/// A closed set of supported distributors, wire-exact with the tags in
/// `spec.md` §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distributor {
    Pypi,
    Npm,
    Maven,
    CratesIo,
    Go,
}

impl Distributor {
    /// Wire-exact tag string.
    pub const fn tag(self) -> &'static str {
        match self {
            Distributor::Pypi => "pypi",
            Distributor::Npm => "npm",
            Distributor::Maven => "maven",
            Distributor::CratesIo => "crates.io",
            Distributor::Go => "go",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "pypi" => Some(Distributor::Pypi),
            "npm" => Some(Distributor::Npm),
            "maven" => Some(Distributor::Maven),
            "crates.io" => Some(Distributor::CratesIo),
            "go" => Some(Distributor::Go),
            _ => None,
        }
    }
}

impl std::fmt::Display for Distributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A URL + distributor tag where an artifact is retrievable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionPoint {
    pub name: String,
    pub url: String,
    pub distributor: Distributor,
}

/// The canonical record returned by a lookup: effective name, resolved
/// version, normalized license, and distribution points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub version: String,
    pub license: String,
    pub distribution_points: Vec<DistributionPoint>,
}

/// Sentinel used when an upstream omits the version entirely.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Sentinel used when an upstream omits the license field entirely (as
/// opposed to the normalizer producing `""` for an unrecognized string).
pub const UNKNOWN_LICENSE: &str = "Unknown";

/// `(name, version, distributor)`. An empty `version` means "resolve
/// latest at upstream"; per `spec.md` §9 the cache is keyed by this
/// unresolved triple, not by whatever version gets resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    pub name: String,
    pub version: String,
    pub distributor: Distributor,
}

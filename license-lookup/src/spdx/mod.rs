// SPDX-License-Identifier: Apache-2.0

//! The SPDX license table (C2) and the normalizer built on top of it (C3).
//!
//! The table is loaded once from the embedded JSON asset in
//! `licenses.json`, the same way the teacher embeds its config templates
//! with `include_str!` so the binary stays self-sufficient.

mod normalize;

pub use normalize::normalize_id;

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

const LICENSES_JSON: &str = include_str!("licenses.json");

/// One entry from the SPDX License List.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct License {
    #[serde(rename = "licenseId")]
    pub id: String,
    pub name: String,
    pub reference: String,
    #[serde(rename = "isDeprecatedLicenseId")]
    pub deprecated: bool,
    #[serde(rename = "isOsiApproved")]
    pub osi_approved: bool,
}

impl License {
    fn empty() -> Self {
        License {
            id: String::new(),
            name: String::new(),
            reference: String::new(),
            deprecated: false,
            osi_approved: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawList {
    #[serde(rename = "licenseListVersion")]
    version: String,
    #[serde(rename = "releaseDate")]
    release_date: String,
    licenses: Vec<License>,
}

/// The in-memory SPDX license table, immutable after construction.
pub struct SpdxTable {
    by_id: HashMap<String, License>,
    ids: Vec<String>,
    version: String,
    release_date: String,
}

const SOURCE_URL: &str = "https://spdx.org/licenses/";

impl SpdxTable {
    /// Load the table from the embedded asset. Parsing a malformed
    /// embedded asset is a build-time bug, not a runtime condition, so this
    /// panics rather than returning a `Result` — mirrors the teacher's
    /// `AGENT.get_or_init` pattern for other process-wide immutable state.
    pub fn load() -> Self {
        let raw: RawList =
            serde_json::from_str(LICENSES_JSON).expect("embedded SPDX license list must parse");

        let mut by_id = HashMap::with_capacity(raw.licenses.len());
        let mut ids = Vec::with_capacity(raw.licenses.len());
        for license in raw.licenses {
            ids.push(license.id.clone());
            by_id.insert(license.id.to_lowercase(), license);
        }
        ids.sort();

        SpdxTable {
            by_id,
            ids,
            version: raw.version,
            release_date: raw.release_date,
        }
    }

    /// Process-wide singleton, analogous to the teacher's `OnceLock`-backed
    /// HTTP agent.
    pub fn global() -> &'static SpdxTable {
        static TABLE: OnceLock<SpdxTable> = OnceLock::new();
        TABLE.get_or_init(SpdxTable::load)
    }

    /// Case-insensitive lookup. Returns an empty-value [`License`] (never a
    /// reference) when not found, so callers can't mutate the table.
    pub fn lookup(&self, id: &str) -> License {
        self.by_id
            .get(&id.to_lowercase())
            .cloned()
            .unwrap_or_else(License::empty)
    }

    /// A defensive copy of every known identifier.
    pub fn licenses(&self) -> Vec<String> {
        self.ids.clone()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn release_date(&self) -> &str {
        &self.release_date
    }

    pub fn source(&self) -> &str {
        SOURCE_URL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_embedded_asset() {
        let table = SpdxTable::load();
        assert!(!table.licenses().is_empty());
        assert_eq!(table.source(), SOURCE_URL);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = SpdxTable::load();
        let canonical = table.lookup("apache-2.0");
        assert_eq!(canonical.id, "Apache-2.0");
        assert_eq!(table.lookup("APACHE-2.0").id, "Apache-2.0");
    }

    #[test]
    fn lookup_of_unknown_id_is_empty() {
        let table = SpdxTable::load();
        assert!(table.lookup("Definitely-Not-A-License").is_empty());
    }

    #[test]
    fn licenses_is_a_defensive_copy() {
        let table = SpdxTable::load();
        let mut copy = table.licenses();
        copy.push("Bogus-1.0".to_owned());
        assert_ne!(copy.len(), table.licenses().len());
    }
}

// SPDX-License-Identifier: Apache-2.0

use super::SpdxTable;

/// Map an arbitrary license string to the canonical SPDX identifier, or
/// `""` if it isn't recognized. Never fails.
pub fn normalize_id(table: &SpdxTable, id: &str) -> String {
    let found = table.lookup(id);
    if found.is_empty() {
        String::new()
    } else {
        found.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_canonical_casing() {
        let table = SpdxTable::load();
        assert_eq!(normalize_id(&table, "apache-2.0"), "Apache-2.0");
        assert_eq!(normalize_id(&table, "APACHE-2.0"), "Apache-2.0");
    }

    #[test]
    fn unrecognized_license_normalizes_to_empty() {
        let table = SpdxTable::load();
        assert_eq!(normalize_id(&table, "made-up-license"), "");
    }

    #[test]
    fn every_known_id_round_trips() {
        let table = SpdxTable::load();
        for id in table.licenses() {
            assert_eq!(normalize_id(&table, &id), id);
            assert_eq!(normalize_id(&table, &id.to_lowercase()), id);
        }
    }
}

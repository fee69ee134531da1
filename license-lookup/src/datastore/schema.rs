// SPDX-License-Identifier: Apache-2.0

//! Generated by `diesel print-schema`, committed per the project's
//! `diesel.toml` configuration. Do not hand-edit; regenerate after
//! changing a migration.

diesel::table! {
    packages (name, version, distributor, distribution_url) {
        name -> Text,
        license -> Text,
        version -> Text,
        distributor -> Text,
        distribution_url -> Text,
    }
}

// SPDX-License-Identifier: Apache-2.0

use diesel::prelude::*;

use super::schema::packages;

#[derive(Debug, Queryable)]
pub struct LicenseAndUrl {
    pub license: String,
    pub distribution_url: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = packages)]
pub struct NewPackageRow<'a> {
    pub name: &'a str,
    pub license: &'a str,
    pub version: &'a str,
    pub distributor: &'a str,
    pub distribution_url: &'a str,
}

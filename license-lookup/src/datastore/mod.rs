// SPDX-License-Identifier: Apache-2.0

//! The relational read-through cache (C5).
//!
//! One pooled connection type, [`AnyConnection`], dispatches between
//! Postgres (production) and SQLite (tests, via `:memory:`) at runtime
//! based on the `DATABASE_URL` scheme — the same shape as the teacher's
//! `DieselPool`, but generalized to two backends with `diesel`'s
//! `MultiConnection` derive instead of a single hardcoded backend.
//!
//! Every call blocks on a pooled synchronous connection, so callers run
//! it inside `tokio::task::spawn_blocking`.

mod models;
mod schema;

use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{AppResult, Error};
use crate::model::{DistributionPoint, Entry};
use models::{LicenseAndUrl, NewPackageRow};
use schema::packages;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(diesel::MultiConnection)]
pub enum AnyConnection {
    Postgresql(diesel::pg::PgConnection),
    Sqlite(diesel::sqlite::SqliteConnection),
}

pub type Pool = r2d2::Pool<ConnectionManager<AnyConnection>>;

/// A pooled handle to the `packages` table.
#[derive(Clone)]
pub struct Datastore {
    pool: Pool,
}

impl Datastore {
    /// Build the connection pool and run any pending migrations. Fatal
    /// on failure: an unreachable or unmigrated database means the
    /// process has nothing useful to serve.
    pub fn connect(database_url: &str, max_pool_size: u32) -> AppResult<Self> {
        let manager = ConnectionManager::<AnyConnection>::new(database_url);
        let pool = r2d2::Pool::builder()
            .max_size(max_pool_size)
            .build(manager)
            .map_err(Error::Pool)?;

        let mut conn = pool.get().map_err(Error::Pool)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(Error::Migration)?;

        Ok(Datastore { pool })
    }

    #[cfg(test)]
    pub fn connect_sqlite_in_memory() -> AppResult<Self> {
        Self::connect(":memory:", 1)
    }

    /// Upsert every distribution point of `entry` in one transaction.
    /// Rolls back and surfaces on any error; never called on the hot
    /// path of a cache hit.
    pub fn save(&self, entry: &Entry) -> AppResult<()> {
        let mut conn = self.pool.get().map_err(Error::Pool)?;

        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            for dp in &entry.distribution_points {
                let row = NewPackageRow {
                    name: &entry.name,
                    license: &entry.license,
                    version: &entry.version,
                    distributor: dp.distributor.tag(),
                    distribution_url: &dp.url,
                };

                diesel::insert_into(packages::table)
                    .values(&row)
                    .on_conflict((
                        packages::name,
                        packages::version,
                        packages::distributor,
                        packages::distribution_url,
                    ))
                    .do_update()
                    .set((
                        packages::license.eq(&entry.license),
                        packages::distribution_url.eq(&dp.url),
                    ))
                    .execute(conn)?;
            }
            Ok(())
        })
        .map_err(Error::Database)
    }

    /// Select every row for `(name, version, distributor)` and
    /// reassemble them into an [`Entry`]. Fails with
    /// [`Error::ObjectNotFound`] when nothing matches.
    pub fn retrieve(
        &self,
        name: &str,
        version: &str,
        distributor: crate::model::Distributor,
    ) -> AppResult<Entry> {
        let mut conn = self.pool.get().map_err(Error::Pool)?;

        let rows: Vec<LicenseAndUrl> = packages::table
            .filter(packages::name.eq(name))
            .filter(packages::version.eq(version))
            .filter(packages::distributor.eq(distributor.tag()))
            .select((packages::license, packages::distribution_url))
            .load(&mut conn)
            .map_err(Error::Database)?;

        if rows.is_empty() {
            return Err(Error::ObjectNotFound {
                name: name.to_owned(),
                version: version.to_owned(),
                distributor: distributor.tag().to_owned(),
            });
        }

        let license = rows
            .last()
            .map(|r| r.license.clone())
            .unwrap_or_default();

        let distribution_points = rows
            .into_iter()
            .map(|r| DistributionPoint {
                name: name.to_owned(),
                url: r.distribution_url,
                distributor,
            })
            .collect();

        Ok(Entry {
            name: name.to_owned(),
            version: version.to_owned(),
            license,
            distribution_points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Distributor;

    fn sample_entry() -> Entry {
        Entry {
            name: "requests".to_owned(),
            version: "2.32.3".to_owned(),
            license: "Apache-2.0".to_owned(),
            distribution_points: vec![DistributionPoint {
                name: "requests".to_owned(),
                url: "https://pypi.org/project/requests/".to_owned(),
                distributor: Distributor::Pypi,
            }],
        }
    }

    #[test]
    fn save_then_retrieve_round_trips() {
        let store = Datastore::connect_sqlite_in_memory().unwrap();
        let entry = sample_entry();
        store.save(&entry).unwrap();

        let fetched = store
            .retrieve("requests", "2.32.3", Distributor::Pypi)
            .unwrap();
        assert_eq!(fetched, entry);
    }

    #[test]
    fn retrieve_of_unknown_triple_is_not_found() {
        let store = Datastore::connect_sqlite_in_memory().unwrap();
        let err = store
            .retrieve("nope", "0.0.0", Distributor::Pypi)
            .unwrap_err();
        assert!(matches!(err, Error::ObjectNotFound { .. }));
    }

    #[test]
    fn save_is_idempotent_on_conflict() {
        let store = Datastore::connect_sqlite_in_memory().unwrap();
        let mut entry = sample_entry();
        store.save(&entry).unwrap();

        entry.license = "MIT".to_owned();
        store.save(&entry).unwrap();

        let fetched = store
            .retrieve("requests", "2.32.3", Distributor::Pypi)
            .unwrap();
        assert_eq!(fetched.license, "MIT");
    }
}

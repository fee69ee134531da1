// SPDX-License-Identifier: Apache-2.0

//! The error taxonomy shared by every distributor adapter and the lookup
//! service.
//!
//! `DistributorError` wraps the two "this is really a not-found" variants
//! so that callers can ask `error.kind().is_no_such_package()` instead of
//! string-matching a message, while the `Display`/`source()` chain still
//! carries the original upstream cause for logging.

use std::fmt;

pub type Result<T> = std::result::Result<T, DistributorError>;

/// The reason a distributor adapter failed.
#[derive(Debug, thiserror::Error)]
pub enum DistributorErrorKind {
    /// The package identifier does not exist at the distributor.
    #[error("no such package")]
    NoSuchPackage,

    /// The package exists, but the requested version does not.
    #[error("version not found")]
    VersionNotFound,

    /// A transport failure, unexpected status code, or decode error.
    #[error("upstream error")]
    Upstream,
}

/// An error produced by a [`Distributor`](crate::distributor::Distributor).
///
/// Always tagged with which distributor produced it, and always carries the
/// underlying cause so it participates in the standard `source()` chain.
#[derive(Debug)]
pub struct DistributorError {
    distributor: &'static str,
    kind: DistributorErrorKind,
    cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl DistributorError {
    pub fn no_such_package(distributor: &'static str) -> Self {
        DistributorError {
            distributor,
            kind: DistributorErrorKind::NoSuchPackage,
            cause: None,
        }
    }

    pub fn version_not_found(distributor: &'static str) -> Self {
        DistributorError {
            distributor,
            kind: DistributorErrorKind::VersionNotFound,
            cause: None,
        }
    }

    pub fn upstream<E>(distributor: &'static str, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DistributorError {
            distributor,
            kind: DistributorErrorKind::Upstream,
            cause: Some(Box::new(cause)),
        }
    }

    pub fn upstream_msg(distributor: &'static str, msg: impl Into<String>) -> Self {
        DistributorError {
            distributor,
            kind: DistributorErrorKind::Upstream,
            cause: Some(Box::new(Message(msg.into()))),
        }
    }

    pub fn kind(&self) -> &DistributorErrorKind {
        &self.kind
    }

    pub fn is_no_such_package(&self) -> bool {
        matches!(self.kind, DistributorErrorKind::NoSuchPackage)
    }

    pub fn is_version_not_found(&self) -> bool {
        matches!(self.kind, DistributorErrorKind::VersionNotFound)
    }

    pub fn distributor(&self) -> &'static str {
        self.distributor
    }
}

impl fmt::Display for DistributorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.kind, self.distributor)
    }
}

impl std::error::Error for DistributorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Message {}

/// Top-level error for everything that isn't a distributor lookup: config,
/// bootstrap, and datastore failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to run database migrations")]
    Migration(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("database pool error")]
    Pool(#[from] r2d2::Error),

    #[error("database query error")]
    Database(#[from] diesel::result::Error),

    #[error("no rows found for {name}@{version} ({distributor})")]
    ObjectNotFound {
        name: String,
        version: String,
        distributor: String,
    },

    #[error("failed to bind {0}")]
    Bind(std::net::SocketAddr, #[source] std::io::Error),
}

pub type AppResult<T> = std::result::Result<T, Error>;

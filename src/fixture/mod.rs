//! Test-fixture certificate generation
//!
//! This module produces PEM-encoded key/certificate pairs for a fixed menu
//! of key algorithm and signature digest combinations, for seeding a TLS
//! conformance test suite.
//!
//! # Architecture
//!
//! 1. `FixtureSpec` declares the shape of a fixture (algorithms, subject, SANs,
//!    validity, optional issuer)
//! 2. `CertificateFixtureGenerator` turns specs into `GeneratedFixture`s
//! 3. `FixtureWriter` puts them on disk and checks them back
//!
//! The shape of a fixture is reproducible; key material and serial numbers
//! are fresh on every run.
//!
//! # Examples
//!
//! ```no_run
//! use bogo_certs::fixture::{catalog, CertificateFixtureGenerator, FixtureWriter};
//!
//! let generator = CertificateFixtureGenerator::new();
//! let fixtures = generator.generate_all(&catalog::bogo_fixtures()).unwrap();
//!
//! let writer = FixtureWriter::new("keys");
//! writer.write_all(&fixtures).unwrap();
//! ```
//!
//! Chained fixtures are linked structurally only: the certificate file holds
//! the leaf followed by its issuers, with no path validation.

pub mod catalog;
pub mod generator;
pub mod inspect;
pub mod manifest;
pub mod output;
pub mod spec;

pub use generator::{CertificateFixtureGenerator, FixtureSet, GeneratedFixture};
pub use inspect::{check_fixture, CertInfo};
pub use manifest::Manifest;
pub use output::{FixturePaths, FixtureWriter, DEFAULT_OUTPUT_DIR};
pub use spec::{EcCurve, FixtureSpec, KeyAlgorithm, SignatureHash};

use std::path::PathBuf;

/// Result type for fixture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fixture generation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{fixture}: key generation failed: {reason}")]
    KeyGeneration { fixture: String, reason: String },

    #[error("{fixture}: certificate build failed: {reason}")]
    CertificateBuild { fixture: String, reason: String },

    #[error("{fixture}: I/O error on {}: {source}", .path.display())]
    Io {
        fixture: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Duplicate fixture name: {0}")]
    DuplicateFixture(String),

    #[error("{fixture}: output file {file} is already written by {owner}")]
    DuplicateOutput {
        fixture: String,
        file: String,
        owner: String,
    },

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("{fixture}: fixture check failed: {reason}")]
    Mismatch { fixture: String, reason: String },

    #[error("Trust store update failed: {0}")]
    TrustStore(String),
}

impl Error {
    pub(crate) fn key_generation(fixture: &str, reason: impl ToString) -> Self {
        Error::KeyGeneration {
            fixture: fixture.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn certificate_build(fixture: &str, reason: impl ToString) -> Self {
        Error::CertificateBuild {
            fixture: fixture.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(fixture: &str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            fixture: fixture.to_string(),
            path: path.into(),
            source,
        }
    }

    pub(crate) fn mismatch(fixture: &str, reason: impl ToString) -> Self {
        Error::Mismatch {
            fixture: fixture.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Name of the fixture the error belongs to, if any
    pub fn fixture(&self) -> Option<&str> {
        match self {
            Error::KeyGeneration { fixture, .. }
            | Error::CertificateBuild { fixture, .. }
            | Error::Io { fixture, .. }
            | Error::DuplicateOutput { fixture, .. }
            | Error::Mismatch { fixture, .. } => Some(fixture),
            Error::DuplicateFixture(name) => Some(name),
            Error::Manifest(_) | Error::TrustStore(_) => None,
        }
    }
}

//! bogo-certs - TLS test fixture certificates
//!
//! This crate generates the key/certificate pairs a BoGo-style TLS test runner
//! expects (RSA-2048, RSA-1024, an RSA chain, ECDSA P-256 and P-384), and can
//! optionally install the chain's CA into the system trust store.

pub mod fixture;
pub mod trust;

pub use fixture::{
    CertificateFixtureGenerator, Error, FixtureSet, FixtureSpec, FixtureWriter, GeneratedFixture,
    Result,
};
pub use trust::TrustStore;

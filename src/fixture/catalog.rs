//! Built-in BoGo fixture table
//!
//! These are the key/certificate pairs the BoGo TLS test runner expects to
//! find under its `keys/` directory.

use super::spec::{EcCurve, FixtureSpec, SignatureHash};

/// Name of the CA that signs the `rsa_chain` fixture
pub const CHAIN_CA_NAME: &str = "rsa_chain_ca";

/// RSA-2048 / SHA-256, written as `key.pem` / `cert.pem`
pub fn rsa_2048() -> FixtureSpec {
    FixtureSpec::rsa("rsa_2048", 2048)
        .signature_hash(SignatureHash::Sha256)
        .organization("bogo")
        .san("test")
        .san("example.com")
        .files("key.pem", "cert.pem")
}

/// RSA-1024 / SHA-1
pub fn rsa_1024() -> FixtureSpec {
    FixtureSpec::rsa("rsa_1024", 1024)
        .signature_hash(SignatureHash::Sha1)
        .organization("bogo-rsa1024")
        .san("test")
}

/// CA used to sign `rsa_chain`; never written as a fixture of its own
pub fn rsa_chain_ca() -> FixtureSpec {
    FixtureSpec::rsa(CHAIN_CA_NAME, 2048)
        .signature_hash(SignatureHash::Sha256)
        .organization("bogo-ca")
        .ca(true)
}

/// RSA-2048 / SHA-256 leaf signed by [`rsa_chain_ca`]
pub fn rsa_chain() -> FixtureSpec {
    FixtureSpec::rsa("rsa_chain", 2048)
        .signature_hash(SignatureHash::Sha256)
        .organization("bogo-rsa-chain")
        .san("test")
        .issued_by(rsa_chain_ca())
}

/// ECDSA P-256 / SHA-1
pub fn ecdsa_p256() -> FixtureSpec {
    FixtureSpec::ecdsa("ecdsa_p256", EcCurve::P256)
        .signature_hash(SignatureHash::Sha1)
        .organization("bogo-p256")
        .san("test")
}

/// ECDSA P-384 / SHA-1
pub fn ecdsa_p384() -> FixtureSpec {
    FixtureSpec::ecdsa("ecdsa_p384", EcCurve::P384)
        .signature_hash(SignatureHash::Sha1)
        .organization("bogo-p384")
        .san("test")
}

/// The five BoGo fixtures, in generation order
pub fn bogo_fixtures() -> Vec<FixtureSpec> {
    vec![rsa_2048(), rsa_1024(), rsa_chain(), ecdsa_p256(), ecdsa_p384()]
}

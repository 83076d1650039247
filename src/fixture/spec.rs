//! Fixture specifications
//!
//! A `FixtureSpec` describes the shape of one key/certificate pair: key
//! algorithm, signature digest, subject, SANs, validity and an optional
//! issuer. Specs are plain data and can be built in code or loaded from a
//! TOML manifest.

use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use serde::{Deserialize, Serialize};

/// Validity used by every built-in fixture
pub const DEFAULT_VALIDITY_DAYS: u32 = 3650;

/// Smallest RSA modulus OpenSSL will generate
pub const MIN_RSA_BITS: u32 = 512;

/// Largest RSA modulus we are willing to generate
pub const MAX_RSA_BITS: u32 = 16384;

/// Named elliptic curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcCurve {
    /// NIST P-256 (prime256v1)
    P256,
    /// NIST P-384 (secp384r1)
    P384,
    /// NIST P-521 (secp521r1)
    P521,
}

impl EcCurve {
    /// OpenSSL curve identifier
    pub fn nid(&self) -> Nid {
        match self {
            EcCurve::P256 => Nid::X9_62_PRIME256V1,
            EcCurve::P384 => Nid::SECP384R1,
            EcCurve::P521 => Nid::SECP521R1,
        }
    }

    /// Map an OpenSSL curve identifier back to a curve
    pub fn from_nid(nid: Nid) -> Option<Self> {
        match nid {
            Nid::X9_62_PRIME256V1 => Some(EcCurve::P256),
            Nid::SECP384R1 => Some(EcCurve::P384),
            Nid::SECP521R1 => Some(EcCurve::P521),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EcCurve::P256 => "P-256",
            EcCurve::P384 => "P-384",
            EcCurve::P521 => "P-521",
        }
    }
}

/// Key algorithm together with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum KeyAlgorithm {
    /// RSA with the given modulus size
    Rsa { bits: u32 },
    /// ECDSA over a named curve
    Ecdsa { curve: EcCurve },
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyAlgorithm::Rsa { bits } => write!(f, "RSA-{}", bits),
            KeyAlgorithm::Ecdsa { curve } => write!(f, "ECDSA {}", curve.as_str()),
        }
    }
}

/// Digest used for the certificate signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureHash {
    Sha1,
    Sha256,
}

impl SignatureHash {
    pub fn message_digest(&self) -> MessageDigest {
        match self {
            SignatureHash::Sha1 => MessageDigest::sha1(),
            SignatureHash::Sha256 => MessageDigest::sha256(),
        }
    }

    /// Map a digest identifier (as found in a signature algorithm) back to a hash
    pub fn from_nid(nid: Nid) -> Option<Self> {
        match nid {
            Nid::SHA1 => Some(SignatureHash::Sha1),
            Nid::SHA256 => Some(SignatureHash::Sha256),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureHash::Sha1 => "SHA-1",
            SignatureHash::Sha256 => "SHA-256",
        }
    }
}

fn default_validity_days() -> u32 {
    DEFAULT_VALIDITY_DAYS
}

/// Description of one key/certificate fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSpec {
    /// Fixture identifier, unique within a batch
    pub name: String,

    /// Key algorithm and parameters
    pub key: KeyAlgorithm,

    /// Signature digest
    pub signature_hash: SignatureHash,

    /// Subject organization; the subject is exactly `O=<organization>`
    pub organization: String,

    /// DNS names for the SAN extension, in order
    #[serde(default)]
    pub subject_alt_names: Vec<String>,

    #[serde(default = "default_validity_days")]
    pub validity_days: u32,

    /// Issuer for chained fixtures; `None` means self-signed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Box<FixtureSpec>>,

    /// Issue a CA certificate (basicConstraints CA:TRUE)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ca: bool,

    /// Override for the private key file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,

    /// Override for the certificate file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<String>,
}

impl FixtureSpec {
    /// Start a self-signed RSA spec with the defaults of the built-in table
    pub fn rsa(name: impl Into<String>, bits: u32) -> Self {
        Self::new(name, KeyAlgorithm::Rsa { bits })
    }

    /// Start a self-signed ECDSA spec
    pub fn ecdsa(name: impl Into<String>, curve: EcCurve) -> Self {
        Self::new(name, KeyAlgorithm::Ecdsa { curve })
    }

    fn new(name: impl Into<String>, key: KeyAlgorithm) -> Self {
        let name = name.into();
        FixtureSpec {
            organization: name.clone(),
            name,
            key,
            signature_hash: SignatureHash::Sha256,
            subject_alt_names: Vec::new(),
            validity_days: DEFAULT_VALIDITY_DAYS,
            issuer: None,
            ca: false,
            key_file: None,
            cert_file: None,
        }
    }

    pub fn signature_hash(mut self, hash: SignatureHash) -> Self {
        self.signature_hash = hash;
        self
    }

    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.organization = org.into();
        self
    }

    /// Append a DNS name to the SAN list
    pub fn san(mut self, dns: impl Into<String>) -> Self {
        self.subject_alt_names.push(dns.into());
        self
    }

    pub fn validity_days(mut self, days: u32) -> Self {
        self.validity_days = days;
        self
    }

    /// Have `issuer` sign this fixture instead of self-signing
    pub fn issued_by(mut self, issuer: FixtureSpec) -> Self {
        self.issuer = Some(Box::new(issuer));
        self
    }

    pub fn ca(mut self, ca: bool) -> Self {
        self.ca = ca;
        self
    }

    /// Set both output file names
    pub fn files(mut self, key_file: impl Into<String>, cert_file: impl Into<String>) -> Self {
        self.key_file = Some(key_file.into());
        self.cert_file = Some(cert_file.into());
        self
    }

    /// Private key file name relative to the output root
    pub fn key_file_name(&self) -> String {
        self.key_file
            .clone()
            .unwrap_or_else(|| format!("{}_key.pem", self.name))
    }

    /// Certificate file name relative to the output root
    pub fn cert_file_name(&self) -> String {
        self.cert_file
            .clone()
            .unwrap_or_else(|| format!("{}_cert.pem", self.name))
    }

    /// Number of issuer certificates above this one
    pub fn chain_depth(&self) -> usize {
        match &self.issuer {
            Some(issuer) => 1 + issuer.chain_depth(),
            None => 0,
        }
    }

    /// Whether this fixture signs itself
    pub fn is_self_signed(&self) -> bool {
        self.issuer.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_names() {
        let spec = FixtureSpec::rsa("rsa_1024", 1024);
        assert_eq!(spec.key_file_name(), "rsa_1024_key.pem");
        assert_eq!(spec.cert_file_name(), "rsa_1024_cert.pem");

        let spec = spec.files("key.pem", "cert.pem");
        assert_eq!(spec.key_file_name(), "key.pem");
        assert_eq!(spec.cert_file_name(), "cert.pem");
    }

    #[test]
    fn test_builder_defaults() {
        let spec = FixtureSpec::ecdsa("ecdsa_p256", EcCurve::P256);
        assert_eq!(spec.organization, "ecdsa_p256");
        assert_eq!(spec.signature_hash, SignatureHash::Sha256);
        assert_eq!(spec.validity_days, DEFAULT_VALIDITY_DAYS);
        assert!(spec.is_self_signed());
        assert!(!spec.ca);
    }

    #[test]
    fn test_chain_depth() {
        let root = FixtureSpec::rsa("root", 2048).ca(true);
        let mid = FixtureSpec::rsa("mid", 2048).ca(true).issued_by(root);
        let leaf = FixtureSpec::rsa("leaf", 2048).issued_by(mid);
        assert_eq!(leaf.chain_depth(), 2);
        assert!(!leaf.is_self_signed());
    }

    #[test]
    fn test_curve_nid_mapping() {
        for curve in [EcCurve::P256, EcCurve::P384, EcCurve::P521] {
            assert_eq!(EcCurve::from_nid(curve.nid()), Some(curve));
        }
        assert_eq!(EcCurve::from_nid(Nid::SHA1), None);
    }

    #[test]
    fn test_key_algorithm_display() {
        assert_eq!(KeyAlgorithm::Rsa { bits: 2048 }.to_string(), "RSA-2048");
        assert_eq!(
            KeyAlgorithm::Ecdsa { curve: EcCurve::P384 }.to_string(),
            "ECDSA P-384"
        );
    }
}

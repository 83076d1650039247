//! Certificate inspection
//!
//! Extracts the shape of a certificate (subject, issuer, SANs, algorithms,
//! validity span) and compares it with the `FixtureSpec` it should have been
//! generated from.

use openssl::nid::Nid;
use openssl::pkey::{Id, PKey, Private};
use openssl::x509::{X509NameRef, X509Ref, X509};

use super::spec::{EcCurve, FixtureSpec, KeyAlgorithm, SignatureHash};
use super::{Error, Result};

/// Certificate information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertInfo {
    /// Subject organization (O)
    pub organization: String,
    /// Issuer organization (O)
    pub issuer_organization: String,
    /// DNS names from the SAN extension, in certificate order
    pub subject_alt_names: Vec<String>,
    /// Digest of the signature algorithm, if it is one we generate
    pub signature_hash: Option<SignatureHash>,
    /// Public key algorithm, if it is one we generate
    pub key: Option<KeyAlgorithm>,
    /// notAfter - notBefore, in seconds
    pub validity_secs: i64,
    /// basicConstraints CA flag
    pub is_ca: bool,
}

impl CertInfo {
    /// Extract certificate information from an X.509 certificate
    pub fn from_x509(cert: &X509Ref) -> Self {
        CertInfo {
            organization: Self::get_org(cert.subject_name()),
            issuer_organization: Self::get_org(cert.issuer_name()),
            subject_alt_names: Self::get_dns_names(cert),
            signature_hash: Self::get_signature_hash(cert),
            key: Self::get_key_algorithm(cert),
            validity_secs: Self::get_validity_secs(cert),
            is_ca: Self::get_is_ca(cert),
        }
    }

    /// Get Organization from X509_NAME
    fn get_org(name: &X509NameRef) -> String {
        name.entries_by_nid(Nid::ORGANIZATIONNAME)
            .next()
            .and_then(|entry| entry.data().as_utf8().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "<undef>".to_string())
    }

    fn get_dns_names(cert: &X509Ref) -> Vec<String> {
        cert.subject_alt_names()
            .map(|names| {
                names
                    .iter()
                    .filter_map(|name| name.dnsname().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get_signature_hash(cert: &X509Ref) -> Option<SignatureHash> {
        cert.signature_algorithm()
            .object()
            .nid()
            .signature_algorithms()
            .and_then(|algs| SignatureHash::from_nid(algs.digest))
    }

    fn get_key_algorithm(cert: &X509Ref) -> Option<KeyAlgorithm> {
        let key = cert.public_key().ok()?;
        match key.id() {
            Id::RSA => Some(KeyAlgorithm::Rsa { bits: key.bits() }),
            Id::EC => {
                let ec = key.ec_key().ok()?;
                let curve = EcCurve::from_nid(ec.group().curve_name()?)?;
                Some(KeyAlgorithm::Ecdsa { curve })
            }
            _ => None,
        }
    }

    fn get_validity_secs(cert: &X509Ref) -> i64 {
        cert.not_before()
            .diff(cert.not_after())
            .map(|diff| i64::from(diff.days) * 24 * 60 * 60 + i64::from(diff.secs))
            .unwrap_or(0)
    }

    fn get_is_ca(cert: &X509Ref) -> bool {
        // No basicConstraints accessor in the openssl crate; read the value
        // line under the extension header of the text dump
        let Ok(text) = cert.to_text() else {
            return false;
        };
        let text = String::from_utf8_lossy(&text);
        let mut lines = text.lines().map(str::trim);
        while let Some(line) = lines.next() {
            if line.starts_with("X509v3 Basic Constraints:") {
                return lines
                    .next()
                    .map(|value| value.split(',').any(|field| field.trim() == "CA:TRUE"))
                    .unwrap_or(false);
            }
        }
        false
    }

    /// Compare against a spec, describing the first difference found
    pub fn check(&self, spec: &FixtureSpec) -> std::result::Result<(), String> {
        if self.organization != spec.organization {
            return Err(format!(
                "subject O={} (expected O={})",
                self.organization, spec.organization
            ));
        }
        if self.subject_alt_names != spec.subject_alt_names {
            return Err(format!(
                "SAN {:?} (expected {:?})",
                self.subject_alt_names, spec.subject_alt_names
            ));
        }
        if self.signature_hash != Some(spec.signature_hash) {
            return Err(format!(
                "signature digest {:?} (expected {})",
                self.signature_hash,
                spec.signature_hash.as_str()
            ));
        }
        if self.key != Some(spec.key) {
            return Err(format!("key {:?} (expected {})", self.key, spec.key));
        }
        let expected_secs = i64::from(spec.validity_days) * 24 * 60 * 60;
        if self.validity_secs != expected_secs {
            return Err(format!(
                "validity of {}s (expected {}s)",
                self.validity_secs, expected_secs
            ));
        }
        if self.is_ca != spec.ca {
            return Err(format!("CA flag {} (expected {})", self.is_ca, spec.ca));
        }

        let expected_issuer = match &spec.issuer {
            Some(issuer) => &issuer.organization,
            None => &spec.organization,
        };
        if &self.issuer_organization != expected_issuer {
            return Err(format!(
                "issuer O={} (expected O={})",
                self.issuer_organization, expected_issuer
            ));
        }
        Ok(())
    }
}

/// Check a fixture's key and certificate PEM against its spec
///
/// The certificate PEM must hold the leaf followed by one certificate per
/// issuer. Each block's subject must equal the previous block's issuer and the
/// private key must match the leaf. Chains are not path-validated.
pub fn check_fixture(spec: &FixtureSpec, key_pem: &[u8], cert_pem: &[u8]) -> Result<()> {
    let name = spec.name.as_str();

    let key: PKey<Private> = PKey::private_key_from_pem(key_pem)
        .map_err(|e| Error::mismatch(name, format!("unreadable private key: {}", e)))?;
    let chain = X509::stack_from_pem(cert_pem)
        .map_err(|e| Error::mismatch(name, format!("unreadable certificate: {}", e)))?;

    let expected_blocks = 1 + spec.chain_depth();
    if chain.len() != expected_blocks {
        return Err(Error::mismatch(
            name,
            format!(
                "{} certificate blocks (expected {})",
                chain.len(),
                expected_blocks
            ),
        ));
    }

    let leaf_key = chain[0]
        .public_key()
        .map_err(|e| Error::mismatch(name, e))?;
    if !leaf_key.public_eq(&*key) {
        return Err(Error::mismatch(name, "private key does not match certificate"));
    }

    let mut expected = Some(spec);
    for (index, cert) in chain.iter().enumerate() {
        let Some(current) = expected else { break };
        CertInfo::from_x509(cert)
            .check(current)
            .map_err(|reason| Error::mismatch(name, format!("block {}: {}", index, reason)))?;

        if let Some(next) = chain.get(index + 1) {
            if !same_name(next.subject_name(), cert.issuer_name()) {
                return Err(Error::mismatch(
                    name,
                    format!("block {} subject is not block {} issuer", index + 1, index),
                ));
            }
        }
        expected = current.issuer.as_deref();
    }

    Ok(())
}

fn same_name(a: &X509NameRef, b: &X509NameRef) -> bool {
    match (a.to_der(), b.to_der()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

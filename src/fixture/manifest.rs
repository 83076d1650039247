//! TOML fixture manifests
//!
//! A manifest lists fixtures as `[[fixture]]` tables; issuers are nested
//! `[fixture.issuer]` tables:
//!
//! ```toml
//! [[fixture]]
//! name = "rsa_chain"
//! key = { algorithm = "rsa", bits = 2048 }
//! signature_hash = "sha256"
//! organization = "bogo-rsa-chain"
//! subject_alt_names = ["test"]
//!
//! [fixture.issuer]
//! name = "rsa_chain_ca"
//! key = { algorithm = "rsa", bits = 2048 }
//! signature_hash = "sha256"
//! organization = "bogo-ca"
//! ca = true
//! ```

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::catalog;
use super::generator::check_batch;
use super::spec::FixtureSpec;
use super::{Error, Result};

/// A list of fixture specs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "fixture", default)]
    pub fixtures: Vec<FixtureSpec>,
}

impl Manifest {
    /// The built-in BoGo fixtures
    pub fn bogo() -> Self {
        Manifest {
            fixtures: catalog::bogo_fixtures(),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(text).map_err(|e| Error::Manifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Manifest(format!("{}: {}", path.display(), e)))?;
        let manifest = Self::from_toml(&text)?;
        debug!(
            "Loaded {} fixtures from {}",
            manifest.fixtures.len(),
            path.display()
        );
        Ok(manifest)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Manifest(e.to_string()))
    }

    /// Keep only the named fixtures, in manifest order
    pub fn select(self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }
        for name in names {
            if !self.fixtures.iter().any(|f| &f.name == name) {
                return Err(Error::Manifest(format!("no fixture named {:?}", name)));
            }
        }
        Ok(Manifest {
            fixtures: self
                .fixtures
                .into_iter()
                .filter(|f| names.contains(&f.name))
                .collect(),
        })
    }

    fn validate(&self) -> Result<()> {
        if self.fixtures.is_empty() {
            return Err(Error::Manifest("no [[fixture]] tables".to_string()));
        }
        for spec in &self.fixtures {
            let mut current = Some(spec);
            while let Some(spec) = current {
                check_spec(spec)?;
                current = spec.issuer.as_deref();
            }
        }
        check_batch(&self.fixtures).map_err(|e| Error::Manifest(e.to_string()))
    }
}

fn check_spec(spec: &FixtureSpec) -> Result<()> {
    if spec.name.is_empty() {
        return Err(Error::Manifest("fixture with an empty name".to_string()));
    }
    for file in [&spec.key_file, &spec.cert_file].into_iter().flatten() {
        if !is_plain_file_name(file) {
            return Err(Error::Manifest(format!(
                "{}: output file {:?} must be a plain file name",
                spec.name, file
            )));
        }
    }
    if spec.key_file_name() == spec.cert_file_name() {
        return Err(Error::Manifest(format!(
            "{}: key and certificate share the file {:?}",
            spec.name,
            spec.key_file_name()
        )));
    }
    Ok(())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::spec::{EcCurve, KeyAlgorithm, SignatureHash};

    const CHAIN: &str = r#"
[[fixture]]
name = "rsa_chain"
key = { algorithm = "rsa", bits = 2048 }
signature_hash = "sha256"
organization = "bogo-rsa-chain"
subject_alt_names = ["test"]

[fixture.issuer]
name = "rsa_chain_ca"
key = { algorithm = "rsa", bits = 2048 }
signature_hash = "sha256"
organization = "bogo-ca"
ca = true

[[fixture]]
name = "ecdsa_p256"
key = { algorithm = "ecdsa", curve = "p256" }
signature_hash = "sha1"
organization = "bogo-p256"
subject_alt_names = ["test"]
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_toml(CHAIN).unwrap();
        assert_eq!(manifest.fixtures.len(), 2);
        assert_eq!(manifest.fixtures[0], catalog::rsa_chain());
        assert_eq!(manifest.fixtures[1], catalog::ecdsa_p256());

        let p256 = &manifest.fixtures[1];
        assert_eq!(p256.key, KeyAlgorithm::Ecdsa { curve: EcCurve::P256 });
        assert_eq!(p256.signature_hash, SignatureHash::Sha1);
        assert_eq!(p256.validity_days, 3650);
    }

    #[test]
    fn test_bogo_roundtrip() {
        let text = Manifest::bogo().to_toml().unwrap();
        assert_eq!(Manifest::from_toml(&text).unwrap(), Manifest::bogo());
    }

    #[test]
    fn test_select() {
        let manifest = Manifest::bogo()
            .select(&["ecdsa_p384".to_string(), "rsa_1024".to_string()])
            .unwrap();
        let names: Vec<&str> = manifest.fixtures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["rsa_1024", "ecdsa_p384"]);

        let err = Manifest::bogo().select(&["nope".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }

    #[test]
    fn test_rejects_path_in_file_name() {
        let text = r#"
[[fixture]]
name = "escape"
key = { algorithm = "rsa", bits = 2048 }
signature_hash = "sha256"
organization = "x"
key_file = "../key.pem"
"#;
        let err = Manifest::from_toml(text).unwrap_err();
        assert!(err.to_string().contains("plain file name"), "{}", err);
    }

    #[test]
    fn test_rejects_shared_output_file() {
        let text = r#"
[[fixture]]
name = "a"
key = { algorithm = "ecdsa", curve = "p256" }
signature_hash = "sha256"
organization = "a"
key_file = "key.pem"
cert_file = "cert.pem"

[[fixture]]
name = "b"
key = { algorithm = "ecdsa", curve = "p256" }
signature_hash = "sha256"
organization = "b"
key_file = "key.pem"
cert_file = "b_cert.pem"
"#;
        let err = Manifest::from_toml(text).unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
        assert!(err.to_string().contains("key.pem"), "{}", err);
    }

    #[test]
    fn test_rejects_unknown_curve() {
        let text = r#"
[[fixture]]
name = "ecdsa_k256"
key = { algorithm = "ecdsa", curve = "secp256k1" }
signature_hash = "sha256"
organization = "x"
"#;
        assert!(matches!(
            Manifest::from_toml(text).unwrap_err(),
            Error::Manifest(_)
        ));
    }

    #[test]
    fn test_rejects_empty_manifest() {
        assert!(matches!(
            Manifest::from_toml("").unwrap_err(),
            Error::Manifest(_)
        ));
    }
}

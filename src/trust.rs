//! System trust store installation
//!
//! An optional post-step after fixture generation: copy a CA certificate into
//! the platform's trust anchor location and run the platform's refresh
//! command. This usually needs elevated privileges. The fixture generator
//! never calls it; the `bogo-certs` binary does when asked to.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;
use openssl::x509::X509;

use crate::fixture::{Error, GeneratedFixture, Result};

/// Placeholder in refresh command arguments for the installed certificate path
pub const CERT_PLACEHOLDER: &str = "{cert}";

/// A trust anchor directory plus the command that makes the system pick it up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustStore {
    anchor_dir: PathBuf,
    file_name: String,
    refresh: Vec<String>,
}

impl TrustStore {
    /// Trust store with no refresh command
    pub fn new(anchor_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        TrustStore {
            anchor_dir: anchor_dir.into(),
            file_name: file_name.into(),
            refresh: Vec::new(),
        }
    }

    /// Command run after the certificate is in place; `{cert}` is replaced
    /// with the installed path
    pub fn refresh_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.refresh = command.into_iter().map(Into::into).collect();
        self
    }

    /// Platform default for a CA named `stem`, or `None` where unsupported
    pub fn system(stem: &str) -> Option<Self> {
        cfg_if::cfg_if! {
            if #[cfg(target_os = "linux")] {
                Some(
                    TrustStore::new("/usr/local/share/ca-certificates", format!("{}.crt", stem))
                        .refresh_command(["update-ca-certificates"]),
                )
            } else if #[cfg(target_os = "macos")] {
                Some(
                    TrustStore::new(std::env::temp_dir(), format!("{}.crt", stem)).refresh_command([
                        "security",
                        "add-trusted-cert",
                        "-d",
                        "-r",
                        "trustRoot",
                        "-k",
                        "/Library/Keychains/System.keychain",
                        CERT_PLACEHOLDER,
                    ]),
                )
            } else {
                log::warn!("No system trust store support for this platform ({})", stem);
                None
            }
        }
    }

    /// Where the certificate is written
    pub fn target(&self) -> PathBuf {
        self.anchor_dir.join(&self.file_name)
    }

    /// Install a PEM certificate and run the refresh command
    pub fn install(&self, cert_pem: &[u8]) -> Result<PathBuf> {
        X509::from_pem(cert_pem)
            .map_err(|e| Error::TrustStore(format!("not a PEM certificate: {}", e)))?;

        let target = self.target();
        fs::create_dir_all(&self.anchor_dir).map_err(|e| {
            Error::TrustStore(format!("{}: {}", self.anchor_dir.display(), e))
        })?;
        fs::write(&target, cert_pem)
            .map_err(|e| Error::TrustStore(format!("{}: {}", target.display(), e)))?;
        info!("Copied CA certificate to {}", target.display());

        self.run_refresh(&target)?;
        Ok(target)
    }

    /// Install the leaf certificate of a generated fixture
    pub fn install_fixture(&self, fixture: &GeneratedFixture) -> Result<PathBuf> {
        self.install(&fixture.leaf_certificate_pem()?)
    }

    fn run_refresh(&self, target: &Path) -> Result<()> {
        let Some((program, args)) = self.refresh.split_first() else {
            return Ok(());
        };

        let cert = target.to_string_lossy();
        let args: Vec<String> = args
            .iter()
            .map(|arg| arg.replace(CERT_PLACEHOLDER, &cert))
            .collect();

        let output = Command::new(program)
            .args(&args)
            .output()
            .map_err(|e| Error::TrustStore(format!("failed to run {}: {}", program, e)))?;

        if output.status.success() {
            info!("Trust store refreshed with {}", program);
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::TrustStore(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::catalog;
    use crate::fixture::generator::CertificateFixtureGenerator;
    use crate::fixture::spec::{EcCurve, FixtureSpec};
    use tempfile::TempDir;

    fn ca() -> GeneratedFixture {
        CertificateFixtureGenerator::new()
            .generate(&FixtureSpec::ecdsa(catalog::CHAIN_CA_NAME, EcCurve::P256).ca(true))
            .unwrap()
    }

    #[test]
    fn test_install_without_refresh() {
        let dir = TempDir::new().unwrap();
        let store = TrustStore::new(dir.path().join("anchors"), "bogo-ca.crt");
        let fixture = ca();

        let path = store.install_fixture(&fixture).unwrap();
        assert_eq!(path, dir.path().join("anchors").join("bogo-ca.crt"));
        assert_eq!(fs::read(&path).unwrap(), fixture.leaf_certificate_pem().unwrap());
    }

    #[test]
    fn test_rejects_non_certificate() {
        let dir = TempDir::new().unwrap();
        let store = TrustStore::new(dir.path(), "bogo-ca.crt");

        let err = store.install(b"not a certificate").unwrap_err();
        assert!(matches!(err, Error::TrustStore(_)));
        assert!(!store.target().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_refresh_sees_installed_file() {
        let dir = TempDir::new().unwrap();
        let store = TrustStore::new(dir.path(), "bogo-ca.crt")
            .refresh_command(["test", "-f", CERT_PLACEHOLDER]);

        store.install_fixture(&ca()).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_refresh() {
        let dir = TempDir::new().unwrap();
        let store = TrustStore::new(dir.path(), "bogo-ca.crt").refresh_command(["false"]);

        let err = store.install_fixture(&ca()).unwrap_err();
        assert!(err.to_string().contains("false exited"), "{}", err);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_default() {
        let store = TrustStore::system("bogo-ca").unwrap();
        assert_eq!(
            store.target(),
            PathBuf::from("/usr/local/share/ca-certificates/bogo-ca.crt")
        );
    }
}

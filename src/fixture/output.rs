//! Fixture output
//!
//! Writes generated fixtures under an output root and reads them back for
//! checking. Each file is written to a temporary file in the root and renamed
//! into place, so a failed write never leaves a truncated file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use super::generator::{FixtureSet, GeneratedFixture};
use super::inspect::check_fixture;
use super::spec::FixtureSpec;
use super::{Error, Result};

/// Output root used when none is given
pub const DEFAULT_OUTPUT_DIR: &str = "keys";

/// Paths of one fixture on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePaths {
    pub key: PathBuf,
    pub cert: PathBuf,
}

/// Writes fixtures under an output root
#[derive(Debug, Clone)]
pub struct FixtureWriter {
    root: PathBuf,
}

impl Default for FixtureWriter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl FixtureWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FixtureWriter { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a spec's files live under this root
    pub fn paths(&self, spec: &FixtureSpec) -> FixturePaths {
        FixturePaths {
            key: self.root.join(spec.key_file_name()),
            cert: self.root.join(spec.cert_file_name()),
        }
    }

    /// Write one fixture's key and certificate
    ///
    /// Both files are staged before either is renamed into place.
    pub fn write(&self, fixture: &GeneratedFixture) -> Result<FixturePaths> {
        let name = fixture.name.as_str();
        fs::create_dir_all(&self.root).map_err(|e| Error::io(name, &self.root, e))?;

        let paths = self.paths(&fixture.spec);
        let key = self.stage(name, &paths.key, &fixture.private_key_pem, true)?;
        let cert = self.stage(name, &paths.cert, &fixture.certificate_pem, false)?;

        key.persist(&paths.key)
            .map_err(|e| Error::io(name, &paths.key, e.error))?;
        cert.persist(&paths.cert)
            .map_err(|e| Error::io(name, &paths.cert, e.error))?;

        debug!(
            "{}: wrote {} and {}",
            name,
            paths.key.display(),
            paths.cert.display()
        );
        Ok(paths)
    }

    /// Write every fixture of a set, in order, stopping at the first failure
    pub fn write_all(&self, set: &FixtureSet) -> Result<Vec<FixturePaths>> {
        let paths = set
            .iter()
            .map(|fixture| self.write(fixture))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Wrote {} fixtures to {}",
            paths.len(),
            self.root.display()
        );
        Ok(paths)
    }

    /// Read a fixture back and check it against its spec
    pub fn check(&self, spec: &FixtureSpec) -> Result<()> {
        let name = spec.name.as_str();
        let paths = self.paths(spec);

        let key_pem = fs::read(&paths.key).map_err(|e| Error::io(name, &paths.key, e))?;
        let cert_pem = fs::read(&paths.cert).map_err(|e| Error::io(name, &paths.cert, e))?;

        check_fixture(spec, &key_pem, &cert_pem)?;
        debug!("{}: fixture matches its spec", name);
        Ok(())
    }

    /// Check every spec, stopping at the first failure
    pub fn check_all(&self, specs: &[FixtureSpec]) -> Result<()> {
        for spec in specs {
            self.check(spec)?;
        }
        info!(
            "{} fixtures under {} match their specs",
            specs.len(),
            self.root.display()
        );
        Ok(())
    }

    fn stage(&self, name: &str, target: &Path, contents: &[u8], private: bool) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new_in(&self.root).map_err(|e| Error::io(name, &self.root, e))?;
        file.write_all(contents)
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| Error::io(name, target, e))?;

        // NamedTempFile is created 0600; certificates are public
        if !private {
            make_world_readable(&file).map_err(|e| Error::io(name, target, e))?;
        }

        Ok(file)
    }
}

#[cfg(unix)]
fn make_world_readable(file: &NamedTempFile) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.as_file().set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn make_world_readable(_file: &NamedTempFile) -> std::io::Result<()> {
    Ok(())
}

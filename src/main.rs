mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use bogo_certs::fixture::{CertificateFixtureGenerator, FixtureWriter, Manifest};
use bogo_certs::TrustStore;

fn main() {
    env_logger::Builder::new()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = real_main() {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<()> {
    let args = cli::Args::parse();
    let manifest = load_manifest(args.manifest.as_deref())?;

    match args.sub.unwrap_or(cli::Cmd::Generate {
        out: PathBuf::from(bogo_certs::fixture::DEFAULT_OUTPUT_DIR),
        only: Vec::new(),
        install_ca: false,
        trust_dir: None,
    }) {
        cli::Cmd::Generate {
            out,
            only,
            install_ca,
            trust_dir,
        } => handle_generate(manifest, &out, &only, install_ca, trust_dir),
        cli::Cmd::Check { out } => handle_check(&manifest, &out),
        cli::Cmd::List => handle_list(&manifest),
    }
}

fn load_manifest(path: Option<&Path>) -> Result<Manifest> {
    match path {
        Some(path) => Manifest::load(path)
            .with_context(|| format!("Failed to load manifest {}", path.display())),
        None => Ok(Manifest::bogo()),
    }
}

fn handle_generate(
    manifest: Manifest,
    out: &Path,
    only: &[String],
    install_ca: bool,
    trust_dir: Option<PathBuf>,
) -> Result<()> {
    let manifest = manifest.select(only)?;

    let fixtures = CertificateFixtureGenerator::new()
        .generate_all(&manifest.fixtures)
        .context("Fixture generation failed")?;

    FixtureWriter::new(out)
        .write_all(&fixtures)
        .context("Failed to write fixtures")?;

    if install_ca {
        let mut installed = 0;
        for ca in fixtures.ca_certificates() {
            let store = match &trust_dir {
                Some(dir) => TrustStore::new(dir, format!("{}.crt", ca.name)),
                None => match TrustStore::system(&ca.name) {
                    Some(store) => store,
                    None => continue,
                },
            };
            let path = store
                .install_fixture(ca)
                .with_context(|| format!("Failed to install CA {}", ca.name))?;
            info!("Installed CA {} at {}", ca.name, path.display());
            installed += 1;
        }
        if installed == 0 {
            warn!("--install-ca given but no CA certificate was installed");
        }
    }

    Ok(())
}

fn handle_check(manifest: &Manifest, out: &Path) -> Result<()> {
    FixtureWriter::new(out)
        .check_all(&manifest.fixtures)
        .with_context(|| format!("Fixtures under {} do not match", out.display()))
}

fn handle_list(manifest: &Manifest) -> Result<()> {
    for spec in &manifest.fixtures {
        let issuer = match &spec.issuer {
            Some(issuer) => format!("signed by {}", issuer.name),
            None => "self-signed".to_string(),
        };
        println!(
            "{:<12} {:<12} {:<8} O={:<14} {} / {} ({})",
            spec.name,
            spec.key.to_string(),
            spec.signature_hash.as_str(),
            spec.organization,
            spec.key_file_name(),
            spec.cert_file_name(),
            issuer
        );
    }
    Ok(())
}

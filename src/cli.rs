use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bogo_certs::fixture::DEFAULT_OUTPUT_DIR;

#[derive(Parser, Debug)]
#[command(version, about = "Generate TLS test fixture certificates")]
pub struct Args {
    /// Fixture manifest (TOML); the built-in BoGo fixtures if omitted
    #[arg(long, short = 'm', global = true)]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub sub: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Generate fixtures (default if no sub-command)
    Generate {
        /// Output directory
        #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_DIR)]
        out: PathBuf,

        /// Only generate the named fixtures (repeatable)
        #[arg(long = "only")]
        only: Vec<String>,

        /// Install generated CA certificates into the system trust store
        #[arg(long)]
        install_ca: bool,

        /// Trust anchor directory to use instead of the system one
        #[arg(long, requires = "install_ca")]
        trust_dir: Option<PathBuf>,
    },
    /// Check fixtures on disk against their specs (Exit 0 = all match)
    Check {
        /// Output directory
        #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_DIR)]
        out: PathBuf,
    },
    /// List fixtures and their output files
    List,
}

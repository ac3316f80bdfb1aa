use anyhow::Result;
use clap::Parser;
use docprep::commands::{self, Config, Options};
use docprep::provision::LinkSpec;
use docprep::version::PrimaryVersion;
use std::path::PathBuf;

/// docprep - documentation build preparation
///
/// Links machine test fixtures from companion repositories into the docs
/// tree and checks that companion version requirements match.
///
/// Examples:
///   docprep setup                               # Provision all configured links
///   docprep link mpf_examples mpf mpf           # Link ../mpf/mpf/tests/machine_files
///   docprep verify-version _version.py --expected 0.50
#[derive(Parser, Debug)]
#[command(author, version = env!("DOCPREP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Docs working directory (defaults to the current directory; also via DOCPREP_DIR)
    #[arg(
        long = "dir",
        short = 'C',
        env = "DOCPREP_DIR",
        value_name = "PATH",
        global = true
    )]
    pub dir: Option<PathBuf>,

    /// Branch to clone companion repositories at (defaults to the checked-out branch)
    #[arg(long, env = "DOCPREP_BRANCH", value_name = "NAME", global = true)]
    pub branch: Option<String>,

    /// Base URL companion repositories are cloned from
    #[arg(long = "remote-base", env = "DOCPREP_REMOTE_BASE", value_name = "URL", global = true)]
    pub remote_base: Option<String>,

    /// Settings file (defaults to docprep.json in the working directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Link a companion repository's machine test files into the docs tree
    Link(LinkArgs),

    /// Check that a companion repository requires the primary version
    VerifyVersion(VerifyArgs),

    /// Provision every configured link and run the configured version check
    Setup,

    /// Print the dev documentation warning prolog for dev branches
    Prolog,
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Name of the link to create in the working directory
    #[arg(value_name = "LINK_NAME")]
    pub name: String,

    /// Companion repository name (e.g. mpf-mc)
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Package directory within the repository (e.g. mpfmc)
    #[arg(value_name = "PACKAGE")]
    pub package: String,
}

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    /// Companion version declaration file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Primary codebase's short version
    #[arg(
        long,
        value_name = "VERSION",
        conflicts_with = "primary_file",
        required_unless_present = "primary_file"
    )]
    pub expected: Option<String>,

    /// Read the primary version from the primary codebase's version file
    #[arg(long = "primary-file", value_name = "PATH")]
    pub primary_file: Option<PathBuf>,

    /// Primary codebase name used in messages
    #[arg(long = "primary-name", value_name = "NAME", default_value = "mpf")]
    pub primary_name: String,

    /// Companion repository name used in messages
    #[arg(long = "companion-name", value_name = "NAME", default_value = "mpf-examples")]
    pub companion_name: String,
}

impl VerifyArgs {
    fn primary(&self) -> PrimaryVersion {
        match (&self.expected, &self.primary_file) {
            (Some(version), _) => PrimaryVersion::Literal(version.clone()),
            (None, Some(path)) => PrimaryVersion::File(path.clone()),
            // clap requires one of the two
            (None, None) => unreachable!("--expected or --primary-file is required"),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let options = Options {
        dir: cli.dir,
        branch: cli.branch,
        remote_base: cli.remote_base,
        config: cli.config,
    };
    let config = Config::new(docprep::runtime::RealRuntime, options)?;

    match cli.command {
        Commands::Link(args) => {
            commands::link(config, LinkSpec::new(args.name, args.repo, args.package))?
        }
        Commands::VerifyVersion(args) => {
            let primary = args.primary();
            commands::verify_version(
                config,
                &args.file,
                primary,
                &args.primary_name,
                &args.companion_name,
            )?
        }
        Commands::Setup => commands::setup(config)?,
        Commands::Prolog => commands::prolog(config)?,
    }
    Ok(())
}

//! verstamp - build-identity stamping CLI
//!
//! Resolves which branch/commit the current build comes from and encodes
//! semantic versions as a canonical string plus a sortable numeric code.
//!
//! ## Commands
//!
//! - `stamp`: Resolve provenance and print the full stamped version
//! - `provenance`: Print the resolved branch and commit sha
//! - `code`: Print only the sortable version code

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use verstamp_core::{provenance, Identifier, Metadata, Semantic, DEFAULT_BRANCH_DENYLIST};

#[derive(Parser)]
#[command(name = "verstamp")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build-identity resolver and version stamper", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve provenance and print the stamped version name and code
    Stamp {
        #[command(flatten)]
        version: VersionArgs,

        /// Stamp the current hour as the build time
        #[arg(long)]
        now: bool,

        /// Additional branch names to omit from build metadata, on top of
        /// the default trunk denylist (repeatable)
        #[arg(long = "deny-branch")]
        deny_branches: Vec<String>,

        /// Print a single JSON object instead of text
        #[arg(long)]
        json_output: bool,
    },

    /// Print the resolved branch and commit sha
    Provenance {
        /// Print a single JSON object instead of text
        #[arg(long)]
        json_output: bool,
    },

    /// Print only the sortable version code
    Code {
        #[command(flatten)]
        version: VersionArgs,
    },
}

#[derive(clap::Args)]
struct VersionArgs {
    /// Major version component
    #[arg(long)]
    major: u64,

    /// Minor version component (0-999)
    #[arg(long)]
    minor: u64,

    /// Patch version component (0-999)
    #[arg(long)]
    patch: u64,

    /// Pre-release identifier: alpha, beta, rc, release or snapshot
    #[arg(short, long)]
    identifier: Option<Identifier>,

    /// Incremental build number (0-99999)
    #[arg(short, long)]
    build_number: Option<u32>,
}

#[derive(Serialize)]
struct StampOutput {
    name: String,
    code: i64,
    branch: String,
    sha: String,
}

/// Configure the global subscriber: `RUST_LOG` wins, otherwise DEBUG with
/// `--verbose` and INFO without; `--json` switches to newline-delimited
/// JSON log lines.
fn init_tracing(json: bool, verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json, cli.verbose);

    match cli.command {
        Commands::Stamp {
            version,
            now,
            deny_branches,
            json_output,
        } => cmd_stamp(&version, now, &deny_branches, json_output),
        Commands::Provenance { json_output } => cmd_provenance(json_output),
        Commands::Code { version } => cmd_code(&version),
    }
}

/// Assemble a `Semantic` from CLI args plus resolved provenance.
fn build_version(args: &VersionArgs, metadata: Option<Metadata>) -> Result<Semantic> {
    let mut version = Semantic::new(args.major, args.minor, args.patch)?;
    if let Some(identifier) = args.identifier {
        version = version.with_identifier(identifier);
    }
    if let Some(metadata) = metadata {
        version = version.with_metadata(metadata)?;
    }
    Ok(version)
}

fn cmd_stamp(
    args: &VersionArgs,
    now: bool,
    deny_branches: &[String],
    json_output: bool,
) -> Result<()> {
    let resolved = provenance::resolve();
    info!(branch = %resolved.branch, sha = %resolved.sha, "resolved provenance");

    let mut metadata = Metadata::from_provenance(&resolved, args.build_number);
    if now {
        metadata = metadata.with_build_time_now();
    }
    let version = build_version(args, Some(metadata))?;

    let mut denylist: Vec<&str> = DEFAULT_BRANCH_DENYLIST.to_vec();
    denylist.extend(deny_branches.iter().map(String::as_str));
    let name = version.format_with_denylist(&denylist);

    if json_output {
        let out = StampOutput {
            name,
            code: version.code(),
            branch: resolved.branch,
            sha: resolved.sha,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{name}");
        println!("{}", version.code());
    }
    Ok(())
}

fn cmd_provenance(json_output: bool) -> Result<()> {
    let resolved = provenance::resolve();
    if json_output {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        println!("branch: {}", resolved.branch);
        println!("sha:    {}", resolved.sha);
    }
    Ok(())
}

fn cmd_code(args: &VersionArgs) -> Result<()> {
    let metadata = args.build_number.map(|n| Metadata {
        build_number: Some(n),
        ..Metadata::default()
    });
    let version = build_version(args, metadata)?;
    println!("{}", version.code());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_args_are_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_version_rejects_out_of_range_components() {
        let args = VersionArgs {
            major: 0,
            minor: 1000,
            patch: 0,
            identifier: None,
            build_number: None,
        };
        assert!(build_version(&args, None).is_err());
    }

    #[test]
    fn build_version_carries_identifier_and_build_number() {
        let args = VersionArgs {
            major: 1,
            minor: 2,
            patch: 3,
            identifier: Some(Identifier::Rc),
            build_number: Some(9),
        };
        let metadata = Metadata {
            build_number: args.build_number,
            ..Metadata::default()
        };
        let version = build_version(&args, Some(metadata)).unwrap();
        assert_eq!(version.code(), 1_002_003_200_009);
    }
}

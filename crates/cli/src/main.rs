//! extsync command-line tool.
//!
//! Updates the externals of a source tree in parallel: loads component
//! declarations from an externals or deps-manifest file, reconciles each
//! against its upstream SVN or Git repository, and reports the result.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use extsync_core::manifest::{self, ManifestFormat, DEFAULT_EXTERNALS_FILE};
use extsync_core::report;
use extsync_core::{Dispatcher, DEFAULT_MAX_JOBS};

/// Update source-tree externals in parallel to be faster.
#[derive(Parser, Debug)]
#[command(
    name = "extsync",
    version,
    about = "Update source-tree externals in parallel across SVN and Git"
)]
struct Cli {
    /// Path to the workdir to operate within (defaults to the current directory).
    workdir: Option<PathBuf>,

    /// Number of parallel jobs to run.
    #[arg(short = 'j', long, default_value_t = DEFAULT_MAX_JOBS)]
    maxjobs: usize,

    /// Also reconcile externals declared by fetched components.
    #[arg(short, long)]
    recursive: bool,

    /// Read declarations from this flat externals file.
    #[arg(short = 'c', long, value_name = "FILE")]
    from_file: Option<PathBuf>,

    /// Read declarations from the deps block of this manifest file.
    #[arg(short = 'm', long, value_name = "FILE")]
    from_manifest: Option<PathBuf>,

    /// Read declarations from <workdir>/externals.conf.
    #[arg(short = 'f', long)]
    from_default_file: bool,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_target(false)
        .without_time()
        .init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    if cli.recursive {
        bail!("--recursive is not yet supported");
    }

    let workdir = match cli.workdir {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let workdir = workdir
        .canonicalize()
        .ok()
        .filter(|dir| dir.is_dir())
        .context("specified workdir doesn't exist or is not a directory")?;

    let sources = [
        cli.from_file.is_some(),
        cli.from_manifest.is_some(),
        cli.from_default_file,
    ];
    if sources.iter().filter(|&&selected| selected).count() > 1 {
        bail!("only a single externals source can be specified");
    }

    let (file, format) = if let Some(file) = cli.from_file {
        (file, ManifestFormat::Externals)
    } else if let Some(file) = cli.from_manifest {
        (file, ManifestFormat::Deps)
    } else {
        // Default source, also selected explicitly by --from-default-file.
        (workdir.join(DEFAULT_EXTERNALS_FILE), ManifestFormat::Externals)
    };

    debug!(
        workdir = %workdir.display(),
        maxjobs = cli.maxjobs,
        file = %file.display(),
        "updating externals"
    );

    let components = manifest::load_components(&file, format)
        .with_context(|| format!("failed to load externals from '{}'", file.display()))?;

    let dispatcher = Dispatcher::new(workdir, cli.maxjobs, cli.verbose > 0);
    let processed = dispatcher.run(components).await;
    let summary = report::aggregate(&processed);

    println!();
    println!("  Updated    : {}", summary.updated);
    println!("  Checked out: {}", summary.checked_out);
    println!("  Switched   : {}", summary.switched);
    println!("  Failed     : {}", summary.failed);
    println!("  Conflicted : {}", summary.conflicted);

    Ok(summary.success)
}

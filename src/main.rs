//! Shoebox - JPEG collection maintenance from the command line
//!
//! A toolkit of pipeline stages for photo collections: content-identity
//! deduplication, capture time repair and hard-link reorganization.
//! Stages compose over stdin/stdout; diagnostics go to stderr so they
//! never contaminate piped records.

use anyhow::Result;
use clap::Parser;
use shoebox::cli::Command;
use shoebox::divergence::DivergenceOptions;
use shoebox::identity::IdentityOptions;
use shoebox::meta::reconcile::ReconcileOptions;
use shoebox::organize::OrganizeOptions;
use shoebox::{Cli, Config};
use std::io::{self, Write};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "Shoebox starting");

    if cli.dump_config {
        print!("{}", Config::sample_config());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let Some(command) = cli.command else {
        anyhow::bail!("no command given, try --help");
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    match command {
        Command::Find { root } => {
            shoebox::scan::run(&root, &config, &mut output)?;
        }
        Command::Id {
            preload,
            unlink,
            allowance,
        } => {
            let options = IdentityOptions {
                preload,
                allowance: allowance.unwrap_or(config.duplicate_allowance),
                delete: unlink,
            };
            shoebox::identity::run(stdin.lock(), &mut output, &options)?;
        }
        Command::Uniq { unlink, allowance } => {
            let options = DivergenceOptions {
                allowance: allowance.unwrap_or(config.duplicate_allowance),
                delete: unlink,
            };
            shoebox::divergence::run(stdin.lock(), &mut output, &options)?;
        }
        Command::Rm { basepath } => {
            shoebox::remove::run(stdin.lock(), &basepath)?;
        }
        Command::RExif { action } => {
            shoebox::meta::report::run(stdin.lock(), &mut output, action)?;
        }
        Command::WExif {
            force,
            keep_original,
            simulate,
            basedate,
            delta,
            make,
            model,
        } => {
            let options = ReconcileOptions {
                basedate,
                delta,
                force,
                keep_original,
                simulate,
                make,
                model,
            };
            shoebox::meta::reconcile::run(stdin.lock(), &options)?;
        }
        Command::Org {
            basepath,
            remove_original,
            model_placement,
            granularity,
            template,
        } => {
            let options = OrganizeOptions {
                base: basepath.unwrap_or(config.organize_base),
                placement: model_placement.unwrap_or(config.model_placement),
                granularity: granularity.unwrap_or(config.granularity),
                template: template.unwrap_or(config.template),
                remove_original,
            };
            shoebox::organize::run(stdin.lock(), &options)?;
        }
    }

    output.flush()?;
    Ok(())
}

/// Map the -q / -v flags to a default level and install a stderr-only
/// subscriber. Stage output owns stdout.
fn setup_logging(cli: &Cli) {
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

/// Load configuration from the given file, or defaults when none is
/// given.
fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            info!(config_file = %path.display(), "Loading configuration from file");
            Ok(Config::load_from_file(path)?)
        }
        None => Ok(Config::default()),
    }
}

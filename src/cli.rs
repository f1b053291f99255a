//! CLI argument parsing with clap

use crate::config::{Granularity, ModelPlacement};
use crate::meta::report::ReportAction;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Shoebox - JPEG collection maintenance from the command line
///
/// Every stage reads path lists or records on stdin and writes results
/// to stdout, so stages compose into pipelines:
///
///   shoebox find photos | shoebox id -u | shoebox uniq -u
#[derive(Parser, Debug)]
#[command(name = "shoebox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as
    /// defaults. CLI arguments override config file settings.
    #[arg(short = 'C', long, global = true, env = "SHOEBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Increase diagnostic verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List photo files under a directory, sorted
    Find {
        /// Directory to scan
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Compute content identities and count duplicate photos
    Id {
        /// Seed occurrence counts from a previous run's records
        #[arg(short, long)]
        preload: Option<PathBuf>,

        /// Remove files beyond the allowance
        #[arg(short = 'u', long)]
        unlink: bool,

        /// How many copies of an identity to keep
        #[arg(short = 'n', long)]
        allowance: Option<u64>,
    },

    /// Re-apply the retention policy to groups with inconsistent
    /// capture times
    Uniq {
        /// Remove files beyond the allowance
        #[arg(short = 'u', long)]
        unlink: bool,

        /// How many copies of an identity to keep
        #[arg(short = 'n', long)]
        allowance: Option<u64>,
    },

    /// Remove listed files and prune empty directories
    Rm {
        /// Directory whose empty subdirectories are pruned
        #[arg(default_value = ".")]
        basepath: PathBuf,
    },

    /// Report metadata for listed files
    #[command(name = "r_exif")]
    RExif {
        /// What to report
        #[arg(value_enum)]
        action: ReportAction,
    },

    /// Adjust or assign capture time metadata for listed files
    #[command(name = "w_exif")]
    WExif {
        /// Overwrite tags even when present or out of sync
        #[arg(short, long)]
        force: bool,

        /// Preserve each file under a _original sibling before writing
        #[arg(short, long)]
        keep_original: bool,

        /// Report what would change without touching anything
        #[arg(short, long)]
        simulate: bool,

        /// Assign capture times starting from this base date
        /// (YYYY:MM:DD HH:MM:SS, YYYY:MM:DD or YYYYMMDD)
        #[arg(short, long, conflicts_with = "delta")]
        basedate: Option<String>,

        /// Shift existing capture times by this signed adjustment
        /// (H, HH, HHMM, HHMMSS, HH:MM or HH:MM:SS, with optional +/-)
        #[arg(short, long)]
        delta: Option<String>,

        /// Camera make to fill in
        #[arg(short = 'a', long)]
        make: Option<String>,

        /// Camera model to fill in
        #[arg(short = 'o', long)]
        model: Option<String>,
    },

    /// Hard-link listed files into a deterministic destination tree
    Org {
        /// Root of the destination tree
        basepath: Option<PathBuf>,

        /// Remove each source file after linking it
        #[arg(short, long)]
        remove_original: bool,

        /// Where the camera-model folder sits
        #[arg(short = 'm', long, value_enum)]
        model_placement: Option<ModelPlacement>,

        /// Date folder granularity
        #[arg(short = 's', long, value_enum)]
        granularity: Option<Granularity>,

        /// Filename template
        #[arg(short, long)]
        template: Option<String>,
    },
}

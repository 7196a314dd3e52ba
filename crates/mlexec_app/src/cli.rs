use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mlexec_core::AlgorithmId;

use crate::config::LogSetting;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "mlexec",
    version,
    about = "Submit a dataset to a concept-learning service and render the result"
)]
pub struct Cli {
    /// Origin of the execution service (scheme, host and port)
    #[arg(long, global = true)]
    pub origin: Option<String>,

    /// RON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Where log output goes
    #[arg(long, value_enum, global = true)]
    pub log: Option<LogSetting>,

    /// Give up on a submission after this many seconds (default: wait forever)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Select, upload and execute once, then print the rendered result
    Run {
        /// candidate-elimination, find-s or id3
        #[arg(short, long)]
        algorithm: AlgorithmId,

        /// Dataset to upload (.csv, .txt, .xls, .xlsx)
        #[arg(short, long)]
        file: PathBuf,

        /// Print the output view as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Interactive session: select, open, run and show
    Shell,
    /// List the supported algorithms
    Algorithms,
}

mod offline;

pub use offline::{predict, ranges};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Seizure Predict backend - EEG seizure-onset prediction over HTTP
#[derive(Parser)]
#[command(name = "seizure-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the server (default)
    Serve,

    /// Print the available time range of EDF files as JSON
    Ranges {
        /// EDF files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Classify EDF files offline and write the predictions workbook
    Predict(PredictArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    /// EDF files to classify
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Samples per classification window
    #[arg(short, long)]
    pub window_length: usize,

    /// Analysis start (ISO-8601)
    #[arg(long)]
    pub start: Option<String>,

    /// Analysis end (ISO-8601)
    #[arg(long)]
    pub end: Option<String>,

    /// Ground-truth workbook whose start/end column names are mirrored
    #[arg(long)]
    pub ground_truth: Option<PathBuf>,

    /// Output path (defaults to the export name in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Checkpoint to use instead of MODEL_PATH; its architecture is inferred
    #[arg(long)]
    pub model: Option<PathBuf>,
}

// src/cli.rs
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::series::Reducer;

#[derive(Parser)]
#[command(name = "raster-series")]
#[command(about = "Spectral index time-series calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output file path (stdout when omitted)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute an index time series at a point
    Chart {
        /// Scene collection JSON file
        #[arg(short, long)]
        scenes: PathBuf,

        /// Dataset name from the catalog
        #[arg(short, long, default_value = "Sentinel-2")]
        dataset: String,

        /// Start date, YYYY-MM-DD (inclusive)
        #[arg(long, default_value = "2023-01-01")]
        start: NaiveDate,

        /// End date, YYYY-MM-DD (exclusive)
        #[arg(long, default_value = "2023-12-31")]
        end: NaiveDate,

        /// Point x (easting) in the scenes' map units
        #[arg(short = 'x', long)]
        x: f64,

        /// Point y (northing) in the scenes' map units
        #[arg(short = 'y', long)]
        y: f64,

        /// Spatial reducer for the window samples
        #[arg(long, value_enum, default_value_t = Reducer::Mean)]
        reducer: Reducer,

        /// Normalize by actual window extrema instead of fixed bounds
        #[arg(long)]
        extrema_normalize: bool,

        /// Worker threads (defaults to CPU count)
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Run many chart requests from a JSON configuration
    Batch {
        /// Batch configuration JSON file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// List the registered datasets
    ListDatasets,
}

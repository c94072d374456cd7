use std::{path::PathBuf, process::exit};
use clap::{Parser, Subcommand};
use log::{debug, error};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Flatten the geometries of a GeoJSON file into a table of (x, y) rows
    Flatten {
        /// Input geometry file (.geojson)
        input: PathBuf,
        /// Output table (.csv, .parquet or .ipc)
        output: PathBuf,
        /// Keep the nested classification attribute instead of splitting it into
        /// classification_name and classification_color_r/g/b columns
        #[clap(long)]
        no_classification_split: bool,
    },
    /// Rebuild the geometries from a (warped) coordinate table
    Reconstruct {
        /// Input table (.csv, .parquet or .ipc)
        input: PathBuf,
        /// Output geometry file (.geojson)
        output: PathBuf,
        /// Column holding the x coordinate of the points
        #[clap(long, default_value = "x")]
        x_col: String,
        /// Column holding the y coordinate of the points
        #[clap(long, default_value = "y")]
        y_col: String,
        /// Leave the classification_* columns as flat attributes
        #[clap(long)]
        no_classification_merge: bool,
    },
}

#[derive(Debug, Parser, Clone)]
pub struct Args{
    #[clap(subcommand)]
    pub command: Command,
    /// Overwrite :
    /// if specified, will overwrite the output file if it already exists
    #[clap(short, long, global = true)]
    pub overwrite: bool,
    /// Thread count :
    /// the number of threads used by rayon
    /// if not specified, rayon will use the number of cores available on the machine
    #[clap(short, long, global = true)]
    pub thread_count: Option<usize>,
    /// verbose :
    /// if specified, will print more information
    #[clap(short, long, global = true)]
    pub verbose: bool,
}

impl Args{
    pub fn input(&self) -> &PathBuf {
        match &self.command {
            Command::Flatten { input, .. } | Command::Reconstruct { input, .. } => input,
        }
    }

    pub fn output(&self) -> &PathBuf {
        match &self.command {
            Command::Flatten { output, .. } | Command::Reconstruct { output, .. } => output,
        }
    }

    /// Installs the logger, RUST_LOG filters still apply on top of the verbosity level
    pub fn handle_verbose(&self){
        let level = if self.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
        let mut builder = pretty_env_logger::formatted_builder();
        builder.filter_level(level);
        if let Ok(filters) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }
        builder.init();
        debug!("Called Args :\n{:#?}", self);
    }

    pub fn handle_thread_count(&self){
        if let Some(thread_count) = self.thread_count {
            if let Err(err) = rayon::ThreadPoolBuilder::new()
                .num_threads(thread_count)
                .build_global()
            {
                error!("Couldn't build the thread pool : {}", err);
                exit(1);
            }
        }
    }

    pub fn validate_paths(&self){
        if !self.input().exists(){
            error!("Input file does not exist : {:?}", self.input());
            exit(1);
        }

        if self.output().exists() && !self.overwrite{
            error!("Output file already exists : {:?}\nUse --overwrite to overwrite it", self.output());
            exit(1);
        }
    }
}

lazy_static::lazy_static! {
    pub static ref ARGS: Args = Args::parse();
}

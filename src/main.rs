mod args;

use std::{path::Path, process::exit};

use log::error;
use warp_geometries::{flatten, io, reconstruct, Result};

use crate::args::{Command, ARGS};

fn run_flatten(input: &Path, output: &Path, classification_split: bool) -> Result<()> {
    let features = io::read_features(input)?;
    let table = flatten(&features, classification_split)?;
    io::write_table(output, &table)
}

fn run_reconstruct(input: &Path, output: &Path, x_col: &str, y_col: &str, classification_merge: bool) -> Result<()> {
    let table = io::read_table(input)?;
    let features = reconstruct(&table, x_col, y_col, classification_merge)?;
    io::write_features(output, features)
}

fn main() {
    ARGS.handle_verbose();
    ARGS.handle_thread_count();
    ARGS.validate_paths();

    let res = match &ARGS.command {
        Command::Flatten { input, output, no_classification_split } => {
            run_flatten(input, output, !no_classification_split)
        }
        Command::Reconstruct { input, output, x_col, y_col, no_classification_merge } => {
            run_reconstruct(input, output, x_col, y_col, !no_classification_merge)
        }
    };

    if let Err(err) = res {
        error!("{}", err);
        exit(1);
    }
}

mod args;
mod polls;

use clap::Parser;
use log::{info, warn};
use snafu::ErrorCompat;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
    info!("args: {:?}", args);

    if let Err(e) = polls::run_polls(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        for cause in ErrorCompat::iter_chain(e.as_ref()).skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}

use clap::Parser;
use log::warn;
use snafu::ErrorCompat;

mod args;
mod dashboard;

use crate::args::Args;
use crate::dashboard::{run_dashboard, run_direct, DashboardError};

fn main() {
    let args = Args::parse();

    let mut log_builder = env_logger::Builder::from_default_env();
    if args.verbose {
        log_builder.filter_level(log::LevelFilter::Debug);
    }
    log_builder.init();

    let res: Result<(), DashboardError> = match (args.config, args.input) {
        (Some(config_path), None) => run_dashboard(config_path, args.reference, args.out),
        (None, Some(input_path)) => run_direct(
            input_path,
            args.input_type,
            args.excel_worksheet_name,
            args.reference,
            args.out,
        ),
        _ => {
            eprintln!("Exactly one of --config or --input must be provided");
            std::process::exit(2);
        }
    };

    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}

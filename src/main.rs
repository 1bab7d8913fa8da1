use clap::Parser;
use qartod_qc::cli::{self, Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    cli::setup_logging(&args);

    if let Err(error) = commands::run(&args) {
        // Error occurred - print to stderr and exit with error code
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

//! Binary entry point for the `gitpluck` command-line tool.
//!
//! Responsibilities end at the boundary: parse arguments with `clap`,
//! hand one request to the library, and render whatever error comes back.
//! All download logic lives in the library crate.

mod cli;

use std::process::ExitCode;

use clap::Parser;

use gitpluck::output::OutputConfig;

fn main() -> ExitCode {
    env_logger::init();

    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let output = OutputConfig::default();
            if output.use_color {
                eprintln!("{} {err:#}", console::style("error:").red().bold());
            } else {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

//! memc_load CLI: load TSV dumps into memcached; exit status reflects the final verdict.

use anyhow::Result;
use clap::Parser;
use memc_load::engine::arg_parser::Cli;
use memc_load::engine::handle_run;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let verdict = handle_run(&cli)?;
    log::info!("Total time: {:?}", start_time.elapsed());
    Ok(ExitCode::from(verdict.exit_code()))
}

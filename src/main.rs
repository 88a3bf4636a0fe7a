mod cli;
mod dataset;
mod dates;
mod error;
mod filter;
mod fmt;
mod html;
mod loader;
mod merger;
mod models;
mod normalizer;
mod presentation;
mod reports;
mod settings;
mod tui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("FINBOARD_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("finboard={default}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let workbook = cli.workbook.as_deref();
    let result = match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => cli::dashboard::run(workbook),
        Commands::Report {
            filters,
            json,
            page,
        } => cli::report::run(workbook, &filters, json, page),
        Commands::Html { filters, output } => cli::html::run(workbook, &filters, output),
        Commands::Load { path } => cli::load::run(&path),
        Commands::Status => cli::status::run(workbook),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

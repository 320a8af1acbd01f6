mod aggregate;
mod cache;
mod cli;
mod commands;
mod config;
mod drilldown;
mod error;
mod export;
mod filter;
mod loader;
mod output;
mod session;
mod types;

#[cfg(test)]
mod fixtures;

use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use cli::{Cli, Commands};
use config::Config;
use error::Result;
use session::{OpenOptions, Session};
use std::error::Error;
use std::path::Path;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if std::env::args().any(|arg| arg == "--verbose" || arg == "-v") {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = std::error::Error::source(cause);
            }
        }

        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set global output format
    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    let open_options = OpenOptions {
        use_cache: !cli.no_cache,
        require_issue_type: cli.require_issue_type,
    };

    match cli.command {
        // Commands that don't need an export
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "bugdash", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run()?;
        }
        // Commands that load an export into a session
        command => {
            let config = Config::load()?;
            let open = |file: &Path| Session::open(file, &config, open_options);

            match command {
                Commands::Summary(args) => {
                    let session = open(args.source.file.as_path())?;
                    commands::summary::run(&session, args)?;
                }
                Commands::Breakdown(args) => {
                    let session = open(args.source.file.as_path())?;
                    commands::breakdown::run(&session, args)?;
                }
                Commands::Trend(args) => {
                    let session = open(args.source.file.as_path())?;
                    commands::trend::run(&session, args)?;
                }
                Commands::List(args) => {
                    let session = open(args.source.file.as_path())?;
                    commands::issues::list(&session, args)?;
                }
                Commands::Drill(args) => {
                    let session = open(args.source.file.as_path())?;
                    commands::issues::drill(&session, args)?;
                }
                Commands::Export(args) => {
                    let session = open(args.source.file.as_path())?;
                    commands::export::run(&session, args)?;
                }
                Commands::Dashboard(args) => {
                    let session = open(args.source.file.as_path())?;
                    commands::dashboard::run(&session, args)?;
                }
                Commands::Values(args) => {
                    let session = open(args.file.as_path())?;
                    commands::values::run(&session, args)?;
                }
                Commands::Completions { .. } | Commands::Init => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}

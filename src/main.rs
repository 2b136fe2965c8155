mod cli;
mod commands;
mod config;
mod data_source;
mod paths;
mod progress;
mod provider;
mod resource;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use commands::Session;
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "latitude-provider", &mut io::stdout());
        return Ok(());
    }

    let mut session = Session::open(&cli)?;

    match cli.command {
        Command::Kinds => commands::kinds::list(&session),
        Command::Schema { kind } => commands::kinds::schema(&session, &kind),
        Command::Create { kind, name, config } => {
            commands::resource::create(&mut session, &kind, &name, &config)
        }
        Command::Read { name } => commands::resource::read(&mut session, &name),
        Command::Update { name, set } => commands::resource::update(&mut session, &name, &set),
        Command::Delete { name, yes } => commands::resource::delete(&mut session, &name, yes),
        Command::Import { kind, name, id } => {
            commands::resource::import(&mut session, &kind, &name, &id)
        }
        Command::Lookup { kind, filters } => commands::lookup::run(&session, &kind, &filters),
        Command::List => commands::resource::list(&session),
        Command::Completions { .. } => Ok(()),
    }
}

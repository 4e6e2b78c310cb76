//! biji CLI - named notes on the command line, synced through a relay.

mod cli;
mod commands;
mod error;
mod sync_settings;


use clap::{CommandFactory, Parser};

use cli::{Cli, Commands, SyncCommands};
use commands::common::resolve_data_file;
use error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive = "biji=warn"
        .parse::<tracing_subscriber::filter::Directive>()
        .map_err(|error| CliError::Config(format!("invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if let Commands::Completions { shell, output } = &command {
        return commands::completions::run_completions(*shell, output.as_deref());
    }

    let data_file = resolve_data_file(cli.data_file)?;
    tracing::debug!(path = %data_file.display(), "Using note document");

    match command {
        Commands::New { name, content } => commands::new::run_new(&name, &content, &data_file)?,
        Commands::List { limit, json } => commands::list::run_list(limit, json, &data_file)?,
        Commands::View { name, json } => commands::view::run_view(&name, json, &data_file)?,
        Commands::Rename { name, new_name } => {
            commands::rename::run_rename(&name, &new_name, &data_file)?;
        }
        Commands::Edit { name, content } => commands::edit::run_edit(&name, &content, &data_file)?,
        Commands::Delete { names } => commands::delete::run_delete(&names, &data_file)?,
        Commands::Done { name } => commands::done::run_set_done(&name, true, &data_file)?,
        Commands::Undone { name } => commands::done::run_set_done(&name, false, &data_file)?,
        Commands::Sync { command } => match command {
            SyncCommands::Register { server, force } => {
                commands::sync::run_register(server, force, &data_file).await?;
            }
            SyncCommands::Link { code, server } => {
                commands::sync::run_link(&code, server, &data_file)?;
            }
            SyncCommands::Push => commands::sync::run_push(&data_file).await?,
            SyncCommands::Pull => commands::sync::run_pull(&data_file).await?,
            SyncCommands::Status => commands::sync::run_status(&data_file)?,
        },
        Commands::Completions { .. } => {}
    }

    Ok(())
}

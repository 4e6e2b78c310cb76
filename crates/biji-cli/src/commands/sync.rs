use std::path::Path;

use biji_core::sync::SyncClient;

use crate::commands::common::{format_timestamp, open_store};
use crate::error::CliError;
use crate::sync_settings::{normalize_text_option, settings_path_for, SyncSettings};

pub async fn run_register(
    server: Option<String>,
    force: bool,
    data_file: &Path,
) -> Result<(), CliError> {
    let settings_path = settings_path_for(data_file);
    let mut settings = SyncSettings::load_from_path(&settings_path)?;
    if settings.sync_code.is_some() && !force {
        return Err(CliError::AlreadyRegistered);
    }

    if let Some(server) = normalize_text_option(server) {
        settings.server_url = Some(server);
    }
    let client = SyncClient::new(settings.resolve_server_url()?)?;
    let sync_code = client.register().await?;

    settings.server_url = Some(client.base_url().to_string());
    settings.sync_code = Some(sync_code.clone());
    settings.last_sync = None;
    settings.save_to_path(&settings_path)?;

    println!("Registered. Sync code: {sync_code}");
    println!("Link other devices with `biji sync link \"{sync_code}\"`.");
    Ok(())
}

pub fn run_link(code: &str, server: Option<String>, data_file: &Path) -> Result<(), CliError> {
    let settings_path = settings_path_for(data_file);
    let mut settings = SyncSettings::load_from_path(&settings_path)?;

    let code = normalize_text_option(Some(code.to_string()))
        .ok_or_else(|| CliError::Config("sync code cannot be empty".to_string()))?;
    settings.sync_code = Some(code);
    settings.last_sync = None;
    if let Some(server) = normalize_text_option(server) {
        settings.server_url = Some(server);
    }
    settings.resolve_server_url()?;
    settings.save_to_path(&settings_path)?;

    println!("Linked. Run `biji sync pull` to fetch notes.");
    Ok(())
}

pub async fn run_push(data_file: &Path) -> Result<(), CliError> {
    let settings_path = settings_path_for(data_file);
    let mut settings = SyncSettings::load_from_path(&settings_path)?;
    let client = SyncClient::new(settings.resolve_server_url()?)?;
    let store = open_store(data_file)?;

    let local = store.list();
    let uploaded = local.len();
    let response = client
        .push(settings.require_code()?, local, settings.last_sync)
        .await?;
    let merged = store.merge_remote(response.notes)?;

    settings.last_sync = Some(response.last_sync);
    settings.save_to_path(&settings_path)?;

    println!(
        "Pushed {uploaded} notes; {} new and {} updated from the relay",
        merged.added, merged.accepted
    );
    Ok(())
}

pub async fn run_pull(data_file: &Path) -> Result<(), CliError> {
    let settings = SyncSettings::load_from_path(&settings_path_for(data_file))?;
    let client = SyncClient::new(settings.resolve_server_url()?)?;
    let store = open_store(data_file)?;

    let remote = client.fetch_notes(settings.require_code()?).await?;
    let merged = store.merge_remote(remote)?;

    println!(
        "Pulled {} new and {} updated notes ({} kept locally)",
        merged.added, merged.accepted, merged.retained
    );
    Ok(())
}

pub fn run_status(data_file: &Path) -> Result<(), CliError> {
    let settings = SyncSettings::load_from_path(&settings_path_for(data_file))?;

    let server = settings
        .resolve_server_url()
        .unwrap_or_else(|_| "(not set)".to_string());
    let linked = if settings.sync_code.is_some() { "yes" } else { "no" };
    let last_sync = settings
        .last_sync
        .map_or_else(|| "never".to_string(), format_timestamp);

    println!("server:    {server}");
    println!("linked:    {linked}");
    println!("last sync: {last_sync}");
    Ok(())
}

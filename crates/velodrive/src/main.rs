mod cli;
mod commands;
mod error;
mod logging;
mod settings;

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, warn};
use tokio_util::sync::CancellationToken;
use velodrive_gdrive::GoogleDriveSource;
use velodrive_platform::AppPaths;

use crate::cli::{Cli, Commands};
use crate::error::AppError;
use crate::settings::Settings;

async fn execute(
    source: &GoogleDriveSource,
    command: Commands,
    settings: &Settings,
) -> Result<(), AppError> {
    match command {
        Commands::Feed { channel, json } => {
            let rendered = commands::feed(source, channel, json).await?;
            std::io::stdout()
                .write_all(rendered.as_bytes())
                .map_err(|error| AppError::io("failed to write feed", error))
        }
        Commands::Download { file_name, output } => {
            let output = match output {
                Some(path) => path,
                None => commands::download_dir(
                    settings.download_dir.clone(),
                    AppPaths::new().ok().map(|paths| paths.downloads_dir()),
                )?,
            };

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling download");
                    on_interrupt.cancel();
                }
            });

            let asset = commands::download(source, &file_name, &output, &cancel).await?;
            println!(
                "{}  {}",
                asset.checksum.as_deref().unwrap_or_default(),
                asset.file_name
            );
            Ok(())
        }
    }
}

async fn run(cli: Cli, settings: Settings, settings_path: PathBuf) -> Result<(), AppError> {
    let source = GoogleDriveSource::new(settings.source_options(&settings_path)?)?;
    let result = execute(&source, cli.command, &settings).await;
    source.close();
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let paths = AppPaths::new().ok();

    let settings_path = cli
        .config
        .clone()
        .or_else(|| paths.as_ref().map(AppPaths::settings_file))
        .unwrap_or_else(|| PathBuf::from("settings.json"));
    let (mut settings, load_error) = match Settings::load_from(&settings_path) {
        Ok(settings) => (settings, None),
        Err(err) => (Settings::default(), Some(err)),
    };
    settings.apply_cli(&cli);

    let log_path = paths.as_ref().map(AppPaths::log_file);
    logging::init_logging(
        settings.debug_logging,
        log_path.as_deref(),
        settings.max_log_size_bytes,
    );
    if let Some(err) = load_error {
        warn!("Ignoring settings: {err}");
    }
    if let Some(paths) = &paths
        && let Err(err) = paths.ensure_dirs()
    {
        warn!("Could not create application directories: {err}");
    }

    match run(cli, settings, settings_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

//! Navis - Entry Point
//!
//! A lightweight deployment server. Receives deployment webhooks, runs the
//! configured command and reports the outcome back to the deployment API.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use navis::app::options::AppOptions;
use navis::app::run::run;
use navis::app::trigger::TriggerOrder;
use navis::logs::{init_logging, LogOptions};
use navis::storage::settings::Settings;
use navis::utils::version_info;

use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();
    let mut positional: Vec<String> = Vec::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=').filter(|_| arg.starts_with("--")) {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        } else {
            positional.push(arg.clone());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to render version: {e}"),
        }
        return ExitCode::SUCCESS;
    }

    let settings_path = cli_args
        .get("settings")
        .cloned()
        .or_else(|| positional.first().cloned())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("settings.json"));

    // A deployment order with an explicit token runs without a settings file
    let trigger = cli_args.contains_key("trigger");
    let settings = if trigger && !TriggerOrder::needs_settings(&cli_args) {
        Settings::load(&settings_path).await.ok()
    } else {
        match Settings::load(&settings_path).await {
            Ok(settings) => Some(settings),
            Err(e) => {
                eprintln!("Unable to read settings file: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    // Initialize logging
    let log_options = match &settings {
        Some(settings) => LogOptions {
            log_level: settings.log_level,
            json_format: settings.log_json,
            log_dir: settings.log_dir.clone(),
            ..Default::default()
        },
        None => LogOptions::default(),
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    // Send a deployment order and exit
    if trigger {
        let order = TriggerOrder::from_args(&cli_args, settings.as_ref())
            .context("invalid deployment order");
        let sent = match order {
            Ok(order) => order
                .send()
                .await
                .with_context(|| format!("requesting deployment of {}", order.repository)),
            Err(e) => Err(e),
        };
        return match sent {
            Ok(()) => {
                println!("Deployment order was sent");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Deployment order failed: {e:#}");
                ExitCode::FAILURE
            }
        };
    }

    let Some(settings) = settings else {
        return ExitCode::FAILURE;
    };

    let options = AppOptions::from_settings(&settings);
    info!("Running Navis {} with options: {:?}", version.version, options);
    if let Err(e) = run(Arc::new(settings), options, await_shutdown_signal()).await {
        error!("Failed to run the server: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(term), Ok(int)) => (term, int),
            _ => {
                error!("Failed to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, shutting down...");
    }
}

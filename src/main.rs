use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rubberpipe::config::{self, AdapterConfig, Settings};
use rubberpipe::managers::backup::{BackupManager, BackupManagerError};
use rubberpipe::managers::logging::{init_console_logging, init_logging, LoggingConfig};
use rubberpipe::registry::{AdapterRegistry, AdapterRole};
use rubberpipe::stores::{ConfigStore, HistoryStore, JsonConfigStore, JsonHistoryStore};
use rubberpipe::utils::command::find_program;
use rubberpipe::Hub;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Tools the postgres source shells out to
const POSTGRES_TOOLS: [&str; 3] = ["pg_isready", "pg_dump", "pg_restore"];

#[derive(Parser)]
#[command(name = "rubberpipe")]
#[command(about = "Back up sources to destinations and restore them", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to settings file (defaults to ~/.config/rubberpipe/rubberpipe.toml if present)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up a source into a destination
    Backup {
        /// Source adapter name
        source: String,
        /// Destination adapter name
        destination: String,
    },

    /// Restore a backup by its history id
    Restore {
        backup_id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show backup history, newest first
    List,

    /// Manage adapter configurations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Build every adapter and probe every source
    Validate,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List adapter configurations (secrets masked)
    List,

    /// Add an adapter configuration
    Add {
        /// Unique adapter name
        name: String,
        /// Adapter type, e.g. postgres, files, local
        #[arg(value_name = "TYPE")]
        adapter_type: String,
        /// Adapter settings as a JSON object
        json: String,
    },

    /// Remove an adapter configuration
    Remove { name: String },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings = match config::load_settings_or_default(cli.settings.as_deref()) {
        Ok(settings) => settings.resolve_paths(),
        Err(e) => {
            // No log directory is known yet
            init_console_logging();
            tracing::error!("Failed to load settings: {}", e);
            return Err(anyhow::Error::from(e).context("Failed to load settings"));
        }
    };

    // Keep the guard alive until main returns so file logs are flushed
    let logging_config = LoggingConfig::from_config(
        &settings.global.log_directory,
        &settings.global.log_level,
        settings.global.log_max_files,
    );
    let _log_guard = init_logging(&logging_config)?;

    // Duplicate registration means a broken build; treat as fatal
    let registry = AdapterRegistry::with_builtin_adapters(&settings.global.staging_directory)
        .context("Adapter registry setup failed")?;

    let state_dir = &settings.global.state_directory;
    let config_store = JsonConfigStore::in_dir(state_dir);
    let history = Arc::new(JsonHistoryStore::in_dir(state_dir));

    match cli.command {
        Commands::Backup {
            source,
            destination,
        } => {
            let manager = build_manager(&registry, &config_store, history)?;
            match manager.backup(&source, &destination) {
                Ok(record) => {
                    println!(
                        "Backup successful: {} (id {})",
                        record.filename, record.id
                    );
                }
                Err(BackupManagerError::Backup { record, source }) => {
                    eprintln!(
                        "Backup failed (recorded as id {}): {}",
                        record.id,
                        source.chain_message()
                    );
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Restore { backup_id, yes } => {
            let Some(record) = history.get(backup_id)? else {
                eprintln!("Backup {} not found", backup_id);
                return Ok(ExitCode::FAILURE);
            };

            println!(
                "Backup {}: {} -> {} | {} | {} | {}",
                record.id,
                record.source,
                record.destination,
                record.filename,
                record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                record.status
            );

            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Restore onto '{}'? This overwrites its current data",
                        record.source
                    ))
                    .default(false)
                    .interact()?;

                if !confirm {
                    println!("Restore cancelled.");
                    return Ok(ExitCode::SUCCESS);
                }
            }

            let manager = build_manager(&registry, &config_store, history)?;
            if let Err(e) = manager.restore(backup_id) {
                eprintln!("Restore failed: {:#}", anyhow::Error::from(e));
                return Ok(ExitCode::FAILURE);
            }
            println!("Restore successful: {}", backup_id);
        }

        Commands::List => {
            let records = history.list()?;
            if records.is_empty() {
                println!("No backups recorded.");
            } else {
                println!("Backup history:");
            }
            for record in records {
                println!(
                    "[{}] #{} {} -> {} | {} | {}{}",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.id,
                    record.source,
                    record.destination,
                    record.status,
                    record.filename,
                    record.error_message
                );
            }
        }

        Commands::Config { command } => {
            return handle_config(command, &registry, &config_store);
        }

        Commands::Validate => {
            return handle_validate(&settings, &registry, &config_store);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn build_manager(
    registry: &AdapterRegistry,
    config_store: &JsonConfigStore,
    history: Arc<JsonHistoryStore>,
) -> Result<BackupManager> {
    let configs = config_store.list()?;
    let hub = Hub::new(registry, &configs).context("Failed to build adapters")?;
    Ok(BackupManager::new(hub, history))
}

fn handle_config(
    command: ConfigCommands,
    registry: &AdapterRegistry,
    config_store: &JsonConfigStore,
) -> Result<ExitCode> {
    match command {
        ConfigCommands::List => {
            let configs = config_store.list()?;
            if configs.is_empty() {
                println!("No adapters configured.");
                return Ok(ExitCode::SUCCESS);
            }

            println!("Adapter configs:");
            for config in configs {
                let role = registry
                    .role_of(&config.adapter_type)
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let pretty = serde_json::to_string_pretty(&config::masked_payload(&config.payload))?;
                println!("- {} ({}, {}):", config.name, config.adapter_type, role);
                for line in pretty.lines() {
                    println!("    {}", line);
                }
            }
        }

        ConfigCommands::Add {
            name,
            adapter_type,
            json,
        } => {
            let payload: serde_json::Value =
                serde_json::from_str(&json).context("Adapter config is not valid JSON")?;

            // Build the adapter once so bad payloads are caught now, not at backup time
            let built = match registry.role_of(&adapter_type) {
                Some(AdapterRole::Source) => registry
                    .source_factory(&adapter_type)
                    .map(|factory| factory(&payload).map(|_| ())),
                Some(AdapterRole::Destination) => registry
                    .destination_factory(&adapter_type)
                    .map(|factory| factory(&payload).map(|_| ())),
                None => None,
            };

            match built {
                None => {
                    let mut known = registry.source_types();
                    known.extend(registry.destination_types());
                    eprintln!(
                        "Unknown adapter type '{}' (available: {})",
                        adapter_type,
                        known.join(", ")
                    );
                    return Ok(ExitCode::FAILURE);
                }
                Some(Err(e)) => {
                    eprintln!("Invalid config for '{}': {:#}", name, e);
                    return Ok(ExitCode::FAILURE);
                }
                Some(Ok(())) => {}
            }

            config_store.add(AdapterConfig::new(&name, &adapter_type, payload))?;
            println!("Adapter config '{}' added.", name);
        }

        ConfigCommands::Remove { name } => {
            if config_store.remove(&name)? {
                println!("Adapter config '{}' removed.", name);
            } else {
                eprintln!("Adapter config '{}' not found.", name);
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn handle_validate(
    settings: &Settings,
    registry: &AdapterRegistry,
    config_store: &JsonConfigStore,
) -> Result<ExitCode> {
    let configs = config_store.list()?;
    let hub = match Hub::new(registry, &configs) {
        Ok(hub) => hub,
        Err(e) => {
            eprintln!("✗ {}", e.chain_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("State directory: {:?}", settings.global.state_directory);
    println!(
        "Adapters: {} source(s), {} destination(s)",
        hub.source_names().len(),
        hub.destination_names().len()
    );

    let mut healthy = true;

    if configs.iter().any(|c| c.adapter_type == "postgres") {
        for tool in POSTGRES_TOOLS {
            match find_program(tool) {
                Ok(path) => println!("✓ {} found at {:?}", tool, path),
                Err(e) => {
                    println!("✗ {}", e);
                    healthy = false;
                }
            }
        }
    }

    for (name, result) in hub.validate_sources() {
        match result {
            Ok(()) => println!("✓ source '{}' is reachable", name),
            Err(e) => {
                println!("✗ {}", e.chain_message());
                healthy = false;
            }
        }
    }

    Ok(if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

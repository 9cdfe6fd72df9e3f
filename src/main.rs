use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use audio_device_detection::config::Config;
use audio_device_detection::logging::{self, LoggingConfig};
use audio_device_detection::ConfigLoader;

#[derive(Parser)]
#[command(name = "audio-device-detection")]
#[command(about = "Detect connected audio output devices and report route changes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected output devices
    List {
        /// Print the method-call response as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Print a JSON line for every route change until interrupted
    Watch,
    /// Validate configuration file
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::from_optional_path(cli.config.as_deref())?;
    let config = loader.load_config()?;

    let (_guard, log_dir) =
        logging::initialize_logging(LoggingConfig::from_config(&config, cli.verbose))?;
    if let Some(log_dir) = log_dir {
        info!("Writing logs to {}", log_dir.display());
    }
    info!(
        "Configuration loaded from {}",
        loader.get_config_path().display()
    );

    match cli.command.unwrap_or(Commands::List { json: false }) {
        Commands::CheckConfig => check_config(&loader, &config),
        command => run_device_command(command, &config).await,
    }
}

fn check_config<F: audio_device_detection::FileSystemInterface>(
    loader: &ConfigLoader<F>,
    config: &Config,
) -> Result<()> {
    info!("Validating configuration");

    println!("Configuration validation:");
    println!("  ✓ {}", loader.get_config_path().display());
    println!("  ✓ Log level: {}", config.general.log_level);
    println!(
        "  ✓ Logging: console={} file={} json={}",
        config.logging.console_output, config.logging.file_output, config.logging.json_format
    );
    if let Some(log_dir) = &config.logging.log_dir {
        println!("  ✓ Log directory: {}", log_dir.display());
    }
    println!(
        "  ✓ Input fallback: {}",
        config.enumeration.include_input_fallback
    );

    Ok(())
}

#[cfg(target_os = "macos")]
async fn run_device_command(command: Commands, config: &Config) -> Result<()> {
    use audio_device_detection::{BridgeAdapter, CoreAudioRouteSource, CoreAudioSystem};

    let bridge = BridgeAdapter::new(CoreAudioSystem::new(), CoreAudioRouteSource::new(), config);

    match command {
        Commands::List { json } => device_commands::list(&bridge, json),
        Commands::Watch => device_commands::watch(&bridge).await,
        Commands::CheckConfig => Ok(()),
    }
}

#[cfg(not(target_os = "macos"))]
async fn run_device_command(_command: Commands, _config: &Config) -> Result<()> {
    anyhow::bail!(
        "No audio backend is available for {}",
        std::env::consts::OS
    )
}

#[cfg(target_os = "macos")]
mod device_commands {
    use anyhow::{Context, Result};
    use tokio::sync::mpsc;
    use tokio_stream::StreamExt;
    use tracing::info;

    use audio_device_detection::bridge::GET_CONNECTED_DEVICES;
    use audio_device_detection::service::{SignalHandler, SignalType};
    use audio_device_detection::{
        AudioSystemInterface, BridgeAdapter, MethodResponse, RouteNotificationSource,
    };

    pub fn list<A, N>(bridge: &BridgeAdapter<A, N>, json: bool) -> Result<()>
    where
        A: AudioSystemInterface + 'static,
        N: RouteNotificationSource + 'static,
    {
        let response = bridge.handle_method_call(GET_CONNECTED_DEVICES);

        if json {
            let rendered =
                serde_json::to_string_pretty(&response).context("Failed to encode response")?;
            println!("{}", rendered);
            return Ok(());
        }

        let MethodResponse::Success(devices) = response else {
            anyhow::bail!("{} is not implemented", GET_CONNECTED_DEVICES);
        };

        println!("Connected audio devices:");
        if devices.is_empty() {
            println!("  No audio devices found!");
        }
        for (i, device) in devices.iter().enumerate() {
            println!("  {}. {}", i + 1, device);
        }

        Ok(())
    }

    pub async fn watch<A, N>(bridge: &BridgeAdapter<A, N>) -> Result<()>
    where
        A: AudioSystemInterface + 'static,
        N: RouteNotificationSource + 'static,
    {
        let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
        let signal_task = tokio::spawn(SignalHandler::new(signal_tx)?.listen_for_signals());

        let mut events = bridge.subscribe()?;
        info!("Watching for route changes, press Ctrl-C to stop");

        loop {
            tokio::select! {
                event = events.next() => {
                    let Some(record) = event else { break };
                    println!(
                        "{}",
                        serde_json::to_string(&record).context("Failed to encode event")?
                    );
                }
                signal = signal_rx.recv() => match signal {
                    Some(SignalType::Refresh) => list(bridge, true)?,
                    Some(SignalType::Shutdown) | None => break,
                },
            }
        }

        bridge.unsubscribe(events.id())?;
        signal_task.abort();
        info!("Stopped watching");
        Ok(())
    }
}

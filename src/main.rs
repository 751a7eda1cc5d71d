use clap::Parser;
use parknet_bridge::config::{ConfigLoader, ConfigOverrides, LogFormat, LoggingConfig};
use parknet_bridge::port::available_port_names;
use parknet_bridge::{Bridge, BridgeError, HttpPublisher, SyncSerialPort, TracingSink};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::signal;
use tracing_subscriber::EnvFilter;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Mirrors parking-slot occupancy from a serial sensor device to a remote JSON store.",
    long_about = "Reads lines such as `S1: 25.3 cm → OC` from the sensor device, keeps the latest state of every slot, and PUTs the whole state as JSON to the configured URL after each reading."
)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device to read from (e.g. /dev/ttyUSB0 or COM3).
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate of the serial device.
    #[arg(short, long)]
    baud: Option<u32>,

    /// URL the occupancy state is PUT to.
    #[arg(short, long)]
    url: Option<String>,

    /// Bearer token for the remote store.
    #[arg(short, long)]
    token: Option<String>,

    /// Print the available serial ports and exit.
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Listing ports needs no configuration, so a broken config must not block it.
    if args.list_ports {
        list_ports();
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(BridgeError::Connect { available, .. }) = e.downcast_ref::<BridgeError>() {
                if available.is_empty() {
                    eprintln!("no serial ports found");
                } else {
                    eprintln!("available ports: {}", available.join(", "));
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn list_ports() {
    match available_port_names() {
        Ok(ports) if ports.is_empty() => println!("No serial ports found."),
        Ok(ports) => {
            for port in ports {
                println!("{port}");
            }
        }
        Err(e) => println!("Could not enumerate serial ports: {e}"),
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut loader = match &args.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    loader.apply_overrides(ConfigOverrides {
        port: args.port,
        baud_rate: args.baud,
        url: args.url,
        auth_token: args.token,
    });
    let config_path = loader.config_path.clone();
    let config = loader.into_config()?;

    init_tracing(&config.logging);

    tracing::info!(
        port = %config.serial.port,
        baud_rate = config.serial.baud_rate,
        url = %config.remote.url,
        auth = config.remote.bearer_token().is_some(),
        config = ?config_path,
        "starting ParkNet bridge"
    );

    let publisher = HttpPublisher::new(&config.remote)?;
    let mut bridge: Bridge<SyncSerialPort, _, _> = Bridge::new(config, publisher, TracingSink);
    bridge.connect()?;

    tracing::info!("reading device output, press Ctrl+C to stop");
    bridge.run(shutdown_signal()).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.init(),
    }
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, shutting down");
}

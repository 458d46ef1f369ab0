//! proxy-confirm
//!
//! Operator tool around the rendering and reload confirmation library.
//!
//! ```text
//!   render-probe ─────────▶ VerifyConfigGenerator ──▶ stdout
//!   render-passthrough ───▶ TemplateExecutor ───────▶ stdout
//!   render-virtual-server ▶ TemplateExecutor ───────▶ stdout
//!   version / wait ───────▶ VerifyClient ──unix socket──▶ NGINX probe
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use proxy_confirm::config::{load_config, ControllerConfig};
use proxy_confirm::observability::logging;
use proxy_confirm::templates::{PassthroughHosts, TemplateExecutor, TransportServerConfig, VirtualServerConfig};
use proxy_confirm::verify::{VerifyClient, VerifyConfigGenerator};

#[derive(Parser)]
#[command(name = "proxy-confirm")]
#[command(about = "Render NGINX configuration and confirm reloads", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the config version probe server block
    RenderProbe {
        #[arg(long)]
        version: u64,
    },
    /// Print the TLS passthrough host map for HOST=SOCKET pairs
    RenderPassthrough {
        #[arg(value_parser = parse_host_socket)]
        hosts: Vec<(String, String)>,
    },
    /// Render a JSON encoded VirtualServer config
    RenderVirtualServer { input: PathBuf },
    /// Render a JSON encoded TransportServer config
    RenderTransportServer { input: PathBuf },
    /// Print the config version NGINX currently serves
    Version,
    /// Block until NGINX serves the given config version
    Wait {
        #[arg(long)]
        version: u64,
    },
}

fn parse_host_socket(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((host, socket)) if !host.is_empty() && !socket.is_empty() => {
            Ok((host.to_string(), socket.to_string()))
        }
        _ => Err(format!("expected HOST=SOCKET, got {:?}", s)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ControllerConfig::default(),
    };

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &ControllerConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::RenderProbe { version } => {
            let generator = VerifyConfigGenerator::with_socket_path(&config.verify.socket_path)?;
            write_stdout(&generator.generate_version_config(version)?)?;
        }
        Commands::RenderPassthrough { hosts } => {
            let hosts: PassthroughHosts = hosts.into_iter().collect();
            write_stdout(&executor(config)?.execute_passthrough_hosts_template(&hosts)?)?;
        }
        Commands::RenderVirtualServer { input } => {
            let cfg: VirtualServerConfig = read_json(&input)?;
            write_stdout(&executor(config)?.execute_virtual_server_template(&cfg)?)?;
        }
        Commands::RenderTransportServer { input } => {
            let cfg: TransportServerConfig = read_json(&input)?;
            write_stdout(&executor(config)?.execute_transport_server_template(&cfg)?)?;
        }
        Commands::Version => {
            let version = client(config).get_config_version().await?;
            println!("{}", version);
        }
        Commands::Wait { version } => {
            client(config).wait_for_correct_version(version).await?;
            tracing::info!(version, "NGINX is serving the expected config version");
        }
    }
    Ok(())
}

fn executor(config: &ControllerConfig) -> Result<TemplateExecutor, Box<dyn std::error::Error>> {
    Ok(TemplateExecutor::new(
        &config.templates.virtual_server_path,
        &config.templates.transport_server_path,
    )?)
}

fn client(config: &ControllerConfig) -> VerifyClient {
    VerifyClient::new(config.verify.timeout()).with_socket_path(&config.verify.socket_path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_stdout(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()
}

use clap::Parser;
use student_registry::{RegistryConfig, RegistryServer, DEFAULT_PORT};
use tracing_subscriber::EnvFilter;

/// Serve the in-memory student registry over HTTP.
#[derive(Parser, Debug)]
#[command(name = "student-registry", version, about)]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Start without the sample students.
    #[arg(long)]
    empty: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!("CLI config: {:?}", cli);

    let config = if cli.empty {
        RegistryConfig::empty()
    } else {
        RegistryConfig::seeded()
    };
    let server = RegistryServer::new(config.with_host(cli.host).with_port(cli.port)).await?;

    tracing::info!("Serving {}/estudiante, press Ctrl-C to stop", server.url());
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    Ok(())
}

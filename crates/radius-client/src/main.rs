use clap::Parser;
use radius_client::{
    AuthOutcome, AuthResponse, ClientConfig, RADIUS_AUTH_PORT, RadiusClient,
};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SERVER: &str = "172.20.2.2";
const DEFAULT_SECRET: &str = "10testing";

/// RADIUS Client - RFC 2865 PAP/CHAP authentication test tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "radius_client")]
struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// RADIUS server host name or address [default: 172.20.2.2]
    #[arg(short, long)]
    server: Option<String>,

    /// RADIUS server authentication port [default: 1812]
    #[arg(short, long)]
    port: Option<u16>,

    /// Shared secret [default: 10testing]
    #[arg(long)]
    secret: Option<String>,

    #[arg(short, long, default_value = "xeraph")]
    username: String,

    #[arg(short = 'w', long, default_value = "qooguevara")]
    password: String,

    /// Use CHAP instead of PAP
    #[arg(long)]
    chap: bool,

    /// Wait per attempt, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Retransmissions after the first send
    #[arg(long)]
    retries: Option<u8>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig, radius_client::ConfigError> {
        let mut config = match self.config {
            Some(ref path) => ClientConfig::from_file(path)?,
            None => ClientConfig::new(DEFAULT_SERVER, RADIUS_AUTH_PORT, DEFAULT_SECRET),
        };

        if let Some(ref server) = self.server {
            config.server = server.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ref secret) = self.secret {
            config.secret = secret.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.retry.timeout_ms = timeout_ms;
        }
        if let Some(retries) = self.retries {
            config.retry.max_retries = retries;
        }
        if self.log_level.is_some() {
            config.log_level = self.log_level.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn print_response(response: &AuthResponse) {
    let result = match response.outcome {
        AuthOutcome::Accept => "accepted",
        AuthOutcome::Reject => "rejected",
        AuthOutcome::Challenge => "challenged",
    };
    println!("result: {}, code: {}", result, response.code());

    for message in response.reply_messages() {
        println!("  message: {}", message);
    }
    if response.state().is_some() {
        println!("  state attribute present");
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.client_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(2);
        }
    };

    let log_level = config.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut client = match RadiusClient::connect(&config).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to open RADIUS session: {}", e);
            process::exit(1);
        }
    };

    info!(
        server = %client.server(),
        username = %cli.username,
        timeout = ?Duration::from_millis(config.retry.timeout_ms),
        retries = config.retry.max_retries,
        "Authenticating"
    );

    let result = if cli.chap {
        client.authenticate_chap(&cli.username, &cli.password).await
    } else {
        client.authenticate_pap(&cli.username, &cli.password).await
    };
    client.close();

    match result {
        Ok(response) => {
            print_response(&response);
            if !response.is_accept() {
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Authentication failed: {}", e);
            println!("result: error ({})", e);
            process::exit(1);
        }
    }
}

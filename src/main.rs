use anyhow::Result;
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tracing::{error, info};

use travel_advisor::chat;
use travel_advisor::constants;
use travel_advisor::web_server;
use travel_advisor::{CompletionClient, CompletionConfig, FormSelection, ServerConfig, SessionLog};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    provider: ProviderArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct ProviderArgs {
    /// Groq API key (starts with gsk_).
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    /// Chat-completion endpoint.
    #[arg(long, env = "GROQ_API_URL", default_value = constants::GROQ_API_URL, global = true)]
    api_url: String,
    /// Model identifier sent with every request.
    #[arg(long, env = "GROQ_MODEL", default_value = constants::MODEL_NAME, global = true)]
    model: String,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the travel advisor web UI.
    Start {
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST), help = "Address to bind.")]
        host: IpAddr,
        #[arg(long, env = "TRAVEL_ADVISOR_PORT", default_value_t = constants::DEFAULT_PORT, help = "Port for the web server.")]
        port: u16,
        #[arg(long, default_value = "templates", help = "Directory holding index.html.")]
        templates: PathBuf,
        #[arg(long, default_value = "static", help = "Directory served under /static.")]
        static_dir: PathBuf,
    },
    /// Ask for a single travel plan and print the reply.
    Ask {
        #[arg(long, default_value = constants::DEFAULT_CATEGORY, help = "Destination type, e.g. Beach or City.")]
        category: String,
        #[arg(long, default_value = constants::DEFAULT_REGION, help = "Region, e.g. Europe.")]
        region: String,
        #[arg(long = "preference", help = "Travel preference; repeat for several.")]
        preferences: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for GROQ_API_KEY)
    dotenvy::dotenv().ok();

    // Logs go to stderr so `ask` output stays clean on stdout.
    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,travel_advisor=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("Travel advisor starting with command: {:?}", cli.command);

    let completion = CompletionConfig::from_api_key(cli.provider.api_key)
        .with_api_url(cli.provider.api_url)
        .with_model(cli.provider.model);
    let client = CompletionClient::new(completion);

    match cli.command {
        Commands::Start {
            host,
            port,
            templates,
            static_dir,
        } => {
            let config = ServerConfig {
                addr: SocketAddr::new(host, port),
                templates_dir: templates,
                static_dir,
            };

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(config, client).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Ask {
            category,
            region,
            preferences,
        } => {
            let selection = FormSelection::new(category, region, preferences);
            let mut log = SessionLog::new();
            let log = chat::submit(&client, &mut log, &selection).await;
            if let Some(turn) = log.turns().last() {
                println!("{}", turn.assistant_text);
            }
        }
    }

    Ok(())
}

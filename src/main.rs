mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use iris::config::IrisConfig;

#[derive(Parser)]
#[command(
    name = "iris",
    version,
    about = "Conversational assistant backed by GPT, Wolfram|Alpha and Notion"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP chat API
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Ask a single question and print the answer
    Ask {
        /// The question text
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Interactive chat session in the terminal
    Chat,
    /// Show which services are configured
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let mut config = IrisConfig::load()?;

    // Log to stderr so stdout stays clean for replies.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    config.report();

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            iris::server::serve(config).await?;
        }
        Command::Ask { question } => {
            cli::ask::ask(&config, &question.join(" ")).await?;
        }
        Command::Chat => {
            cli::chat::chat(&config).await?;
        }
        Command::Status => {
            cli::status::status(&config);
        }
    }

    Ok(())
}

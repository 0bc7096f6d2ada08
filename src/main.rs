use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docs_assistant::client::{AskBackend, AskClient};
use docs_assistant::config::Config;
use docs_assistant::{app, logging};

#[derive(Parser)]
#[command(name = "docs-assistant")]
#[command(version)]
#[command(about = "Chat with the documentation assistant", long_about = None)]
struct Cli {
    /// Base URL of the documentation site
    #[arg(long, global = true)]
    url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        query: Vec<String>,
    },
    /// Print the effective configuration
    Config,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }
    Ok(config)
}

async fn ask_once(config: &Config, query: &str) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("Nothing to ask: the question is empty");
    }

    let client = AskClient::new(config)?;
    let response = client
        .ask(query)
        .await
        .with_context(|| format!("Request to {} failed", client.url()))?;

    println!("{}", response.answer());

    let sources = response.into_sources();
    if !sources.is_empty() {
        println!("\nSources:");
        for source in sources {
            match source.url() {
                Some(url) if url != source.label() => println!("  • {} ({})", source.label(), url),
                _ => println!("  • {}", source.label()),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        None | Some(Commands::Chat) => {
            logging::init_file(&config.log_path())?;
            app::run(config).await
        }
        Some(Commands::Ask { query }) => {
            logging::init_stderr()?;
            ask_once(&config, &query.join(" ")).await
        }
        Some(Commands::Config) => {
            println!("# {}", config.config_path().display());
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

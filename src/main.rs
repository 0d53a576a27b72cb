use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use log::info;
use proxy_scan_bot::{
    bot::{self, UpdateSource},
    proxy::{
        input::{DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_PROXIES},
        load_candidates, CheckerConfig, ProgressSink, ProgressUpdate, ProxyParser,
        DEFAULT_API_URL,
    },
    Config,
};
use reqwest::Url;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// A Telegram bot that checks uploaded proxy lists
#[derive(Parser)]
#[command(name = "proxy-scan-bot")]
#[command(about = "A Telegram bot that checks uploaded proxy lists against a liveness API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Serve {
        /// Telegram bot token
        #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
        token: String,
        /// Public webhook URL; long polling is used when absent
        #[arg(long, env = "WEBHOOK_URL")]
        webhook_url: Option<Url>,
        /// Address the webhook server listens on
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8443")]
        listen: SocketAddr,
        /// Maximum upload size in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
        max_file_size: u64,
        #[command(flatten)]
        check: CheckArgs,
    },
    /// Check proxies from a local file and save results
    Check {
        /// Input file containing proxies
        input: PathBuf,
        /// Output file for active proxies
        #[arg(short, long, default_value = "active.txt")]
        active: PathBuf,
        /// Output file for dead proxies
        #[arg(short, long, default_value = "dead.txt")]
        dead: PathBuf,
        #[command(flatten)]
        check: CheckArgs,
    },
    /// Parse proxies from a file
    Parse {
        /// Input file containing proxies
        input: PathBuf,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// Liveness API endpoint
    #[arg(long, env = "PROXY_CHECK_API", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// Timeout per check in seconds
    #[arg(long, default_value = "5")]
    timeout: u64,
    /// Maximum number of proxies per run
    #[arg(long, default_value_t = DEFAULT_MAX_PROXIES)]
    max_proxies: usize,
}

impl CheckArgs {
    fn into_config(self) -> Config {
        Config {
            checker: CheckerConfig::new()
                .with_api_url(self.api_url)
                .with_timeout(Duration::from_secs(self.timeout)),
            max_proxies: self.max_proxies,
            ..Config::default()
        }
    }
}

/// Prints progress updates to stdout
struct ConsoleProgress;

#[async_trait]
impl ProgressSink for ConsoleProgress {
    async fn report(&self, update: &ProgressUpdate) -> proxy_scan_bot::Result<()> {
        println!("{}", update);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Serve {
            token,
            webhook_url,
            listen,
            max_file_size,
            check,
        } => {
            let config = Config {
                max_file_size,
                ..check.into_config()
            };
            let source = match webhook_url {
                Some(url) => UpdateSource::Webhook { url, listen },
                None => UpdateSource::Polling,
            };
            bot::serve(token, config, source).await?;
        }
        Commands::Check {
            input,
            active,
            dead,
            check,
        } => {
            let config = check.into_config();
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {:?}", input))?;
            let proxies = load_candidates(&content, config.max_proxies)?;

            println!("Loaded {} proxies from {:?}", proxies.len(), input);
            println!("Checking against {}", config.checker.api_url);
            println!();

            let verifier = config.build_verifier()?;
            let report = verifier.verify(proxies, &ConsoleProgress).await;

            std::fs::write(&active, report.active_content())?;
            std::fs::write(&dead, report.dead_content())?;
            info!("Saved results to {:?} and {:?}", active, dead);

            println!("{}", report.summary());
        }
        Commands::Parse { input } => {
            let proxies = ProxyParser::parse_file(&input)?;
            println!("Parsed {} proxies from {:?}", proxies.len(), input);
            for proxy in &proxies {
                println!("{}", proxy);
            }
        }
    }

    Ok(())
}

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

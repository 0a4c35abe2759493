use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use yuanbao_contracts::chat::{help_text, DrawRequest, PLUGIN_INFO};
use yuanbao_contracts::config::{PluginConfig, DEFAULT_CONFIG_PATH};
use yuanbao_contracts::messages::TextMessage;
use yuanbao_engine::{ChatHost, DrawPlugin};

#[derive(Debug, Parser)]
#[command(
    name = "yuanbao-rs",
    version,
    about = "Console host for the Yuanbao drawing plugin",
    disable_help_subcommand = true
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Chat(ChatArgs),
    Draw(DrawArgs),
    /// Print the usage guide and the style list.
    Help,
    /// Print the effective configuration.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    fn load(&self) -> PluginConfig {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        PluginConfig::load(&path)
    }
}

#[derive(Debug, Args)]
struct ChatArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(long, default_value = "console")]
    from: String,
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Debug, Args)]
struct DrawArgs {
    #[arg(long)]
    prompt: String,
    #[arg(long)]
    style: Option<String>,
    #[arg(long)]
    out: PathBuf,
    #[command(flatten)]
    config: ConfigArgs,
}

/// Chat host that prints text replies and saves relayed images to disk.
struct ConsoleHost {
    out_dir: PathBuf,
    saved: AtomicUsize,
}

impl ConsoleHost {
    fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("failed creating output dir {}", out_dir.display()))?;
        Ok(Self {
            out_dir,
            saved: AtomicUsize::new(0),
        })
    }

    fn saved(&self) -> usize {
        self.saved.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatHost for ConsoleHost {
    async fn send_text(&self, target: &str, text: &str) -> Result<()> {
        println!("[{target}] {text}");
        Ok(())
    }

    async fn send_image(&self, target: &str, image_base64: &str) -> Result<()> {
        let bytes = BASE64
            .decode(image_base64)
            .context("relayed image is not valid base64")?;
        let idx = self.saved.fetch_add(1, Ordering::SeqCst);
        let path = self.out_dir.join(format!(
            "image-{}-{:02}.{}",
            chrono::Utc::now().timestamp_millis(),
            idx,
            image_extension(&bytes)
        ));
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("failed writing {}", path.display()))?;
        println!("[{target}] <image {} bytes> {}", bytes.len(), path.display());
        Ok(())
    }
}

fn image_extension(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("bin")
}

fn init_tracing(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("yuanbao-rs error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run(command: Command) -> Result<i32> {
    match command {
        Command::Chat(args) => {
            run_chat(args).await?;
            Ok(0)
        }
        Command::Draw(args) => run_draw(args).await,
        Command::Help => {
            print!("{}", help_text());
            Ok(0)
        }
        Command::Config(args) => {
            println!("{}", serde_json::to_string_pretty(&args.load())?);
            Ok(0)
        }
    }
}

fn build_plugin(config: PluginConfig) -> Result<DrawPlugin> {
    info!(
        plugin = PLUGIN_INFO.name,
        version = PLUGIN_INFO.version,
        priority = PLUGIN_INFO.priority,
        "starting plugin"
    );
    DrawPlugin::new(Arc::new(config))
}

async fn run_chat(args: ChatArgs) -> Result<()> {
    let plugin = build_plugin(args.config.load())?;
    let host = ConsoleHost::new(&args.out)?;

    println!(
        "Yuanbao chat started. Start a message with {} to draw, /help for styles.",
        plugin.config().triggers.join(" or ")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim_end_matches(['\n', '\r']);
        if input.trim() == "/help" {
            print!("{}", help_text());
            continue;
        }
        let message = TextMessage::new(args.from.as_str(), input);
        if plugin.handle_text(&host, &message).await.should_continue() {
            println!("(ignored)");
        }
    }
    debug!(saved = host.saved(), "chat input closed");
    Ok(())
}

async fn run_draw(args: DrawArgs) -> Result<i32> {
    let prompt = args.prompt.trim().to_string();
    if prompt.is_empty() {
        bail!("--prompt must not be empty");
    }
    let config = args.config.load();
    let style = args
        .style
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| Some(config.default_style.clone()).filter(|value| !value.is_empty()));

    let plugin = build_plugin(config)?;
    let host = ConsoleHost::new(&args.out)?;
    let report = plugin
        .dispatch(&host, "cli", DrawRequest { prompt, style })
        .await;
    println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    Ok(if report.relayed > 0 { 0 } else { 2 })
}

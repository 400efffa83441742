//! Command line client for YT HTTP proxies.
//!
//! # Usage
//!
//! ```text
//! yt-http --proxy hume get //home
//! echo 'hello' | yt-http write-file //tmp/greeting
//! yt-http read-file //tmp/greeting
//! ```
//!
//! Connection settings come from `--config`, then `YT_PROXY` / `YT_TOKEN`,
//! then the flags below (later wins).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use yt_http::api::{CreateNodeOptions, NodeType, RemoveNodeOptions};
use yt_http::config::{load_config, ClientConfig};
use yt_http::observability::logging;
use yt_http::{yson, Context, HttpClient, StartTxOptions};

const STDIN_CHUNK: usize = 64 * 1024;

#[derive(Debug, Parser)]
#[command(name = "yt-http", version, about = "Talk to a YT cluster over HTTP")]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cluster entry point, overrides config and YT_PROXY.
    #[arg(long)]
    proxy: Option<String>,

    /// OAuth token, overrides config and YT_TOKEN.
    #[arg(long)]
    token: Option<String>,

    /// Give up after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List heavy proxies.
    Hosts,
    /// Print a node as YSON.
    Get { path: String },
    /// Replace a node with a YSON value.
    Set { path: String, value: String },
    Exists { path: String },
    List { path: String },
    /// Create a node (map_node, file, table, document).
    Create {
        node_type: String,
        path: String,
        #[arg(long)]
        recursive: bool,
        #[arg(long)]
        ignore_existing: bool,
    },
    Remove {
        path: String,
        #[arg(long)]
        recursive: bool,
        #[arg(long)]
        force: bool,
    },
    /// Copy a file node to stdout.
    ReadFile { path: String },
    /// Upload stdin into a file node.
    WriteFile { path: String },
    /// Start a transaction and print its id.
    BeginTx {
        /// Lease timeout in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::from_env(),
    };
    if cli.config.is_some() {
        if let Ok(proxy) = std::env::var("YT_PROXY") {
            config.proxy = proxy;
        }
        if let Ok(token) = std::env::var("YT_TOKEN") {
            config.token = token;
        }
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = proxy;
    }
    if let Some(token) = cli.token {
        config.token = token;
    }

    logging::init(&config.observability.log_level);

    let client = HttpClient::new(&config)?;
    tracing::info!(cluster_url = %client.cluster_url(), "Client ready");

    let ctx = match cli.timeout_secs {
        Some(secs) => Context::background().with_timeout(std::time::Duration::from_secs(secs)),
        None => Context::background(),
    };

    run(&client, &ctx, cli.command).await?;
    Ok(())
}

async fn run(client: &HttpClient, ctx: &Context, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = tokio::io::stdout();

    match command {
        Command::Hosts => {
            for host in client.list_heavy_proxies(ctx).await? {
                println!("{host}");
            }
        }
        Command::Get { path } => {
            let value = client.get_node(ctx, &path).await?;
            println!("{}", yson::to_string(&value));
        }
        Command::Set { path, value } => {
            let value = yson::from_slice(value.as_bytes())?;
            client.set_node(ctx, &path, &value).await?;
        }
        Command::Exists { path } => {
            println!("{}", client.node_exists(ctx, &path).await?);
        }
        Command::List { path } => {
            for name in client.list_node(ctx, &path).await? {
                println!("{name}");
            }
        }
        Command::Create {
            node_type,
            path,
            recursive,
            ignore_existing,
        } => {
            let node_type: NodeType = node_type.parse()?;
            let options = CreateNodeOptions {
                recursive,
                ignore_existing,
                ..CreateNodeOptions::default()
            };
            println!("{}", client.create_node(ctx, &path, node_type, &options).await?);
        }
        Command::Remove {
            path,
            recursive,
            force,
        } => {
            client
                .remove_node(ctx, &path, &RemoveNodeOptions { recursive, force })
                .await?;
        }
        Command::ReadFile { path } => {
            let mut reader = client.read_file(ctx, &path).await?;
            while let Some(chunk) = reader.chunk().await? {
                stdout.write_all(&chunk).await?;
            }
            stdout.flush().await?;
        }
        Command::WriteFile { path } => {
            let mut writer = client.write_file(ctx, &path).await?;
            let mut stdin = tokio::io::stdin();
            let mut buf = vec![0u8; STDIN_CHUNK];
            let mut total = 0usize;
            loop {
                let n = stdin.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                if let Err(e) = writer.write(&buf[..n]).await {
                    tracing::warn!(error = %e, "Upload stopped early");
                    break;
                }
                total += n;
            }
            writer.close().await?;
            tracing::info!(path = %path, bytes = total, "File uploaded");
        }
        Command::BeginTx { timeout_ms } => {
            let options = StartTxOptions {
                timeout: timeout_ms,
                ..StartTxOptions::default()
            };
            let tx = client.begin(ctx, options).await?;
            println!("{}", tx.id());
        }
    }

    Ok(())
}

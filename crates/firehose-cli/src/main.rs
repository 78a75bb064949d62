/// Firehose command-line tool: tail a filtered stream or replay a
/// captured one, printing one JSON record per line.
///
/// # Command overview
///
/// ```text
/// firehose <COMMAND> [OPTIONS]
///
/// Commands:
///   stream    Connect to the live filtered stream
///   replay    Decode a captured stream from a file or stdin
///   help      Print help information
///
/// Global options:
///   -v, --verbose    Log at debug level (RUST_LOG overrides)
///   --log-json       Emit logs as JSON lines
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                          |
/// |------|--------------------------------------------------|
/// | 0    | Stream completed, limit reached, or interrupted  |
/// | 1    | Configuration, transport, or decode error        |
///
/// Records go to stdout; logs and errors go to stderr.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use firehose_client::DEFAULT_ENDPOINT;

mod cmd_replay;
mod cmd_stream;
mod logging;
mod output;

// ── CLI root ──────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "firehose", version, about = "Filtered stream firehose client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Connect to the live filtered stream and print records.
    Stream(StreamArgs),
    /// Decode a captured stream and print records.
    Replay(ReplayArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `firehose stream`.
///
/// Credentials may come from flags or the environment:
///
/// ```text
/// ┌────────────────┬─────────────────────────┐
/// │ Flag           │ Environment variable    │
/// ├────────────────┼─────────────────────────┤
/// │ --api-key      │ FIREHOSE_API_KEY        │
/// │ --api-secret   │ FIREHOSE_API_SECRET     │
/// │ --token        │ FIREHOSE_TOKEN          │
/// │ --token-secret │ FIREHOSE_TOKEN_SECRET   │
/// │ --endpoint     │ FIREHOSE_ENDPOINT       │
/// └────────────────┴─────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct StreamArgs {
    /// OAuth consumer key.
    #[arg(long, env = "FIREHOSE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// OAuth consumer secret.
    #[arg(long, env = "FIREHOSE_API_SECRET", hide_env_values = true)]
    pub api_secret: String,

    /// OAuth access token.
    #[arg(long, env = "FIREHOSE_TOKEN", hide_env_values = true)]
    pub token: String,

    /// OAuth access token secret.
    #[arg(long, env = "FIREHOSE_TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: String,

    /// Phrase to track. Repeat for several phrases.
    #[arg(short, long = "track", required = true)]
    pub track: Vec<String>,

    /// Stream endpoint URL.
    #[arg(long, env = "FIREHOSE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Detach after this many records.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for `firehose replay`.
#[derive(clap::Args)]
pub struct ReplayArgs {
    /// Captured stream file, or `-` for stdin.
    pub file: PathBuf,

    /// Bytes read per pipeline chunk.
    #[arg(long, default_value_t = 8192)]
    pub chunk_size: usize,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    let result = match cli.command {
        Commands::Stream(args) => cmd_stream::run(&args).await,
        Commands::Replay(args) => cmd_replay::run(&args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

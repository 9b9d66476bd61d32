//! Command-line probe for XBoard variant engines: ask for a best move, a
//! fixed-depth analysis, or a hint from a given position.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use engine::{EngineSession, ProcessTransport, SessionConfig};
use janggi::{format_move, parse_fen, Variant};

#[derive(Parser)]
#[command(name = "janggitty", version, about = "XBoard variant engine probe")]
struct Cli {
    /// Engine binary; defaults to JANGGITTY_ENGINE_PATH or fairy-stockfish
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Game variant to play
    #[arg(long, value_enum, default_value = "janggi")]
    variant: VariantArg,

    /// Serialized position; the variant's start position when omitted
    #[arg(long)]
    fen: Option<String>,

    /// Emit JSON instead of plain text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the engine for its best move under a time budget
    Bestmove {
        #[arg(long, default_value_t = 1000)]
        movetime_ms: u64,
    },
    /// Run a fixed-depth search and print the final analysis snapshot
    Analyze {
        #[arg(long, default_value_t = 12)]
        depth: u32,
    },
    /// Ask the engine for a hint in the given position
    Hint,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Standard,
    Janggi,
    Xiangqi,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Standard => Variant::Standard,
            VariantArg::Janggi => Variant::Janggi,
            VariantArg::Xiangqi => Variant::Xiangqi,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let variant = Variant::from(cli.variant);
    let spec = variant.spec();

    let fen = cli.fen.as_deref().unwrap_or(spec.start_fen);
    let position = parse_fen(fen, variant)
        .with_context(|| format!("invalid {} position: {fen}", spec.protocol_name))?;

    let engine_path = cli.engine.unwrap_or_else(config::get_engine_path);
    let session_config = SessionConfig {
        poll_interval: config::get_poll_interval(),
        handshake_timeout: config::get_handshake_timeout(),
    };

    if let Some(nnue) = spec.nnue_file {
        tracing::debug!(nnue, "variant expects a NNUE weight file next to the engine");
    }

    let mut session = EngineSession::new(ProcessTransport::new(), session_config);
    session
        .initialize(&engine_path, variant)
        .await
        .with_context(|| format!("failed to start engine at {}", engine_path.display()))?;

    let outcome = run_command(&session, &cli.command, &position, variant, cli.json).await;
    if let Err(err) = session.quit().await {
        tracing::warn!(%err, "engine shutdown was not clean");
    }
    outcome
}

async fn run_command(
    session: &EngineSession<ProcessTransport>,
    command: &Command,
    position: &janggi::Position,
    variant: Variant,
    json: bool,
) -> Result<()> {
    match command {
        Command::Bestmove { movetime_ms } => {
            let mv = session
                .request_best_move(position, *movetime_ms)
                .await
                .context("best-move request failed")?;
            let token = format_move(&mv, variant);
            if json {
                println!("{}", serde_json::json!({ "move": token }));
            } else {
                println!("bestmove {token}");
            }
        }
        Command::Analyze { depth } => {
            let snapshot = session
                .request_analysis(position, *depth)
                .await
                .context("analysis request failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                let score = snapshot
                    .score
                    .map(|s| s.display())
                    .unwrap_or_else(|| "?".to_string());
                println!(
                    "depth {} score {} time {}ms nodes {} nps {}",
                    snapshot.depth, score, snapshot.time_ms, snapshot.nodes, snapshot.nps
                );
                println!("pv {}", snapshot.pv.join(" "));
            }
        }
        Command::Hint => {
            session.set_position(position).await?;
            let mv = session.hint().await.context("hint request failed")?;
            let token = format_move(&mv, variant);
            if json {
                println!("{}", serde_json::json!({ "hint": token }));
            } else {
                println!("hint {token}");
            }
        }
    }
    Ok(())
}

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::uninlined_format_args
)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use action_trace::hooks::{self, HookValue};
use action_trace::host::{self, HostContext};
use action_trace::{trace, Config, TraceFlags};

/// `action-trace` - see exactly which hooks fire during a request.
#[derive(Parser, Debug)]
#[command(name = "action-trace")]
#[command(version)]
#[command(about = "Trace every hook fired during a request.", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.action-trace/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded request through the tracer
    #[command(long_about = "\
Replay a recorded request through the tracer.

Reads a JSON array of hook firings and fires them in order as one request. \
The terminal hook is appended when the list does not already end with it. \
Tracing only happens when the query string enables it.

Event file format:
  [{\"hook\": \"init\"}, {\"hook\": \"the_title\", \"args\": [\"Hello\", 7]}]

Examples:
  action-trace run -q 'showDebugTrace=1' -e request.json
  action-trace run -q 'showDebugTrace=1&showDebugTime=1&showDebugArgs=1' -e -
  action-trace run -q 'showDebugTrace=1&logToFile=1' -e request.json --slug about")]
    Run {
        /// Request query string, e.g. "showDebugTrace=1&logToFile=1"
        #[arg(short, long, default_value = "")]
        query: String,

        /// JSON event file, or "-" for stdin
        #[arg(short, long)]
        events: String,

        /// Slug of the content item being rendered
        #[arg(long)]
        slug: Option<String>,

        /// Override the upload directory
        #[arg(long)]
        upload_dir: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// One hook firing in a replay file.
#[derive(Debug, Deserialize)]
struct FiredHook {
    hook: String,
    #[serde(default)]
    args: Vec<serde_json::Value>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging - respects RUST_LOG env var, defaults to INFO.
    // Logs go to stderr so inline trace output on stdout stays clean.
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }

        Commands::Run {
            query,
            events,
            slug,
            upload_dir,
        } => {
            if let Some(dir) = upload_dir {
                config.upload_dir = dir;
                config.validate()?;
            }
            let fired = read_events(&events)?;
            replay(&config, &query, slug, fired)
        }
    }
}

fn read_events(source: &str) -> Result<Vec<FiredHook>> {
    let contents = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read events from stdin")?;
        buf
    } else {
        std::fs::read_to_string(Path::new(source))
            .with_context(|| format!("Failed to read event file {source}"))?
    };
    parse_events(&contents)
}

fn parse_events(contents: &str) -> Result<Vec<FiredHook>> {
    let fired: Vec<FiredHook> =
        serde_json::from_str(contents).context("Failed to parse event file")?;
    if let Some(i) = fired.iter().position(|f| f.hook.trim().is_empty()) {
        bail!("event #{i} has an empty hook name");
    }
    Ok(fired)
}

/// Fire `fired` (plus the terminal hook if missing) through a fresh registry.
fn replay(config: &Config, query: &str, slug: Option<String>, fired: Vec<FiredHook>) -> Result<()> {
    let registry = hooks::create_registry();
    let local = Arc::new(host::create_host(config));
    local.set_current_slug(slug);
    let host: Arc<dyn HostContext> = local;

    let flags = TraceFlags::from_query(query);
    let collector = trace::install(&registry, flags, config, host);

    let terminal = config.trace.terminal_hook.as_str();
    let needs_terminal = fired.last().map_or(true, |f| f.hook != terminal);
    let mut sequence: Vec<(String, Vec<HookValue>)> = fired
        .into_iter()
        .map(|f| (f.hook, f.args.into_iter().map(HookValue::from).collect()))
        .collect();
    if needs_terminal {
        sequence.push((terminal.to_string(), Vec::new()));
    }

    for (hook, args) in &sequence {
        if let hooks::HookAction::Halt { reason } = registry.fire(hook, args) {
            bail!("request aborted at `{hook}`: {reason}");
        }
    }

    match collector {
        Some(c) => tracing::info!(recorded = c.len(), fired = sequence.len(), "Replay finished"),
        None => tracing::info!(fired = sequence.len(), "Replay finished (tracing disabled)"),
    }
    Ok(())
}

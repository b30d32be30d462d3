//! companion-bridge binary: exposes the bridge tools to a host from the command line.

mod commands;
mod config;

use cb_transport::{HttpTransport, ProcessEnv};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, Parser)]
#[command(name = "companion-bridge", version, about = "Agent tools for the local and Drive playground bridges")]
struct Cli {
    /// Config file (default: ~/.companion-bridge/config.toml).
    #[arg(long, global = true, env = "COMPANION_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the registered tool definitions as JSON (default).
    Tools,
    /// Invoke one tool and print its JSON result.
    Call {
        tool: String,
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Check bridge configuration and bridge health.
    Doctor,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Tools => "tools",
            Self::Call { .. } => "call",
            Self::Doctor => "doctor",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv().ok();
    init_tracing()?;
    if let Some(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tools);
    install_panic_hook(command.name());

    let cfg = config::CompanionConfig::load(cli.config).await?;
    let transport = Arc::new(HttpTransport::new(cfg.request_timeout())?);
    let env = Arc::new(ProcessEnv);

    match command {
        Command::Tools => {
            let registry = commands::build_registry(&cfg, transport, env);
            println!("{}", commands::render_definitions(&registry)?);
            Ok(())
        }
        Command::Call { tool, args } => {
            let registry = commands::build_registry(&cfg, transport, env);
            let output = commands::call_tool(&registry, &tool, &args).await?;
            println!("{output}");
            Ok(())
        }
        Command::Doctor => {
            for line in commands::doctor(&cfg, transport, env).await {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(v) => v,
        Err(_) => EnvFilter::new("warn,cb_app=info,cb_tools=info,cb_transport=info"),
    };
    let log_format = std::env::var("COMPANION_BRIDGE_LOG_FORMAT")
        .unwrap_or_else(|_| "json".to_string())
        .to_ascii_lowercase();

    // Logs go to stderr so stdout stays machine-readable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(true)
                .init();
        }
        "pretty" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .pretty()
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .compact()
                .init();
        }
        other => {
            return Err(anyhow::anyhow!(
                "unsupported COMPANION_BRIDGE_LOG_FORMAT={other:?}; expected one of: json, pretty, compact"
            ));
        }
    }

    tracing::debug!(
        log_format = %log_format,
        env_filter = ?std::env::var("RUST_LOG").ok(),
        "tracing initialized"
    );
    Ok(())
}

/// Panics are logged with the subcommand that was running, then handed to
/// the default hook.
fn install_panic_hook(command: &'static str) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()));
        tracing::error!(
            command,
            location = location.as_deref().unwrap_or("unknown"),
            message = panic_message(info.payload()),
            "companion-bridge panicked"
        );
        default_hook(info);
    }));
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string payload>")
}

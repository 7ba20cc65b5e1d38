use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use toolcall::cli::{simulate, summarize, SimulateOptions};
use toolcall::utils::LoggingConfig;
use toolcall::{MemoryStore, SerializedToolInvocation, Settings, SnapshotStore};

#[derive(Parser)]
#[command(name = "toolcall", version, about = "Tool invocation lifecycle CLI", author)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a simulated tool call and print its final snapshot
    Simulate {
        #[arg(long, default_value = "demo.echo")]
        tool_id: String,
        #[arg(long, default_value = "Echo")]
        display_name: String,
        #[arg(long, default_value = "call-1")]
        call_id: String,
        /// Require confirmation with this title
        #[arg(long)]
        confirmation: Option<String>,
        #[arg(long)]
        deny: bool,
        #[arg(long, default_value_t = 3)]
        steps: u32,
        #[arg(long)]
        result_message: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Record the final snapshot in an in-memory transcript
        #[arg(long)]
        persist: bool,
        #[arg(long)]
        pretty: bool,
    },
    /// Summarize a stored snapshot
    Inspect { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    LoggingConfig::init_with_debug(settings.debug);

    let cli = Cli::parse();
    match cli.command {
        Command::Simulate {
            tool_id,
            display_name,
            call_id,
            confirmation,
            deny,
            steps,
            result_message,
            output,
            persist,
            pretty,
        } => {
            let store = Arc::new(MemoryStore::new());
            let transcript = persist.then(|| settings.transcript(store.clone()));
            let options = SimulateOptions {
                tool_id,
                display_name,
                tool_call_id: call_id,
                confirmation,
                deny,
                steps,
                result_message,
                transcript,
            };
            let report = simulate(options, settings.formatter()).await?;
            for update in &report.progress {
                let message = update
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_default();
                eprintln!("progress {:>6.1} {}", update.progress, message);
            }
            if persist {
                for key in store.keys(&settings.transcript_prefix).await? {
                    eprintln!("recorded `{key}`");
                }
            }
            let content = report.snapshot.to_json_string(pretty)?;
            if let Some(path) = output {
                fs::write(&path, content)?;
                println!("Snapshot written to `{}`", path.display());
            } else {
                println!("{content}");
            }
        }
        Command::Inspect { path } => {
            let content = fs::read_to_string(&path)?;
            let snapshot = SerializedToolInvocation::from_json_str(&content)?;
            println!("{}", summarize(&snapshot));
        }
    }
    Ok(())
}

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use copilot_ai::CancellationToken;
use copilot_cli::input::read_input;
use copilot_cli::{build_pipeline, build_provider, run_server, Runner};
use copilot_config::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "copilot")]
#[command(
    about = "Requirements copilot - requirements analysis, impact assessment and code generation"
)]
#[command(version)]
struct Cli {
    /// Answer from built-in canned replies instead of calling the provider
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        #[arg(long, help = "Listen host (overrides COPILOT_HOST)")]
        host: Option<String>,
        #[arg(long, help = "Listen port (overrides COPILOT_PORT)")]
        port: Option<u16>,
    },
    /// Analyze a requirements document into the 13 categories
    Analyze {
        /// Document file; reads piped stdin when omitted
        file: Option<PathBuf>,
    },
    /// Assess the technical impact of an AnalysisResult JSON document
    Impact {
        /// AnalysisResult JSON file; reads piped stdin when omitted
        file: Option<PathBuf>,
    },
    /// Generate code from an ImpactAssessment JSON document
    Generate {
        /// ImpactAssessment JSON file; reads piped stdin when omitted
        file: Option<PathBuf>,
    },
    /// Run every stage on a requirements document
    Run {
        /// Document file; reads piped stdin when omitted
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy)]
enum StageCommand {
    Analyze,
    Impact,
    Generate,
    Run,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(cli: Cli) -> Result<()> {
    let mut config = Config::from_env()?;
    let provider = build_provider(&config, cli.offline)?;
    let pipeline = build_pipeline(&config, provider)?;

    let (stage, file) = match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            return run_server(&config, pipeline).await;
        }
        Commands::Analyze { file } => (StageCommand::Analyze, file),
        Commands::Impact { file } => (StageCommand::Impact, file),
        Commands::Generate { file } => (StageCommand::Generate, file),
        Commands::Run { file } => (StageCommand::Run, file),
    };

    let stdin = io::stdin();
    let piped = (!stdin.is_terminal()).then(|| stdin.lock());
    let input = read_input(file.as_deref(), piped)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling generation");
            interrupt.cancel();
        }
    });

    let runner = Runner::new(pipeline, config.diagnostics_dir.clone());
    let output = match stage {
        StageCommand::Analyze => runner.analyze(input, &cancel).await?,
        StageCommand::Impact => runner.impact(input, &cancel).await?,
        StageCommand::Generate => runner.generate(input, &cancel).await?,
        StageCommand::Run => runner.run(input, &cancel).await?,
    };

    println!("{}", output);
    info!("Done");
    Ok(())
}

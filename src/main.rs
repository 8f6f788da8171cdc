//! Fennec agent - main entry point.

use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fennec_agent::{AgentConfig, CycleOutcome, WorkerRuntime, shutdown};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "fennec-agent")]
#[command(about = "Claims and executes jobs from a Fennec controller")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process at most one job, then exit
    RunOnce,
    /// Poll for and process jobs until interrupted
    Work,
    /// Print the agent version
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let Some(command) = args.command else {
        println!("Fennec agent {}", VERSION);
        let _ = Args::command().print_help();
        return ExitCode::from(2);
    };

    if let Command::Version = command {
        println!("Fennec agent {}", VERSION);
        return ExitCode::SUCCESS;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fennec_agent=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let config = AgentConfig::from_env()?;
    tracing::info!(controller = %config.controller_url, "Fennec agent {}", VERSION);

    let runtime = WorkerRuntime::new(&config);

    match command {
        Command::RunOnce => {
            if let CycleOutcome::Completed { job_id, status } = runtime.run_once().await? {
                tracing::info!(job_id, %status, "Cycle finished");
            }
        }
        Command::Work => {
            let shutdown = shutdown::install_shutdown_handler();
            runtime.run_forever(shutdown).await;
        }
        Command::Version => {}
    }

    Ok(())
}

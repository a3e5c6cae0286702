// src/main.rs - Robot host: runs a motion program and serves the control triggers
use armctl::config::{self, Config};
use armctl::instance::InstanceLock;
use armctl::program::{load_program, run_program};
use armctl::{Robot, SimulatedArm};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Parser, Debug)]
#[command(name = "armctl-host", version, about = "Runs robot motion programs with pause/resume/stop control")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "armctl.toml")]
    config: String,

    /// More output; repeat for trace level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute every command of a program file in order
    Run { program: PathBuf },
    /// Only serve the control endpoints
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    // Initialize logging
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    tracing::info!("Starting armctl host");
    tracing::info!("Version: {}", armctl::API_VERSION);
    tracing::info!("Loading configuration from: {}", cli.config);

    let config = config::load_config(&cli.config).map_err(|e| {
        tracing::error!("Failed to load config from '{}': {}", cli.config, e);
        Box::new(e) as BoxError
    })?;

    let _instance = match &config.robot.instance_lock {
        Some(path) => Some(InstanceLock::acquire(
            path,
            Duration::from_millis(config.robot.instance_retry_ms),
        )?),
        None => None,
    };

    let backend = Arc::new(SimulatedArm::new(config.simulator.clone()));
    let robot = Arc::new(Robot::new(&config.robot, backend)?);

    if config.control.enabled {
        spawn_control_service(&config, robot.clone()).await?;
    }

    let result = match cli.command {
        Commands::Run { program } => execute_program(robot.clone(), program).await,
        Commands::Serve => {
            tokio::signal::ctrl_c().await?;
            Ok(())
        }
    };

    robot.shutdown();
    result
}

async fn spawn_control_service(config: &Config, robot: Arc<Robot>) -> Result<(), BoxError> {
    let app = armctl::web::api::create_router(robot);
    let listener = tokio::net::TcpListener::bind(&config.control.bind).await?;
    tracing::info!("Control service listening on http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Control service stopped: {}", e);
        }
    });
    Ok(())
}

async fn execute_program(robot: Arc<Robot>, path: PathBuf) -> Result<(), BoxError> {
    let program = load_program(&path)?;
    let interrupted = Arc::new(AtomicBool::new(false));

    // Ctrl-C stops the running command instead of killing the process mid-motion.
    let ctrl_c = {
        let robot = robot.clone();
        let interrupted = interrupted.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping motion");
                interrupted.store(true, Ordering::SeqCst);
                robot.stop();
            }
        })
    };

    let outcome =
        tokio::task::spawn_blocking(move || run_program(&robot, &program, &interrupted)).await;
    ctrl_c.abort();
    outcome?.map_err(Into::into)
}

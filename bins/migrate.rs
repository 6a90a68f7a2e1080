use std::process::ExitCode;

use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Up,
    Down,
    Status,
}

impl Command {
    fn parse(arg: Option<&str>) -> Option<Self> {
        match arg {
            None | Some("up") => Some(Command::Up),
            Some("down") => Some(Command::Down),
            Some("status") => Some(Command::Status),
            Some(_) => None,
        }
    }
}

fn init_logging(format: configs::LogFormat) {
    match format {
        configs::LogFormat::Json => common::utils::logging::init_logging_json(),
        configs::LogFormat::Compact => common::utils::logging::init_logging_default(),
    }
    info!(service = "migrate", event = "logger_init", "tracing subscriber initialized");
}

async fn run(cfg: &configs::AppConfig, command: Command) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    match command {
        Command::Up => Migrator::up(&db, None).await?,
        // one step at a time; repeated runs walk further back
        Command::Down => Migrator::down(&db, Some(1)).await?,
        Command::Status => Migrator::status(&db).await?,
    }
    Ok(())
}

fn main() -> ExitCode {
    // Load .env before reading CONFIG_PATH, DATABASE_URL or RUST_LOG
    dotenv().ok();

    let arg = std::env::args().nth(1);
    let cfg = configs::AppConfig::load_and_validate();
    init_logging(cfg.as_ref().map(|c| c.logging.format).unwrap_or_default());

    let run_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "migrate", event = "panic", %run_id, pid, message = %info, "unhandled panic occurred");
    }));

    let Some(command) = Command::parse(arg.as_deref()) else {
        error!(service = "migrate", event = "bad_arguments", arg = ?arg, "usage: migrate [up|down|status]");
        return ExitCode::FAILURE;
    };
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "migrate", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "migrate", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(service = "migrate", event = "start", %run_id, pid, version, ?command, "migration run starting");
    match rt.block_on(run(&cfg, command)) {
        Ok(()) => {
            info!(service = "migrate", event = "stop", %run_id, pid, ?command, "migration run finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "migrate", event = "run_failed", %run_id, error = %e, "migration run failed");
            ExitCode::FAILURE
        }
    }
}

//! # Till Terminal Library
//!
//! The register console: configuration, state, commands and the stdin loop.
//!
//! ## Module Organization
//! ```text
//! till_terminal/
//! ├── lib.rs          ◄─── You are here (startup & console loop)
//! ├── state/
//! │   ├── mod.rs      ◄─── State exports
//! │   ├── db.rs       ◄─── DbState (database handle)
//! │   ├── register.rs ◄─── RegisterState (catalog, ledger, session, cart)
//! │   └── config.rs   ◄─── ConfigState (environment configuration)
//! ├── commands/       ◄─── One module per surface (cart, sale, session, ...)
//! ├── persist.rs      ◄─── Load at startup, save after commits
//! ├── console.rs      ◄─── Line parser and renderer
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod console;
pub mod error;
pub mod persist;
pub mod state;

use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use console::{Console, Reply};
use error::ApiError;
use state::{ConfigState, DbState, RegisterState};
use till_store::{Database, DbConfig, StoreError};

/// Reasons the console could not start or keep running.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Could not determine app data directory")]
    NoDataDir,

    #[error("Could not create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Database unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("Could not load the register: {0}")]
    Load(#[from] ApiError),

    #[error("Console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs the register console on stdin/stdout.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info,till=debug,sqlx=warn; override with RUST_LOG        │
/// │                                                                         │
/// │  2. Read Configuration ───────────────────────────────────────────────► │
/// │     • TILL_* environment variables over defaults                        │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  4. Load Register ────────────────────────────────────────────────────► │
/// │     • Catalog, ledger, open session from the last snapshot              │
/// │     • Demo catalog on first run (TILL_SEED_DEMO)                        │
/// │                                                                         │
/// │  5. Console Loop ─────────────────────────────────────────────────────► │
/// │     • One command per line until `quit` or end of input                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), StartupError> {
    init_tracing();

    info!("Starting Till POS register console");

    let config = ConfigState::from_env();
    let db_path = get_database_path(&config)?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    let register = persist::load_register(&db, &config).await?;
    let console = Console::new(RegisterState::new(register), DbState::new(db.clone()), config);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let result = run_console(&console, stdin, tokio::io::stdout()).await;

    db.close().await;
    info!("Register console stopped");
    Ok(result?)
}

/// Reads commands from `input` until `quit` or end of input, writing
/// replies and errors to `output`.
pub async fn run_console<R, W>(console: &Console, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let banner = console
        .register()
        .with_register(|r| format!("{} - type 'help' for commands\n", r.settings.name));
    output.write_all(banner.as_bytes()).await?;

    let mut lines = input.lines();
    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let text = match console.handle_line(&line).await {
            Ok(Some(Reply::Text(text))) => text,
            Ok(Some(Reply::Quit)) => break,
            Ok(None) => continue,
            Err(err) => format!("error [{}]: {}", err.code.as_str(), err.message),
        };

        output.write_all(text.as_bytes()).await?;
        output.write_all(b"\n").await?;
    }

    output.flush().await
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=till=trace` - Show trace for till crates only
/// - Default: info, with debug for till crates
///
/// Logs go to stderr; stdout belongs to the console.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,till=debug,sqlx=warn"));

    // A subscriber may already be set (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.till.pos/till.db`
/// - **Windows**: `%APPDATA%\till\pos\data\till.db`
/// - **Linux**: `~/.local/share/pos/till.db`
///
/// ## Override
/// `TILL_DB_PATH` (see [`ConfigState::from_env`]) takes precedence.
fn get_database_path(config: &ConfigState) -> Result<PathBuf, StartupError> {
    if let Some(path) = &config.database_path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "till", "pos").ok_or(StartupError::NoDataDir)?;
    let data_dir = proj_dirs.data_dir();

    std::fs::create_dir_all(data_dir).map_err(|source| StartupError::DataDir {
        path: data_dir.to_path_buf(),
        source,
    })?;

    Ok(data_dir.join("till.db"))
}

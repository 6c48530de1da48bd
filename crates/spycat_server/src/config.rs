//! Command-line and environment configuration.

use clap::{Args, Parser, Subcommand};
use spycat_api::DEFAULT_BREED_API_URL;
use std::net::SocketAddr;
use std::time::Duration;

/// Path value that selects a throwaway in-memory database.
pub const IN_MEMORY_DB: &str = ":memory:";
const DEFAULT_DB_PATH: &str = "spycat.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "spycat_server", about = "Spy Cat Agency backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API.
    Serve(ServeArgs),
    /// Open the database, apply pending migrations and exit.
    Migrate {
        #[arg(long, env = "SPYCAT_DB_PATH", default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },
    /// Print the core version.
    Version,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, env = "SPYCAT_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,
    #[arg(long, env = "SPYCAT_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: String,
    /// Defaults to `debug` in debug builds and `info` in release builds.
    #[arg(long, env = "SPYCAT_LOG_LEVEL")]
    pub log_level: Option<String>,
    /// Absolute directory for rotated log files; stderr when unset.
    #[arg(long, env = "SPYCAT_LOG_DIR")]
    pub log_dir: Option<String>,
    #[arg(long, env = "SPYCAT_BREED_API_URL", default_value = DEFAULT_BREED_API_URL)]
    pub breed_api_url: String,
    #[arg(long, env = "SPYCAT_BREED_TIMEOUT_MS", default_value_t = 5000)]
    pub breed_timeout_ms: u64,
    /// Accept any breed without asking the catalog.
    #[arg(long, env = "SPYCAT_SKIP_BREED_CHECK")]
    pub skip_breed_check: bool,
}

impl ServeArgs {
    pub fn breed_timeout(&self) -> Duration {
        Duration::from_millis(self.breed_timeout_ms)
    }
}

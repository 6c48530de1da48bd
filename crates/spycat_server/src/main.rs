//! Spy Cat Agency server entry point.
//!
//! # Responsibility
//! - Parse configuration, initialize logging and open the database.
//! - Serve the HTTP router until Ctrl-C.

mod config;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::{Cli, Command, ServeArgs, IN_MEMORY_DB};
use log::info;
use rusqlite::Connection;
use spycat_api::{build_router, AppState, BreedClient, BreedSource};
use spycat_core::db::migrations::current_user_version;
use spycat_core::db::{open_db, open_db_in_memory, DbResult};
use spycat_core::{core_version, default_log_level, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Serve(args) => serve(args).await,
        Command::Migrate { db_path } => migrate(&db_path),
        Command::Version => {
            println!("spycat_core version={}", core_version());
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let level = args.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, args.log_dir.as_deref()).map_err(|err| anyhow!(err))?;

    let breeds = if args.skip_breed_check {
        BreedSource::Disabled
    } else {
        BreedSource::Remote(
            BreedClient::new(args.breed_api_url.as_str(), args.breed_timeout())
                .context("failed to build breed catalog client")?,
        )
    };

    let conn = open_database(&args.db_path)
        .with_context(|| format!("failed to open database `{}`", args.db_path))?;
    let app = build_router(AppState::new(conn, breeds));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(
        "event=server_start module=server status=ok bind={} db_path={} breed_check={}",
        args.bind, args.db_path, !args.skip_breed_check
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

fn migrate(db_path: &str) -> Result<()> {
    init_logging(default_log_level(), None).map_err(|err| anyhow!(err))?;

    let conn = open_database(db_path)
        .with_context(|| format!("failed to open database `{db_path}`"))?;
    println!("schema_version={}", current_user_version(&conn)?);
    Ok(())
}

fn open_database(db_path: &str) -> DbResult<Connection> {
    if db_path == IN_MEMORY_DB {
        open_db_in_memory()
    } else {
        open_db(db_path)
    }
}

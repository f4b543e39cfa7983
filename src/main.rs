// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use env_logger::Env;

use walletwise::{cli, config::Config, db, routes, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = cli::build_cli().get_matches();
    let mut config = Config::from_env()?;

    match matches.subcommand() {
        Some(("init", sub)) => {
            let path = match (sub.get_one::<String>("db"), config.db_path.take()) {
                (Some(p), _) => PathBuf::from(p),
                (None, Some(p)) => p,
                (None, None) => db::db_path()?,
            };
            db::open_or_init(Some(&path))?;
            println!("Database initialized at {}", path.display());
        }
        Some(("serve", sub)) => {
            if let Some(addr) = sub.get_one::<String>("addr") {
                config.addr = addr.clone();
            }
            if let Some(path) = sub.get_one::<String>("db") {
                config.db_path = Some(PathBuf::from(path));
            }
            serve(config).await?;
        }
        _ => serve(config).await?,
    }
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let conn = db::open_or_init(config.db_path.as_deref())?;
    let addr: SocketAddr = config
        .addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.addr))?;
    if config.brapi_token.is_none() {
        log::warn!("BRAPI_API_TOKEN is not set; quote requests will fail");
    }
    if config.gemini_api_key.is_none() {
        log::warn!("GEMINI_API_KEY is not set; analysis requests will fail");
    }

    let state = AppState::new(db::shared(conn), config)?;
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

//! Backend entry-point: loads configuration, assembles adapters and serves
//! the REST API.

use std::ffi::OsString;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use devcamper::inbound::http::health::HealthState;
use devcamper::server::{AppDependencies, AppSettings, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args: Vec<OsString> = std::env::args_os().collect();
    let settings = AppSettings::load_from_iter(args)
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let http_state = build_http_state(&settings).await?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        AppDependencies {
            health_state: health_state.clone(),
            http_state: web::Data::new(http_state),
        },
        bind_addr,
    )?;

    info!(%bind_addr, "devcamper listening");
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome
}

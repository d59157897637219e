#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use pingwatch_service::{Config, Scheduler, TargetStore};
use tracing::info;

mod error;
mod routes;
mod state;

use error::AppError;
use logger::init_tracing;
use state::AppState;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_config(env::var_os("PINGWATCH_CONFIG"))?;
    info!("{config}");

    let store = TargetStore::load(&config.targets.path)?;
    let scheduler = Arc::new(Scheduler::from_config(&config, store.targets().to_vec())?);
    if config.server.autostart {
        scheduler.start();
    }

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let state = web::Data::new(AppState::new(Arc::clone(&scheduler), store));
    run_server(addr, state).await?;

    scheduler.stop_and_wait().await;
    Ok(())
}

async fn run_server(addr: SocketAddr, state: web::Data<AppState>) -> Result<(), AppError> {
    info!(%addr, "Control server listening");
    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes::routes))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}

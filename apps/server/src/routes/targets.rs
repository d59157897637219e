use actix_web::{HttpResponse, delete, get, post, web};
use pingwatch_service::Target;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

macros_utils::routes! {
    route list_targets_route,
    route add_target_route,
    route remove_target_route,
}

#[derive(Debug, Deserialize)]
pub struct RemoveQuery {
    url: String,
}

#[derive(Debug, Serialize)]
struct RemoveResponse {
    removed: usize,
}

/// Targets persisted in the target file
#[get("/targets")]
pub async fn list_targets_route(state: web::Data<AppState>) -> HttpResponse {
    let store = state.store.lock().await;
    HttpResponse::Ok().json(store.targets())
}

/// Add a target and persist the list.
///
/// A running loop keeps its current targets; the new list applies from the
/// next start.
#[post("/targets")]
pub async fn add_target_route(
    state: web::Data<AppState>,
    target: web::Json<Target>,
) -> Result<HttpResponse, ApiError> {
    let target = target.into_inner();
    let mut store = state.store.lock().await;

    // file writes go to the blocking pool; the lock keeps writers serialized
    let mut candidate = store.clone();
    let (added, candidate) = web::block(move || candidate.add(target).map(|added| (added, candidate))).await??;
    *store = candidate;
    state.scheduler.set_targets(store.targets().to_vec());

    info!(url = %added.url, method = %added.method, "Target added");
    Ok(HttpResponse::Created().json(added))
}

/// Remove every target with the given URL and persist the list
#[delete("/targets")]
pub async fn remove_target_route(
    state: web::Data<AppState>,
    query: web::Query<RemoveQuery>,
) -> Result<HttpResponse, ApiError> {
    let url = query.into_inner().url;
    let mut store = state.store.lock().await;

    let mut candidate = store.clone();
    let target_url = url.clone();
    let (removed, candidate) =
        web::block(move || candidate.remove(&target_url).map(|removed| (removed, candidate))).await??;
    if removed == 0 {
        return Err(ApiError::TargetNotFound(url));
    }
    *store = candidate;
    state.scheduler.set_targets(store.targets().to_vec());

    info!(%url, removed, "Target removed");
    Ok(HttpResponse::Ok().json(RemoveResponse { removed }))
}

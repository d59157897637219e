use actix_web::{HttpResponse, Responder, get, post, web};
use pingwatch_service::{StartOutcome, StopOutcome};
use serde::Serialize;

use crate::state::AppState;

macros_utils::routes! {
    route start_route,
    route stop_route,
    route status_route,
}

#[derive(Debug, Serialize)]
struct StartResponse {
    already_running: bool,
}

#[derive(Debug, Serialize)]
struct StopResponse {
    already_stopped: bool,
}

/// Start the scheduling loop
#[post("/start")]
pub async fn start_route(state: web::Data<AppState>) -> impl Responder {
    let outcome = state.scheduler.start();
    HttpResponse::Ok().json(StartResponse { already_running: outcome == StartOutcome::AlreadyRunning })
}

/// Stop the scheduling loop, returning once it has exited
#[post("/stop")]
pub async fn stop_route(state: web::Data<AppState>) -> impl Responder {
    let outcome = state.scheduler.stop_and_wait().await;
    HttpResponse::Ok().json(StopResponse { already_stopped: outcome == StopOutcome::AlreadyStopped })
}

#[get("/status")]
pub async fn status_route(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.scheduler.status())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test, web};
    use pingwatch_service::{Config, Scheduler, TargetStore};
    use serde_json::Value;
    use tempfile::tempdir;

    use crate::state::AppState;

    fn state(dir: &std::path::Path) -> web::Data<AppState> {
        let scheduler = Scheduler::from_config(&Config::default(), Vec::new()).unwrap();
        let store = TargetStore::load(dir.join("websites.json")).unwrap();
        web::Data::new(AppState::new(Arc::new(scheduler), store))
    }

    #[actix_web::test]
    async fn test_start_stop_lifecycle() {
        let dir = tempdir().unwrap();
        let state = state(dir.path());
        let app = test::init_service(App::new().app_data(state.clone()).configure(super::routes)).await;

        let status: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/status").to_request()).await;
        assert_eq!(status["running"], false);
        assert_eq!(status["interval_seconds"], 780);

        let started: Value =
            test::call_and_read_body_json(&app, test::TestRequest::post().uri("/start").to_request()).await;
        assert_eq!(started["already_running"], false);

        let again: Value =
            test::call_and_read_body_json(&app, test::TestRequest::post().uri("/start").to_request()).await;
        assert_eq!(again["already_running"], true);

        let status: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/status").to_request()).await;
        assert_eq!(status["running"], true);

        let stopped: Value =
            test::call_and_read_body_json(&app, test::TestRequest::post().uri("/stop").to_request()).await;
        assert_eq!(stopped["already_stopped"], false);

        let again: Value =
            test::call_and_read_body_json(&app, test::TestRequest::post().uri("/stop").to_request()).await;
        assert_eq!(again["already_stopped"], true);

        assert!(!state.scheduler.is_running());
    }
}

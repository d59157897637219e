use actix_web::web::ServiceConfig;

mod control;
mod health;
mod targets;

/// Register every route of the control surface
pub fn routes(cfg: &mut ServiceConfig) {
    cfg.configure(health::routes).configure(control::routes).configure(targets::routes);
}

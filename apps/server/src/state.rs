use std::sync::Arc;

use pingwatch_service::{Scheduler, TargetStore};
use tokio::sync::Mutex;

/// Shared by every worker; handed to actix as `web::Data`
pub struct AppState {
    pub scheduler: Arc<Scheduler>,
    pub store: Mutex<TargetStore>,
}

impl AppState {
    pub fn new(scheduler: Arc<Scheduler>, store: TargetStore) -> Self {
        Self { scheduler, store: Mutex::new(store) }
    }
}

//! API routes for the nofly server.

pub mod error;
pub mod request_id;
mod routes;
pub mod zones;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}

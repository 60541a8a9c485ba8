//! handlers/mod.rs
//! Endpoints HTTP. Cada uno valida el rol y delega en su servicio.

pub mod admin_handler;
pub mod auth;
pub mod caja_handler;
pub mod dashboard_handler;
pub mod documento_handler;
pub mod matrizador_handler;
pub mod notificacion_handler;

use actix_web::HttpResponse;
use serde_json::json;

/// GET /api/health
pub async fn health_endpoint() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

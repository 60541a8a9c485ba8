//! handlers/dashboard_handler.rs
//! Cada dashboard es visible para su rol y para ADMIN.
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::auth::UsuarioActual;
use crate::models::matrizador_model::Rol;
use crate::models::PaginacionQuery;
use crate::services::dashboard_service::DashboardService;

#[derive(Debug, Deserialize)]
pub struct DashboardMatrizadorQuery {
    /// Solo ADMIN puede consultar el de otro matrizador
    pub matrizador_id: Option<String>,
}

/// GET /api/dashboard/admin
pub async fn dashboard_admin_endpoint(
    usuario: UsuarioActual,
    service: web::Data<DashboardService>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    Ok(HttpResponse::Ok().json(service.admin().await?))
}

/// GET /api/dashboard/caja
pub async fn dashboard_caja_endpoint(
    usuario: UsuarioActual,
    service: web::Data<DashboardService>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin, Rol::Caja])?;
    Ok(HttpResponse::Ok().json(service.caja().await?))
}

/// GET /api/dashboard/matrizador
pub async fn dashboard_matrizador_endpoint(
    usuario: UsuarioActual,
    service: web::Data<DashboardService>,
    query: web::Query<DashboardMatrizadorQuery>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin, Rol::Matrizador])?;
    let matrizador_id = match (usuario.rol(), query.into_inner().matrizador_id) {
        (Rol::Admin, Some(id)) => id,
        _ => usuario.id().to_string(),
    };
    Ok(HttpResponse::Ok().json(service.matrizador(&matrizador_id).await?))
}

/// GET /api/dashboard/recepcion
pub async fn dashboard_recepcion_endpoint(
    usuario: UsuarioActual,
    service: web::Data<DashboardService>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin, Rol::Recepcion])?;
    Ok(HttpResponse::Ok().json(service.recepcion().await?))
}

/// GET /api/dashboard/archivo
pub async fn dashboard_archivo_endpoint(
    usuario: UsuarioActual,
    service: web::Data<DashboardService>,
    query: web::Query<PaginacionQuery>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin, Rol::Archivo])?;
    Ok(HttpResponse::Ok().json(service.archivo(query.page, query.page_size).await?))
}

//! handlers/caja_handler.rs
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::auth::UsuarioActual;
use crate::models::matrizador_model::Rol;
use crate::models::pago_model::{RegistrarPagoRequest, RegistrarRetencionRequest};
use crate::models::PaginacionQuery;
use crate::services::pago_service::PagoService;

const ROLES_CAJA: &[Rol] = &[Rol::Admin, Rol::Caja];

/// POST /api/caja/documentos/{id}/pagos
pub async fn registrar_pago_endpoint(
    usuario: UsuarioActual,
    service: web::Data<PagoService>,
    path: web::Path<String>,
    body: web::Json<RegistrarPagoRequest>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(ROLES_CAJA)?;
    let resultado = service
        .registrar_pago(&path.into_inner(), body.into_inner(), usuario.auditoria())
        .await?;
    Ok(HttpResponse::Ok().json(resultado))
}

/// POST /api/caja/documentos/{id}/retenciones
pub async fn registrar_retencion_endpoint(
    usuario: UsuarioActual,
    service: web::Data<PagoService>,
    path: web::Path<String>,
    body: web::Json<RegistrarRetencionRequest>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(ROLES_CAJA)?;
    let resultado = service
        .registrar_retencion(&path.into_inner(), body.into_inner(), usuario.auditoria())
        .await?;
    Ok(HttpResponse::Ok().json(resultado))
}

/// GET /api/caja/pendientes
pub async fn listar_pendientes_endpoint(
    usuario: UsuarioActual,
    service: web::Data<PagoService>,
    query: web::Query<PaginacionQuery>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(ROLES_CAJA)?;
    let lista = service.pendientes_de_pago(query.page, query.page_size).await?;
    Ok(HttpResponse::Ok().json(lista))
}

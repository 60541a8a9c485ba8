//! handlers/admin_handler.rs
//! Reconciliación de montos y respaldos (solo ADMIN).
use actix_files::NamedFile;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::handlers::auth::UsuarioActual;
use crate::models::matrizador_model::Rol;
use crate::services::{backup_service::BackupService, pago_service::PagoService};

/// GET /api/admin/reconciliacion
pub async fn reconciliacion_endpoint(
    usuario: UsuarioActual,
    service: web::Data<PagoService>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    let reporte = service.reconciliar().await?;
    Ok(HttpResponse::Ok().json(reporte))
}

/// POST /api/admin/reconciliacion/corregir
pub async fn corregir_inconsistencias_endpoint(
    usuario: UsuarioActual,
    service: web::Data<PagoService>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    let resultado = service.corregir_inconsistencias(usuario.auditoria()).await?;
    Ok(HttpResponse::Ok().json(resultado))
}

/// POST /api/admin/backups
pub async fn crear_backup_endpoint(
    usuario: UsuarioActual,
    service: web::Data<BackupService>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    let backup = service.crear_backup().await?;
    Ok(HttpResponse::Created().json(backup))
}

/// GET /api/admin/backups
pub async fn listar_backups_endpoint(
    usuario: UsuarioActual,
    service: web::Data<BackupService>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    let backups = service.listar_backups().await?;
    Ok(HttpResponse::Ok().json(backups))
}

/// GET /api/admin/backups/{nombre}
pub async fn descargar_backup_endpoint(
    req: HttpRequest,
    usuario: UsuarioActual,
    service: web::Data<BackupService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    let ruta = service.ruta_backup(&path.into_inner())?;
    let archivo = NamedFile::open_async(&ruta)
        .await
        .map_err(|e| AppError::Interno(format!("No se pudo abrir {:?}: {}", ruta, e)))?;
    Ok(archivo.into_response(&req))
}

//! handlers/notificacion_handler.rs
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::auth::UsuarioActual;
use crate::models::matrizador_model::Rol;
use crate::models::notificacion_model::{EstadoNotificacion, NotificacionResponse};
use crate::services::{documento_service::DocumentoService, notification_service::NotificationService};

/// GET /api/documentos/{id}/notificaciones
pub async fn listar_notificaciones_endpoint(
    _usuario: UsuarioActual,
    documento_service: web::Data<DocumentoService>,
    service: web::Data<NotificationService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    documento_service.obtener(&id).await?;
    let notificaciones = service.listar_por_documento(&id).await?;
    Ok(HttpResponse::Ok().json(notificaciones))
}

/// POST /api/documentos/{id}/notificar
/// Reenvío manual; se responde cuando todos los canales terminaron.
pub async fn notificar_documento_endpoint(
    usuario: UsuarioActual,
    service: web::Data<NotificationService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin, Rol::Recepcion])?;
    let documento_id = path.into_inner();
    let notificaciones = service.reenviar(&documento_id, usuario.auditoria()).await?;

    let fallidas = notificaciones
        .iter()
        .filter(|n| n.estado == EstadoNotificacion::Fallida)
        .count();
    let message = if notificaciones.is_empty() {
        "El cliente no tiene email ni teléfono registrados".to_string()
    } else if fallidas > 0 {
        format!("{} de {} avisos fallaron", fallidas, notificaciones.len())
    } else {
        format!("{} avisos procesados", notificaciones.len())
    };

    Ok(HttpResponse::Ok().json(NotificacionResponse {
        success: !notificaciones.is_empty() && fallidas == 0,
        documento_id,
        message,
        notificaciones,
    }))
}

/// POST /api/admin/notificaciones/reintentar
pub async fn reintentar_notificaciones_endpoint(
    usuario: UsuarioActual,
    service: web::Data<NotificationService>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    let resumen = service.reintentar_fallidas().await?;
    Ok(HttpResponse::Ok().json(resumen))
}

//! handlers/documento_handler.rs
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::auth::UsuarioActual;
use crate::models::documento_model::{
    ActualizarDocumentoRequest, CancelarDocumentoRequest, CrearDocumentoRequest,
    EntregarDocumentoRequest, FiltroDocumentos, RevertirDocumentoRequest,
};
use crate::models::matrizador_model::Rol;
use crate::models::relacion_model::CrearRelacionRequest;
use crate::services::{
    documento_service::DocumentoService, evento_service::EventoService,
    notification_service::NotificationService, relacion_service::RelacionService,
};

const ROLES_INGRESO: &[Rol] = &[Rol::Admin, Rol::Recepcion, Rol::Caja];
const ROLES_ENTREGA: &[Rol] = &[Rol::Admin, Rol::Recepcion, Rol::Archivo];
const ROLES_RELACION: &[Rol] = &[Rol::Admin, Rol::Recepcion, Rol::Caja, Rol::Matrizador];

/// POST /api/documentos
pub async fn crear_documento_endpoint(
    usuario: UsuarioActual,
    service: web::Data<DocumentoService>,
    body: web::Json<CrearDocumentoRequest>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(ROLES_INGRESO)?;
    let doc = service.crear(body.into_inner(), usuario.auditoria()).await?;
    Ok(HttpResponse::Created().json(doc))
}

/// GET /api/documentos
pub async fn listar_documentos_endpoint(
    _usuario: UsuarioActual,
    service: web::Data<DocumentoService>,
    query: web::Query<FiltroDocumentos>,
) -> Result<HttpResponse, AppError> {
    let lista = service.listar(&query).await?;
    Ok(HttpResponse::Ok().json(lista))
}

/// GET /api/documentos/{id}
pub async fn obtener_documento_endpoint(
    _usuario: UsuarioActual,
    service: web::Data<DocumentoService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let doc = service.obtener(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(doc))
}

/// PUT /api/documentos/{id}
pub async fn actualizar_documento_endpoint(
    usuario: UsuarioActual,
    service: web::Data<DocumentoService>,
    path: web::Path<String>,
    body: web::Json<ActualizarDocumentoRequest>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(ROLES_INGRESO)?;
    let doc = service
        .actualizar(&path.into_inner(), body.into_inner(), usuario.auditoria())
        .await?;
    Ok(HttpResponse::Ok().json(doc))
}

/// GET /api/documentos/{id}/eventos
pub async fn listar_eventos_endpoint(
    _usuario: UsuarioActual,
    documento_service: web::Data<DocumentoService>,
    evento_service: web::Data<EventoService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    // 404 si el documento no existe, en vez de una lista vacía
    documento_service.obtener(&id).await?;
    let eventos = evento_service.listar_por_documento(&id).await?;
    Ok(HttpResponse::Ok().json(eventos))
}

/// POST /api/documentos/{id}/listo
/// El aviso al cliente sale en segundo plano; su resultado queda en notificaciones_enviadas.
pub async fn marcar_listo_endpoint(
    usuario: UsuarioActual,
    documento_service: web::Data<DocumentoService>,
    notification_service: web::Data<NotificationService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin, Rol::Matrizador])?;
    let id = path.into_inner();

    if usuario.rol() == Rol::Matrizador {
        let doc = documento_service.obtener(&id).await?;
        if doc.matrizador_id.as_deref() != Some(usuario.id()) {
            return Err(AppError::Prohibido(
                "Solo el matrizador asignado puede marcar el documento como listo".to_string(),
            ));
        }
    }

    let doc = documento_service.marcar_listo(&id, usuario.auditoria()).await?;

    let service_clone = notification_service.clone();
    let doc_id = doc.id.clone();
    let usuario_id = usuario.id().to_string();
    tokio::spawn(async move {
        if let Err(e) = service_clone
            .notificar_documento_listo(&doc_id, Some(&usuario_id))
            .await
        {
            log::error!(
                "(marcar_listo_endpoint) Fallo notificando documento {}: {:?}",
                doc_id,
                e
            );
        }
    });

    Ok(HttpResponse::Ok().json(doc))
}

/// POST /api/documentos/{id}/entregar
pub async fn entregar_documento_endpoint(
    usuario: UsuarioActual,
    service: web::Data<DocumentoService>,
    path: web::Path<String>,
    body: web::Json<EntregarDocumentoRequest>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(ROLES_ENTREGA)?;
    let resultado = service
        .entregar(&path.into_inner(), body.into_inner(), usuario.auditoria())
        .await?;
    Ok(HttpResponse::Ok().json(resultado))
}

/// POST /api/documentos/{id}/revertir
pub async fn revertir_documento_endpoint(
    usuario: UsuarioActual,
    service: web::Data<DocumentoService>,
    path: web::Path<String>,
    body: Option<web::Json<RevertirDocumentoRequest>>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    let req = body.map(web::Json::into_inner).unwrap_or_default();
    let doc = service
        .revertir_a_proceso(&path.into_inner(), req, usuario.auditoria())
        .await?;
    Ok(HttpResponse::Ok().json(doc))
}

/// POST /api/documentos/{id}/cancelar
pub async fn cancelar_documento_endpoint(
    usuario: UsuarioActual,
    service: web::Data<DocumentoService>,
    path: web::Path<String>,
    body: web::Json<CancelarDocumentoRequest>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    let doc = service
        .cancelar(&path.into_inner(), body.into_inner(), usuario.auditoria())
        .await?;
    Ok(HttpResponse::Ok().json(doc))
}

/// GET /api/documentos/{id}/relaciones
pub async fn listar_relaciones_endpoint(
    _usuario: UsuarioActual,
    service: web::Data<RelacionService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let relaciones = service.listar_por_documento(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(relaciones))
}

/// POST /api/documentos/{id}/relaciones
pub async fn crear_relacion_endpoint(
    usuario: UsuarioActual,
    service: web::Data<RelacionService>,
    path: web::Path<String>,
    body: web::Json<CrearRelacionRequest>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(ROLES_RELACION)?;
    let relacion = service
        .crear(&path.into_inner(), body.into_inner(), usuario.auditoria())
        .await?;
    Ok(HttpResponse::Created().json(relacion))
}

/// DELETE /api/relaciones/{id}
pub async fn eliminar_relacion_endpoint(
    usuario: UsuarioActual,
    service: web::Data<RelacionService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(ROLES_RELACION)?;
    service.eliminar(&path.into_inner(), usuario.auditoria()).await?;
    Ok(HttpResponse::NoContent().finish())
}

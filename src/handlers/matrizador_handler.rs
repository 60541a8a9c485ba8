//! handlers/matrizador_handler.rs
//! Gestión del personal (solo ADMIN).
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::auth::UsuarioActual;
use crate::models::matrizador_model::{
    ActualizarMatrizadorRequest, CrearMatrizadorRequest, FiltroMatrizadores, Rol,
};
use crate::services::matrizador_service::MatrizadorService;

/// POST /api/matrizadores
pub async fn crear_matrizador_endpoint(
    usuario: UsuarioActual,
    service: web::Data<MatrizadorService>,
    body: web::Json<CrearMatrizadorRequest>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    let matrizador = service.crear(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(matrizador))
}

/// GET /api/matrizadores
pub async fn listar_matrizadores_endpoint(
    _usuario: UsuarioActual,
    service: web::Data<MatrizadorService>,
    query: web::Query<FiltroMatrizadores>,
) -> Result<HttpResponse, AppError> {
    let lista = service.listar(&query).await?;
    Ok(HttpResponse::Ok().json(lista))
}

/// GET /api/matrizadores/{id}
pub async fn obtener_matrizador_endpoint(
    _usuario: UsuarioActual,
    service: web::Data<MatrizadorService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let matrizador = service.obtener(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(matrizador))
}

/// PUT /api/matrizadores/{id}
pub async fn actualizar_matrizador_endpoint(
    usuario: UsuarioActual,
    service: web::Data<MatrizadorService>,
    path: web::Path<String>,
    body: web::Json<ActualizarMatrizadorRequest>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    let matrizador = service.actualizar(&path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(matrizador))
}

/// POST /api/matrizadores/{id}/desactivar
pub async fn desactivar_matrizador_endpoint(
    usuario: UsuarioActual,
    service: web::Data<MatrizadorService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    usuario.requerir(&[Rol::Admin])?;
    let id = path.into_inner();
    if id == usuario.id() {
        return Err(AppError::conflicto("Un administrador no puede desactivarse a sí mismo"));
    }
    let matrizador = service.desactivar(&id).await?;
    Ok(HttpResponse::Ok().json(matrizador))
}

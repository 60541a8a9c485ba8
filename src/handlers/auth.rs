//! handlers/auth.rs
//! Identificación del usuario por la cabecera `X-Usuario-Id` y control por rol.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::errors::AppError;
use crate::models::matrizador_model::{Matrizador, Rol};
use crate::services::matrizador_service::MatrizadorService;

pub const CABECERA_USUARIO: &str = "X-Usuario-Id";

/// Miembro activo del personal que hace la petición.
#[derive(Debug, Clone)]
pub struct UsuarioActual(pub Matrizador);

impl UsuarioActual {
    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn rol(&self) -> Rol {
        self.0.rol
    }

    /// `Some(id)` para los eventos de auditoría.
    pub fn auditoria(&self) -> Option<&str> {
        Some(self.id())
    }

    pub fn requerir(&self, roles: &[Rol]) -> Result<(), AppError> {
        if roles.contains(&self.0.rol) {
            return Ok(());
        }
        Err(AppError::Prohibido(format!(
            "El rol {} no tiene permiso para esta operación",
            self.0.rol
        )))
    }
}

impl FromRequest for UsuarioActual {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let usuario_id = req
            .headers()
            .get(CABECERA_USUARIO)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let service = req.app_data::<web::Data<MatrizadorService>>().cloned();

        Box::pin(async move {
            let usuario_id = usuario_id.ok_or(AppError::NoAutorizado)?;
            let service = service
                .ok_or_else(|| AppError::Interno("MatrizadorService no registrado".to_string()))?;

            let matrizador = match service.obtener(&usuario_id).await {
                Ok(m) => m,
                Err(e) => {
                    return Err(match AppError::from(e) {
                        AppError::NoEncontrado(_) => AppError::NoAutorizado,
                        otro => otro,
                    })
                }
            };
            if !matrizador.activo {
                return Err(AppError::Prohibido(format!(
                    "El usuario {} está desactivado",
                    matrizador.nombre
                )));
            }
            Ok(UsuarioActual(matrizador))
        })
    }
}

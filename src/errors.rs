//! errors.rs
//! Errores de dominio y su traducción a respuestas HTTP.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::validation::pagos::ValidacionPagoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validacion(String),

    #[error("{0}")]
    NoEncontrado(String),

    #[error("{0}")]
    Conflicto(String),

    #[error("Se requiere identificar al usuario (cabecera X-Usuario-Id)")]
    NoAutorizado,

    #[error("{0}")]
    Prohibido(String),

    #[error("Error interno: {0}")]
    Interno(String),
}

impl AppError {
    pub fn validacion(msg: impl Into<String>) -> Self {
        AppError::Validacion(msg.into())
    }

    pub fn no_encontrado(msg: impl Into<String>) -> Self {
        AppError::NoEncontrado(msg.into())
    }

    pub fn conflicto(msg: impl Into<String>) -> Self {
        AppError::Conflicto(msg.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validacion(_) => StatusCode::BAD_REQUEST,
            AppError::NoEncontrado(_) => StatusCode::NOT_FOUND,
            AppError::Conflicto(_) => StatusCode::CONFLICT,
            AppError::NoAutorizado => StatusCode::UNAUTHORIZED,
            AppError::Prohibido(_) => StatusCode::FORBIDDEN,
            AppError::Interno(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Interno(detalle) = self {
            log::error!("Error interno atendiendo request: {}", detalle);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.to_string()
        }))
    }
}

impl From<ValidacionPagoError> for AppError {
    fn from(e: ValidacionPagoError) -> Self {
        AppError::Validacion(e.to_string())
    }
}

/// Los servicios devuelven `anyhow::Error`; aquí recuperamos el error de dominio
/// de origen (si lo hay) para responder con el status correcto.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        let e = match e.downcast::<AppError>() {
            Ok(app) => return app,
            Err(e) => e,
        };
        let e = match e.downcast::<ValidacionPagoError>() {
            Ok(v) => return v.into(),
            Err(e) => e,
        };
        if let Some(sqlx::Error::RowNotFound) = e.downcast_ref::<sqlx::Error>() {
            return AppError::NoEncontrado(format!("{}", e));
        }
        AppError::Interno(format!("{:?}", e))
    }
}

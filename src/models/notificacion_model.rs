//! models/notificacion_model.rs
//! Registro de cada aviso enviado al cliente, por canal.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row};

use crate::models::parse_fecha;

enum_texto! {
    CanalNotificacion {
        Email => "EMAIL",
        Whatsapp => "WHATSAPP",
    }
}

enum_texto! {
    EstadoNotificacion {
        Pendiente => "PENDIENTE",
        Enviada => "ENVIADA",
        Fallida => "FALLIDA",
        Simulada => "SIMULADA",
        /// El canal no está configurado
        Omitida => "OMITIDA",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificacionEnviada {
    pub id: String,
    pub documento_id: String,
    pub canal: CanalNotificacion,
    pub destinatario: String,
    pub asunto: Option<String>,
    pub mensaje: String,
    pub estado: EstadoNotificacion,
    pub intentos: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificacionEnviada {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let canal: String = row.try_get("canal")?;
        let estado: String = row.try_get("estado")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(NotificacionEnviada {
            id: row.try_get("id")?,
            documento_id: row.try_get("documento_id")?,
            canal: canal.parse()?,
            destinatario: row.try_get("destinatario")?,
            asunto: row.try_get("asunto")?,
            mensaje: row.try_get("mensaje")?,
            estado: estado.parse()?,
            intentos: row.try_get("intentos")?,
            error_message: row.try_get("error_message")?,
            created_at: parse_fecha(&created_at)?,
            updated_at: parse_fecha(&updated_at)?,
        })
    }
}

/// Mensaje listo para enviar por un canal (el email arma su HTML a partir del texto).
#[derive(Debug, Clone, PartialEq)]
pub struct MensajeCliente {
    pub asunto: String,
    pub texto: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumenReintento {
    pub revisadas: usize,
    pub enviadas: usize,
    pub fallidas: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificacionResponse {
    pub success: bool,
    pub documento_id: String,
    pub message: String,
    pub notificaciones: Vec<NotificacionEnviada>,
}

//! models/evento_model.rs
//! Bitácora de eventos (auditoría) de cada documento.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row};

use crate::models::parse_fecha;

enum_texto! {
    TipoEvento {
        Creacion => "CREACION",
        Actualizacion => "ACTUALIZACION",
        CambioEstado => "CAMBIO_ESTADO",
        Pago => "PAGO",
        Retencion => "RETENCION",
        Notificacion => "NOTIFICACION",
        Entrega => "ENTREGA",
        Relacion => "RELACION",
        Correccion => "CORRECCION",
        Cancelacion => "CANCELACION",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventoDocumento {
    pub id: String,
    pub documento_id: String,
    pub tipo: TipoEvento,
    pub detalles: String,
    pub usuario_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl EventoDocumento {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let tipo: String = row.try_get("tipo")?;
        let metadata: Option<String> = row.try_get("metadata")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(EventoDocumento {
            id: row.try_get("id")?,
            documento_id: row.try_get("documento_id")?,
            tipo: tipo.parse()?,
            detalles: row.try_get("detalles")?,
            usuario_id: row.try_get("usuario_id")?,
            metadata: metadata.as_deref().map(serde_json::from_str).transpose()?,
            created_at: parse_fecha(&created_at)?,
        })
    }
}

/// Evento por registrar (el id y la fecha los pone el servicio).
#[derive(Debug, Clone)]
pub struct NuevoEvento {
    pub documento_id: String,
    pub tipo: TipoEvento,
    pub detalles: String,
    pub usuario_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl NuevoEvento {
    pub fn new(documento_id: &str, tipo: TipoEvento, detalles: impl Into<String>) -> Self {
        NuevoEvento {
            documento_id: documento_id.to_string(),
            tipo,
            detalles: detalles.into(),
            usuario_id: None,
            metadata: None,
        }
    }

    pub fn por_usuario(mut self, usuario_id: Option<&str>) -> Self {
        self.usuario_id = usuario_id.map(str::to_string);
        self
    }

    pub fn con_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

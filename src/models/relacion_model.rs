//! models/relacion_model.rs
//! Vínculos entre documentos (trámites agrupados, habilitantes).

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};

use crate::models::parse_fecha;

enum_texto! {
    TipoRelacion {
        /// Se entregan juntos
        Grupo => "GRUPO",
        Habilitante => "HABILITANTE",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentoRelacion {
    pub id: String,
    pub documento_principal_id: String,
    pub documento_relacionado_id: String,
    pub tipo: TipoRelacion,
    pub created_at: DateTime<Utc>,
}

impl DocumentoRelacion {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let tipo: String = row.try_get("tipo")?;
        let created_at: String = row.try_get("created_at")?;
        Ok(DocumentoRelacion {
            id: row.try_get("id")?,
            documento_principal_id: row.try_get("documento_principal_id")?,
            documento_relacionado_id: row.try_get("documento_relacionado_id")?,
            tipo: tipo.parse()?,
            created_at: parse_fecha(&created_at)?,
        })
    }

    /// El otro extremo del vínculo visto desde `documento_id`.
    pub fn otro_extremo(&self, documento_id: &str) -> &str {
        if self.documento_principal_id == documento_id {
            &self.documento_relacionado_id
        } else {
            &self.documento_principal_id
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrearRelacionRequest {
    pub documento_relacionado_id: String,
    pub tipo: TipoRelacion,
}

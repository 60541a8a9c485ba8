//! services/evento_service.rs
//! Bitácora de auditoría: cada cambio sobre un documento deja un EventoDocumento.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Executor, Pool, Sqlite};
use uuid::Uuid;

use crate::models::evento_model::{EventoDocumento, NuevoEvento};

#[derive(Clone, Debug)]
pub struct EventoService {
    db_pool: Pool<Sqlite>,
}

impl EventoService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        EventoService { db_pool }
    }

    /// Inserta el evento con el executor dado (pool o transacción abierta),
    /// para que quede en la misma transacción que el cambio que documenta.
    pub async fn registrar_en<'e, E>(executor: E, evento: NuevoEvento) -> Result<String>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let metadata = evento
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO eventos_documento (
                id, documento_id, tipo, detalles, usuario_id, metadata, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(&evento.documento_id)
        .bind(evento.tipo.as_str())
        .bind(&evento.detalles)
        .bind(&evento.usuario_id)
        .bind(metadata)
        .bind(now)
        .execute(executor)
        .await
        .with_context(|| {
            format!(
                "Fallo al insertar evento {} del documento {}",
                evento.tipo, evento.documento_id
            )
        })?;

        Ok(id)
    }

    /// Eventos del documento, del más antiguo al más reciente.
    pub async fn listar_por_documento(&self, documento_id: &str) -> Result<Vec<EventoDocumento>> {
        let rows = sqlx::query(
            r#"
            SELECT id, documento_id, tipo, detalles, usuario_id, metadata, created_at
            FROM eventos_documento
            WHERE documento_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(documento_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar eventos del documento")?;

        rows.iter().map(EventoDocumento::from_row).collect()
    }
}

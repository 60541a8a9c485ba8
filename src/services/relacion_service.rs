//! services/relacion_service.rs
//! Vínculos entre documentos. Un vínculo es simétrico: A-B y B-A son el mismo.

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use sqlx::{Pool, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::evento_model::{NuevoEvento, TipoEvento};
use crate::models::relacion_model::{CrearRelacionRequest, DocumentoRelacion, TipoRelacion};
use crate::services::evento_service::EventoService;

const COLUMNAS: &str =
    "id, documento_principal_id, documento_relacionado_id, tipo, created_at";

#[derive(Clone, Debug)]
pub struct RelacionService {
    db_pool: Pool<Sqlite>,
}

impl RelacionService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        RelacionService { db_pool }
    }

    pub async fn crear(
        &self,
        documento_id: &str,
        req: CrearRelacionRequest,
        usuario_id: Option<&str>,
    ) -> Result<DocumentoRelacion> {
        let relacionado_id = req.documento_relacionado_id.trim();
        if relacionado_id == documento_id {
            return Err(AppError::validacion("Un documento no puede relacionarse consigo mismo").into());
        }

        let mut tx = self.db_pool.begin().await?;

        for id in [documento_id, relacionado_id] {
            let existe: Option<String> = sqlx::query_scalar("SELECT id FROM documentos WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .context("Fallo al verificar documento")?;
            if existe.is_none() {
                return Err(AppError::no_encontrado(format!("No existe el documento {}", id)).into());
            }
        }

        let duplicado: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM documento_relaciones
            WHERE (documento_principal_id = ?1 AND documento_relacionado_id = ?2)
               OR (documento_principal_id = ?2 AND documento_relacionado_id = ?1)
            "#,
        )
        .bind(documento_id)
        .bind(relacionado_id)
        .fetch_one(&mut *tx)
        .await
        .context("Fallo al verificar relación existente")?;
        if duplicado > 0 {
            return Err(AppError::conflicto("Los documentos ya están relacionados").into());
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO documento_relaciones (
                id, documento_principal_id, documento_relacionado_id, tipo, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(documento_id)
        .bind(relacionado_id)
        .bind(req.tipo.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .context("Fallo al insertar relación")?;

        for (doc, otro) in [(documento_id, relacionado_id), (relacionado_id, documento_id)] {
            EventoService::registrar_en(
                &mut *tx,
                NuevoEvento::new(
                    doc,
                    TipoEvento::Relacion,
                    format!("Relacionado ({}) con el documento {}", req.tipo, otro),
                )
                .por_usuario(usuario_id)
                .con_metadata(json!({ "relacion_id": id, "accion": "crear" })),
            )
            .await?;
        }

        tx.commit().await?;
        self.obtener(&id).await
    }

    pub async fn obtener(&self, id: &str) -> Result<DocumentoRelacion> {
        let sql = format!("SELECT {} FROM documento_relaciones WHERE id = ?1", COLUMNAS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Fallo al consultar relación")?
            .ok_or_else(|| AppError::no_encontrado(format!("No existe la relación {}", id)))?;
        DocumentoRelacion::from_row(&row)
    }

    pub async fn listar_por_documento(&self, documento_id: &str) -> Result<Vec<DocumentoRelacion>> {
        let sql = format!(
            "SELECT {} FROM documento_relaciones \
             WHERE documento_principal_id = ?1 OR documento_relacionado_id = ?1 \
             ORDER BY created_at ASC",
            COLUMNAS
        );
        let rows = sqlx::query(&sql)
            .bind(documento_id)
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar relaciones")?;
        rows.iter().map(DocumentoRelacion::from_row).collect()
    }

    pub async fn eliminar(&self, relacion_id: &str, usuario_id: Option<&str>) -> Result<()> {
        let relacion = self.obtener(relacion_id).await?;
        let mut tx = self.db_pool.begin().await?;

        sqlx::query("DELETE FROM documento_relaciones WHERE id = ?1")
            .bind(relacion_id)
            .execute(&mut *tx)
            .await
            .context("Fallo al eliminar relación")?;

        for doc in [&relacion.documento_principal_id, &relacion.documento_relacionado_id] {
            let otro = relacion.otro_extremo(doc);
            EventoService::registrar_en(
                &mut *tx,
                NuevoEvento::new(
                    doc,
                    TipoEvento::Relacion,
                    format!("Se eliminó la relación con el documento {}", otro),
                )
                .por_usuario(usuario_id)
                .con_metadata(json!({ "relacion_id": relacion_id, "accion": "eliminar" })),
            )
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Ids de los documentos vinculados con `tipo`, dentro de una transacción abierta.
    pub async fn relacionados_en(
        conn: &mut SqliteConnection,
        documento_id: &str,
        tipo: TipoRelacion,
    ) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT CASE WHEN documento_principal_id = ?1
                        THEN documento_relacionado_id
                        ELSE documento_principal_id END
            FROM documento_relaciones
            WHERE (documento_principal_id = ?1 OR documento_relacionado_id = ?1)
              AND tipo = ?2
            ORDER BY created_at ASC
            "#,
        )
        .bind(documento_id)
        .bind(tipo.as_str())
        .fetch_all(&mut *conn)
        .await
        .context("Fallo al consultar documentos relacionados")?;
        Ok(ids)
    }
}

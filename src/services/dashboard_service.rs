//! services/dashboard_service.rs
//! Resúmenes por rol: admin, caja, matrizador, recepción y archivo.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

use crate::helpers::formato::{
    badge_estado_documento, badge_estado_pago, formatear_fecha, formatear_moneda,
    inicio_del_dia_local, tiempo_transcurrido,
};
use crate::models::dashboard_model::{
    DashboardAdmin, DashboardArchivo, DashboardCaja, DashboardMatrizador, DashboardRecepcion,
    DocumentosPorMatrizador, FilaDocumento, ResumenMontos,
};
use crate::models::documento_model::{Documento, COLUMNAS_DOCUMENTO};
use crate::models::{normalizar_paginacion, offset_paginacion};

/// Filas por tabla en los dashboards sin paginación.
const LIMITE_FILAS: i64 = 50;

#[derive(Clone, Debug)]
pub struct DashboardService {
    db_pool: Pool<Sqlite>,
}

impl DashboardService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        DashboardService { db_pool }
    }

    pub async fn admin(&self) -> Result<DashboardAdmin> {
        let por_estado = self
            .contar_agrupado("SELECT estado, COUNT(*) AS total FROM documentos GROUP BY estado")
            .await?;
        let por_estado_pago = self
            .contar_agrupado(
                "SELECT estado_pago, COUNT(*) AS total FROM documentos \
                 WHERE estado != 'CANCELADO' GROUP BY estado_pago",
            )
            .await?;
        let total_documentos = por_estado.values().sum();

        let notificaciones_fallidas: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notificaciones_enviadas WHERE estado = 'FALLIDA'",
        )
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al contar notificaciones fallidas")?;

        let rows = sqlx::query(
            r#"
            SELECT d.matrizador_id, m.nombre,
                   COUNT(*) AS total,
                   SUM(CASE WHEN d.estado = 'EN_PROCESO' THEN 1 ELSE 0 END) AS en_proceso,
                   SUM(CASE WHEN d.estado = 'LISTO' THEN 1 ELSE 0 END) AS listos
            FROM documentos d
            LEFT JOIN matrizadores m ON m.id = d.matrizador_id
            WHERE d.estado != 'CANCELADO'
            GROUP BY d.matrizador_id, m.nombre
            ORDER BY total DESC
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al agrupar documentos por matrizador")?;

        let mut por_matrizador = Vec::with_capacity(rows.len());
        for row in &rows {
            por_matrizador.push(DocumentosPorMatrizador {
                matrizador_id: row.try_get("matrizador_id")?,
                nombre: row.try_get("nombre")?,
                total: row.try_get("total")?,
                en_proceso: row.try_get("en_proceso")?,
                listos: row.try_get("listos")?,
            });
        }

        Ok(DashboardAdmin {
            total_documentos,
            por_estado,
            por_estado_pago,
            montos: self.montos().await?,
            notificaciones_fallidas,
            por_matrizador,
        })
    }

    pub async fn caja(&self) -> Result<DashboardCaja> {
        let ahora = Utc::now();
        let documentos_con_saldo: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documentos WHERE estado != 'CANCELADO' AND valor_pendiente > 0",
        )
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al contar documentos con saldo")?;

        let pagos_hoy: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM eventos_documento \
             WHERE tipo IN ('PAGO', 'RETENCION') AND created_at >= ?1",
        )
        .bind(inicio_del_dia_local(&ahora).to_rfc3339())
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al contar pagos del día")?;

        let pendientes = self
            .filas(
                "estado != 'CANCELADO' AND valor_pendiente > 0 ORDER BY created_at ASC",
                &[],
                LIMITE_FILAS,
                0,
                &ahora,
                false,
            )
            .await?;

        Ok(DashboardCaja {
            montos: self.montos().await?,
            documentos_con_saldo,
            pagos_hoy,
            pendientes,
        })
    }

    /// Documentos asignados a un matrizador; los recientes excluyen los ya cerrados.
    pub async fn matrizador(&self, matrizador_id: &str) -> Result<DashboardMatrizador> {
        let rows = sqlx::query(
            "SELECT estado, COUNT(*) AS total FROM documentos \
             WHERE matrizador_id = ?1 GROUP BY estado",
        )
        .bind(matrizador_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al contar documentos del matrizador")?;
        let por_estado = a_mapa(&rows)?;

        let recientes = self
            .filas(
                "matrizador_id = ?1 AND estado IN ('EN_PROCESO', 'LISTO') \
                 ORDER BY updated_at DESC",
                &[matrizador_id],
                LIMITE_FILAS,
                0,
                &Utc::now(),
                false,
            )
            .await?;

        Ok(DashboardMatrizador {
            matrizador_id: matrizador_id.to_string(),
            por_estado,
            recientes,
        })
    }

    /// Cola de entrega: LISTO del más antiguo al más reciente.
    pub async fn recepcion(&self) -> Result<DashboardRecepcion> {
        let ahora = Utc::now();
        let listos_para_entrega = self
            .filas(
                "estado = 'LISTO' ORDER BY fecha_listo ASC",
                &[],
                LIMITE_FILAS,
                0,
                &ahora,
                true,
            )
            .await?;

        let listos_con_saldo: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documentos WHERE estado = 'LISTO' AND valor_pendiente > 0",
        )
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al contar documentos listos con saldo")?;

        let entregados_hoy: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documentos WHERE estado = 'ENTREGADO' AND fecha_entrega >= ?1",
        )
        .bind(inicio_del_dia_local(&ahora).to_rfc3339())
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al contar entregas del día")?;

        Ok(DashboardRecepcion {
            listos_para_entrega,
            listos_con_saldo,
            entregados_hoy,
        })
    }

    pub async fn archivo(&self, page: Option<u64>, page_size: Option<u64>) -> Result<DashboardArchivo> {
        let (page, page_size) = normalizar_paginacion(page, page_size);
        let offset = offset_paginacion(page, page_size);

        let total_entregados: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documentos WHERE estado = 'ENTREGADO'")
                .fetch_one(&self.db_pool)
                .await
                .context("Fallo al contar documentos entregados")?;
        let cancelados: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documentos WHERE estado = 'CANCELADO'")
                .fetch_one(&self.db_pool)
                .await
                .context("Fallo al contar documentos cancelados")?;

        let entregados = self
            .filas(
                "estado = 'ENTREGADO' ORDER BY fecha_entrega DESC",
                &[],
                page_size as i64,
                offset,
                &Utc::now(),
                false,
            )
            .await?;

        Ok(DashboardArchivo {
            total_entregados: total_entregados as u64,
            cancelados,
            page,
            page_size,
            entregados,
        })
    }

    async fn montos(&self) -> Result<ResumenMontos> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(valor_factura), 0.0) AS facturado,
                   COALESCE(SUM(valor_pagado), 0.0) AS pagado,
                   COALESCE(SUM(valor_pendiente), 0.0) AS pendiente,
                   COALESCE(SUM(valor_retenido), 0.0) AS retenido
            FROM documentos
            WHERE estado != 'CANCELADO'
            "#,
        )
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al sumar montos")?;

        Ok(ResumenMontos::new(
            row.try_get("facturado")?,
            row.try_get("pagado")?,
            row.try_get("pendiente")?,
            row.try_get("retenido")?,
        ))
    }

    async fn contar_agrupado(&self, sql: &str) -> Result<BTreeMap<String, i64>> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al agrupar documentos")?;
        a_mapa(&rows)
    }

    /// `condicion` es texto fijo de este módulo; los valores van por `binds`.
    async fn filas(
        &self,
        condicion: &str,
        binds: &[&str],
        limite: i64,
        offset: i64,
        ahora: &DateTime<Utc>,
        antiguedad_desde_listo: bool,
    ) -> Result<Vec<FilaDocumento>> {
        let sql = format!(
            "SELECT {} FROM documentos WHERE {} LIMIT {} OFFSET {}",
            COLUMNAS_DOCUMENTO, condicion, limite, offset
        );
        let mut query = sqlx::query(&sql);
        for valor in binds {
            query = query.bind(*valor);
        }
        let rows = query
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar documentos del dashboard")?;

        rows.iter()
            .map(|row| {
                let doc = Documento::from_row(row)?;
                let desde = if antiguedad_desde_listo {
                    doc.fecha_listo.unwrap_or(doc.created_at)
                } else {
                    doc.created_at
                };
                Ok(fila_documento(doc, &desde, ahora))
            })
            .collect()
    }
}

pub fn fila_documento(doc: Documento, desde: &DateTime<Utc>, ahora: &DateTime<Utc>) -> FilaDocumento {
    FilaDocumento {
        badge_estado: badge_estado_documento(doc.estado),
        badge_pago: badge_estado_pago(doc.estado_pago),
        valor_factura_fmt: formatear_moneda(doc.valor_factura),
        valor_pendiente_fmt: formatear_moneda(doc.valor_pendiente),
        fecha_ingreso_fmt: formatear_fecha(&doc.created_at),
        antiguedad: tiempo_transcurrido(desde, ahora),
        documento: doc,
    }
}

fn a_mapa(rows: &[sqlx::sqlite::SqliteRow]) -> Result<BTreeMap<String, i64>> {
    let mut mapa = BTreeMap::new();
    for row in rows {
        let clave: String = row.try_get(0)?;
        let total: i64 = row.try_get("total")?;
        mapa.insert(clave, total);
    }
    Ok(mapa)
}

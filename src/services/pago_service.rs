//! services/pago_service.rs
//! Caja: abonos, retenciones, reconciliación y corrección de montos guardados.

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use sqlx::{Pool, Row, Sqlite, SqliteConnection};

use crate::errors::AppError;
use crate::models::documento_model::{Documento, EstadoDocumento, COLUMNAS_DOCUMENTO};
use crate::models::evento_model::{NuevoEvento, TipoEvento};
use crate::models::pago_model::{
    DocumentoInconsistente, RegistrarPagoRequest, RegistrarRetencionRequest,
    ReporteReconciliacion, ResultadoCorreccion, ResultadoPago,
};
use crate::models::{normalizar_paginacion, offset_paginacion, ListaPaginada};
use crate::services::documento_service::cargar_documento;
use crate::services::evento_service::EventoService;
use crate::validation::pagos::{
    aplicar_pago, aplicar_retencion, derivar_estado_pago, verificar_consistencia, EstadoPago,
    ValoresPago,
};

#[derive(Clone, Debug)]
pub struct PagoService {
    db_pool: Pool<Sqlite>,
}

impl PagoService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        PagoService { db_pool }
    }

    /// Registra un abono. Montos, estado de pago y evento en una sola transacción.
    pub async fn registrar_pago(
        &self,
        documento_id: &str,
        req: RegistrarPagoRequest,
        usuario_id: Option<&str>,
    ) -> Result<ResultadoPago> {
        let mut tx = self.db_pool.begin().await?;
        let doc = cargar_documento(&mut tx, documento_id).await?;
        exigir_no_cancelado(&doc)?;

        let nuevos = aplicar_pago(&doc.valores(), req.monto)?;
        let estado_pago = derivar_estado_pago(&nuevos)?;
        let metodo = req
            .metodo_pago
            .as_deref()
            .map(|m| m.trim().to_uppercase())
            .filter(|m| !m.is_empty());

        guardar_valores(&mut tx, documento_id, &nuevos, estado_pago, metodo.as_deref()).await?;

        EventoService::registrar_en(
            &mut *tx,
            NuevoEvento::new(
                documento_id,
                TipoEvento::Pago,
                format!(
                    "Abono de {:.2}{} ({} -> {})",
                    req.monto,
                    metodo
                        .as_deref()
                        .map(|m| format!(" en {}", m))
                        .unwrap_or_default(),
                    doc.estado_pago,
                    estado_pago
                ),
            )
            .por_usuario(usuario_id)
            .con_metadata(json!({
                "monto": req.monto,
                "metodo_pago": metodo,
                "numero_recibo": req.numero_recibo,
                "observaciones": req.observaciones,
                "valores_anteriores": doc.valores(),
                "valores_nuevos": nuevos,
            })),
        )
        .await?;

        tx.commit().await?;
        log::info!(
            "(registrar_pago) Documento {} abono {:.2}: {} -> {}",
            documento_id,
            req.monto,
            doc.estado_pago,
            estado_pago
        );

        let mut conn = self.db_pool.acquire().await?;
        Ok(ResultadoPago {
            estado_pago_anterior: doc.estado_pago,
            documento: cargar_documento(&mut conn, documento_id).await?,
        })
    }

    /// Registra una retención en la fuente declarada por el cliente.
    pub async fn registrar_retencion(
        &self,
        documento_id: &str,
        req: RegistrarRetencionRequest,
        usuario_id: Option<&str>,
    ) -> Result<ResultadoPago> {
        let comprobante = req.numero_comprobante.trim().to_string();
        if comprobante.is_empty() {
            return Err(AppError::validacion("El número de comprobante es obligatorio").into());
        }

        let mut tx = self.db_pool.begin().await?;
        let doc = cargar_documento(&mut tx, documento_id).await?;
        exigir_no_cancelado(&doc)?;

        let nuevos = aplicar_retencion(&doc.valores(), req.monto)?;
        let estado_pago = derivar_estado_pago(&nuevos)?;
        guardar_valores(&mut tx, documento_id, &nuevos, estado_pago, None).await?;

        EventoService::registrar_en(
            &mut *tx,
            NuevoEvento::new(
                documento_id,
                TipoEvento::Retencion,
                format!(
                    "Retención de {:.2}, comprobante {} ({} -> {})",
                    req.monto, comprobante, doc.estado_pago, estado_pago
                ),
            )
            .por_usuario(usuario_id)
            .con_metadata(json!({
                "monto": req.monto,
                "numero_comprobante": comprobante,
                "valores_anteriores": doc.valores(),
                "valores_nuevos": nuevos,
            })),
        )
        .await?;

        tx.commit().await?;
        log::info!(
            "(registrar_retencion) Documento {} retención {:.2} comprobante {}",
            documento_id,
            req.monto,
            comprobante
        );

        let mut conn = self.db_pool.acquire().await?;
        Ok(ResultadoPago {
            estado_pago_anterior: doc.estado_pago,
            documento: cargar_documento(&mut conn, documento_id).await?,
        })
    }

    /// Documentos no cancelados con saldo, del más antiguo al más reciente.
    pub async fn pendientes_de_pago(
        &self,
        page: Option<u64>,
        page_size: Option<u64>,
    ) -> Result<ListaPaginada<Documento>> {
        let (page, page_size) = normalizar_paginacion(page, page_size);
        let offset = offset_paginacion(page, page_size);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documentos WHERE estado != 'CANCELADO' AND valor_pendiente > 0",
        )
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al contar documentos pendientes de pago")?;

        let sql = format!(
            "SELECT {} FROM documentos \
             WHERE estado != 'CANCELADO' AND valor_pendiente > 0 \
             ORDER BY created_at ASC LIMIT ?1 OFFSET ?2",
            COLUMNAS_DOCUMENTO
        );
        let rows = sqlx::query(&sql)
            .bind(page_size as i64)
            .bind(offset)
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar documentos pendientes de pago")?;

        Ok(ListaPaginada {
            total: total as u64,
            page,
            page_size,
            items: rows
                .iter()
                .map(Documento::from_row)
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Audita todos los documentos: suma de montos y estado de pago guardado.
    pub async fn reconciliar(&self) -> Result<ReporteReconciliacion> {
        let rows = sqlx::query(
            r#"
            SELECT id, codigo_barras, valor_factura, valor_pagado, valor_pendiente,
                   valor_retenido, estado_pago
            FROM documentos
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al leer documentos para reconciliación")?;

        let mut items = Vec::new();
        for row in &rows {
            let valores = ValoresPago {
                factura: row.try_get("valor_factura")?,
                pagado: row.try_get("valor_pagado")?,
                pendiente: row.try_get("valor_pendiente")?,
                retenido: row.try_get("valor_retenido")?,
            };
            let estado_guardado: String = row.try_get("estado_pago")?;
            let inconsistencias = verificar_consistencia(&valores, &estado_guardado);
            if inconsistencias.is_empty() {
                continue;
            }
            items.push(DocumentoInconsistente {
                documento_id: row.try_get("id")?,
                codigo_barras: row.try_get("codigo_barras")?,
                estado_pago_guardado: estado_guardado,
                valores,
                corregible: inconsistencias.iter().all(|i| i.es_corregible()),
                inconsistencias,
            });
        }

        log::info!(
            "(reconciliar) Revisados {} documentos, {} inconsistentes",
            rows.len(),
            items.len()
        );
        Ok(ReporteReconciliacion {
            documentos_revisados: rows.len(),
            documentos_inconsistentes: items.len(),
            items,
        })
    }

    /// Recalcula pendiente y estado de pago de los documentos corregibles.
    /// Los demás quedan listados para revisión manual.
    pub async fn corregir_inconsistencias(
        &self,
        usuario_id: Option<&str>,
    ) -> Result<ResultadoCorreccion> {
        let reporte = self.reconciliar().await?;
        let mut corregidos = Vec::new();
        let mut requieren_revision = Vec::new();

        let mut tx = self.db_pool.begin().await?;
        for item in reporte.items {
            if !item.corregible {
                requieren_revision.push(item.documento_id);
                continue;
            }

            let v = item.valores;
            let nuevos = ValoresPago::recalculados(v.factura, v.pagado, v.retenido);
            let estado_pago = match derivar_estado_pago(&nuevos) {
                Ok(e) => e,
                Err(e) => {
                    log::warn!(
                        "(corregir_inconsistencias) {} no se pudo recalcular: {}",
                        item.documento_id,
                        e
                    );
                    requieren_revision.push(item.documento_id);
                    continue;
                }
            };

            guardar_valores(&mut tx, &item.documento_id, &nuevos, estado_pago, None).await?;
            EventoService::registrar_en(
                &mut *tx,
                NuevoEvento::new(
                    &item.documento_id,
                    TipoEvento::Correccion,
                    format!(
                        "Corrección automática: pendiente {:.2} -> {:.2}, estado {} -> {}",
                        v.pendiente, nuevos.pendiente, item.estado_pago_guardado, estado_pago
                    ),
                )
                .por_usuario(usuario_id)
                .con_metadata(json!({
                    "inconsistencias": item.inconsistencias,
                    "valores_anteriores": v,
                    "valores_nuevos": nuevos,
                })),
            )
            .await?;
            corregidos.push(item.documento_id);
        }
        tx.commit().await?;

        log::info!(
            "(corregir_inconsistencias) Corregidos={}, para revisión manual={}",
            corregidos.len(),
            requieren_revision.len()
        );
        Ok(ResultadoCorreccion {
            corregidos,
            requieren_revision,
        })
    }
}

fn exigir_no_cancelado(doc: &Documento) -> Result<()> {
    if doc.estado == EstadoDocumento::Cancelado {
        return Err(AppError::conflicto("El documento está cancelado y no admite pagos").into());
    }
    Ok(())
}

async fn guardar_valores(
    conn: &mut SqliteConnection,
    documento_id: &str,
    valores: &ValoresPago,
    estado_pago: EstadoPago,
    metodo_pago: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE documentos
        SET valor_factura = ?2, valor_pagado = ?3, valor_pendiente = ?4, valor_retenido = ?5,
            estado_pago = ?6, metodo_pago = COALESCE(?7, metodo_pago), updated_at = ?8
        WHERE id = ?1
        "#,
    )
    .bind(documento_id)
    .bind(valores.factura)
    .bind(valores.pagado)
    .bind(valores.pendiente)
    .bind(valores.retenido)
    .bind(estado_pago.as_str())
    .bind(metodo_pago)
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *conn)
    .await
    .context("Fallo al guardar montos del documento")?;
    Ok(())
}

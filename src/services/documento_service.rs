//! services/documento_service.rs
//! Ingreso, consulta, listado y ciclo de vida de los documentos.
//!
//! EN_PROCESO -> LISTO -> ENTREGADO, con LISTO -> EN_PROCESO (reversión) y
//! cualquier estado no terminal -> CANCELADO.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::errors::AppError;
use crate::helpers::codigo::{codigo_coincide, generar_codigo_barras, generar_codigo_verificacion};
use crate::helpers::formato::medianoche_local;
use crate::models::documento_model::{
    ActualizarDocumentoRequest, CancelarDocumentoRequest, CrearDocumentoRequest, Documento,
    EntregaOmitida, EntregarDocumentoRequest, EstadoDocumento, FiltroDocumentos,
    ResultadoEntrega, RevertirDocumentoRequest, COLUMNAS_DOCUMENTO,
};
use crate::models::evento_model::{NuevoEvento, TipoEvento};
use crate::models::relacion_model::TipoRelacion;
use crate::models::{normalizar_paginacion, offset_paginacion, ListaPaginada};
use crate::services::evento_service::EventoService;
use crate::services::matrizador_service::{
    normalizar_email_opcional, normalizar_telefono_opcional, MatrizadorService,
};
use crate::services::relacion_service::RelacionService;
use crate::validation::pagos::{derivar_estado_pago, ValoresPago};

/// Columnas por las que se permite ordenar el listado.
const COLUMNAS_ORDENABLES: &[&str] = &[
    "created_at",
    "updated_at",
    "nombre_cliente",
    "codigo_barras",
    "valor_factura",
    "valor_pendiente",
    "estado",
    "estado_pago",
    "fecha_listo",
    "fecha_entrega",
];

#[derive(Clone, Debug)]
pub struct DocumentoService {
    db_pool: Pool<Sqlite>,
    matrizador_service: MatrizadorService,
}

impl DocumentoService {
    pub fn new(db_pool: Pool<Sqlite>, matrizador_service: MatrizadorService) -> Self {
        DocumentoService {
            db_pool,
            matrizador_service,
        }
    }

    /// Ingreso de un documento nuevo: todo el valor queda pendiente.
    pub async fn crear(
        &self,
        req: CrearDocumentoRequest,
        usuario_id: Option<&str>,
    ) -> Result<Documento> {
        let nombre_cliente = req.nombre_cliente.trim().to_string();
        if nombre_cliente.is_empty() {
            return Err(AppError::validacion("El nombre del cliente es obligatorio").into());
        }

        let valores = ValoresPago::iniciales(req.valor_factura);
        let estado_pago = derivar_estado_pago(&valores)?;

        let email = normalizar_email_opcional(req.email_cliente.as_deref())?;
        let telefono = normalizar_telefono_opcional(req.telefono_cliente.as_deref())?;
        let matrizador_id = self
            .validar_matrizador(req.matrizador_id.as_deref())
            .await?;

        let now = Utc::now();
        let codigo_barras = match req.codigo_barras.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_uppercase(),
            _ => generar_codigo_barras(&now),
        };

        let mut tx = self.db_pool.begin().await?;

        let existente: Option<String> =
            sqlx::query_scalar("SELECT id FROM documentos WHERE codigo_barras = ?1")
                .bind(&codigo_barras)
                .fetch_optional(&mut *tx)
                .await
                .context("Fallo al verificar código de barras")?;
        if existente.is_some() {
            return Err(AppError::conflicto(format!(
                "Ya existe un documento con código {}",
                codigo_barras
            ))
            .into());
        }

        let id = Uuid::new_v4().to_string();
        let now_txt = now.to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO documentos (
                id, codigo_barras, tipo_documento, nombre_cliente, identificacion_cliente,
                email_cliente, telefono_cliente, matrizador_id, estado, numero_factura,
                valor_factura, valor_pagado, valor_pendiente, valor_retenido, estado_pago,
                observaciones, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'EN_PROCESO', ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)
            "#,
        )
        .bind(&id)
        .bind(&codigo_barras)
        .bind(req.tipo_documento.as_str())
        .bind(&nombre_cliente)
        .bind(limpiar_opcional(req.identificacion_cliente))
        .bind(&email)
        .bind(&telefono)
        .bind(&matrizador_id)
        .bind(limpiar_opcional(req.numero_factura))
        .bind(valores.factura)
        .bind(valores.pagado)
        .bind(valores.pendiente)
        .bind(valores.retenido)
        .bind(estado_pago.as_str())
        .bind(limpiar_opcional(req.observaciones))
        .bind(&now_txt)
        .execute(&mut *tx)
        .await
        .context("Fallo al insertar documento")?;

        EventoService::registrar_en(
            &mut *tx,
            NuevoEvento::new(
                &id,
                TipoEvento::Creacion,
                format!(
                    "Ingreso de {} para {} por {:.2}",
                    req.tipo_documento, nombre_cliente, valores.factura
                ),
            )
            .por_usuario(usuario_id)
            .con_metadata(json!({
                "codigo_barras": codigo_barras,
                "valor_factura": valores.factura,
                "matrizador_id": matrizador_id,
            })),
        )
        .await?;

        tx.commit().await?;
        log::info!(
            "(crear_documento) Documento {} ({}) ingresado por {:?}",
            id,
            codigo_barras,
            usuario_id
        );
        self.obtener(&id).await
    }

    pub async fn obtener(&self, id: &str) -> Result<Documento> {
        let mut conn = self.db_pool.acquire().await?;
        cargar_documento(&mut conn, id).await
    }

    pub async fn actualizar(
        &self,
        id: &str,
        req: ActualizarDocumentoRequest,
        usuario_id: Option<&str>,
    ) -> Result<Documento> {
        // Se valida antes de abrir la transacción: usa su propia conexión del pool.
        let nuevo_matrizador = match req.matrizador_id.as_deref() {
            Some(m) => Some(self.validar_matrizador(Some(m)).await?),
            None => None,
        };

        let mut tx = self.db_pool.begin().await?;
        let mut doc = cargar_documento(&mut tx, id).await?;
        if doc.estado.es_terminal() {
            return Err(AppError::conflicto(format!(
                "El documento está {} y no admite cambios",
                doc.estado
            ))
            .into());
        }

        let mut cambios: Vec<&str> = Vec::new();

        if let Some(nombre) = req.nombre_cliente {
            let nombre = nombre.trim().to_string();
            if nombre.is_empty() {
                return Err(AppError::validacion("El nombre del cliente es obligatorio").into());
            }
            doc.nombre_cliente = nombre;
            cambios.push("nombre_cliente");
        }
        if let Some(identificacion) = req.identificacion_cliente {
            doc.identificacion_cliente = limpiar_opcional(Some(identificacion));
            cambios.push("identificacion_cliente");
        }
        if let Some(email) = req.email_cliente {
            doc.email_cliente = normalizar_email_opcional(Some(&email))?;
            cambios.push("email_cliente");
        }
        if let Some(telefono) = req.telefono_cliente {
            doc.telefono_cliente = normalizar_telefono_opcional(Some(&telefono))?;
            cambios.push("telefono_cliente");
        }
        if let Some(matrizador_id) = nuevo_matrizador {
            doc.matrizador_id = matrizador_id;
            cambios.push("matrizador_id");
        }
        if let Some(numero_factura) = req.numero_factura {
            doc.numero_factura = limpiar_opcional(Some(numero_factura));
            cambios.push("numero_factura");
        }
        if let Some(observaciones) = req.observaciones {
            doc.observaciones = limpiar_opcional(Some(observaciones));
            cambios.push("observaciones");
        }

        let factura_anterior = doc.valor_factura;
        if let Some(valor_factura) = req.valor_factura {
            // Lo ya pagado o retenido no puede quedar por encima de la nueva factura.
            let nuevos =
                ValoresPago::recalculados(valor_factura, doc.valor_pagado, doc.valor_retenido);
            doc.estado_pago = derivar_estado_pago(&nuevos)?;
            doc.valor_factura = nuevos.factura;
            doc.valor_pendiente = nuevos.pendiente;
            cambios.push("valor_factura");
        }

        if cambios.is_empty() {
            return Ok(doc);
        }

        sqlx::query(
            r#"
            UPDATE documentos
            SET nombre_cliente = ?2, identificacion_cliente = ?3, email_cliente = ?4,
                telefono_cliente = ?5, matrizador_id = ?6, numero_factura = ?7,
                observaciones = ?8, valor_factura = ?9, valor_pendiente = ?10,
                estado_pago = ?11, updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&doc.nombre_cliente)
        .bind(&doc.identificacion_cliente)
        .bind(&doc.email_cliente)
        .bind(&doc.telefono_cliente)
        .bind(&doc.matrizador_id)
        .bind(&doc.numero_factura)
        .bind(&doc.observaciones)
        .bind(doc.valor_factura)
        .bind(doc.valor_pendiente)
        .bind(doc.estado_pago.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .context("Fallo al actualizar documento")?;

        EventoService::registrar_en(
            &mut *tx,
            NuevoEvento::new(
                id,
                TipoEvento::Actualizacion,
                format!("Se actualizaron: {}", cambios.join(", ")),
            )
            .por_usuario(usuario_id)
            .con_metadata(json!({
                "campos": cambios,
                "valor_factura_anterior": factura_anterior,
                "valor_factura": doc.valor_factura,
            })),
        )
        .await?;

        tx.commit().await?;
        self.obtener(id).await
    }

    /// Listado con filtros, orden y paginación.
    pub async fn listar(&self, filtro: &FiltroDocumentos) -> Result<ListaPaginada<Documento>> {
        let (page, page_size) = normalizar_paginacion(filtro.page, filtro.page_size);
        let offset = offset_paginacion(page, page_size);

        let orden = match filtro.orden.as_deref().map(str::trim) {
            None | Some("") => "created_at",
            Some(o) => COLUMNAS_ORDENABLES
                .iter()
                .copied()
                .find(|c| *c == o)
                .ok_or_else(|| {
                    AppError::validacion(format!("No se puede ordenar por '{}'", o))
                })?,
        };
        let direccion = match filtro.direccion.as_deref().map(str::to_ascii_lowercase) {
            None => "DESC",
            Some(d) if d == "asc" => "ASC",
            Some(d) if d == "desc" => "DESC",
            Some(d) => {
                return Err(AppError::validacion(format!("Dirección inválida: '{}'", d)).into())
            }
        };
        let rango = rango_fechas(filtro)?;

        let mut count_qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM documentos WHERE 1 = 1");
        aplicar_filtros(&mut count_qb, filtro, &rango);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.db_pool)
            .await
            .context("Fallo al contar documentos")?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM documentos WHERE 1 = 1",
            COLUMNAS_DOCUMENTO
        ));
        aplicar_filtros(&mut qb, filtro, &rango);
        // orden y dirección vienen de listas cerradas, no del usuario
        qb.push(format!(" ORDER BY {} {}, id ASC", orden, direccion));
        qb.push(" LIMIT ")
            .push_bind(page_size as i64)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb
            .build()
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar documentos")?;
        let items = rows
            .iter()
            .map(Documento::from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(ListaPaginada {
            total: total as u64,
            page,
            page_size,
            items,
        })
    }

    /// EN_PROCESO -> LISTO. Genera el código que el cliente presentará al retirar.
    pub async fn marcar_listo(&self, id: &str, usuario_id: Option<&str>) -> Result<Documento> {
        let mut tx = self.db_pool.begin().await?;
        let doc = cargar_documento(&mut tx, id).await?;
        exigir_estado(&doc, EstadoDocumento::EnProceso, "marcar como listo")?;

        let codigo = generar_codigo_verificacion();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE documentos
            SET estado = 'LISTO', codigo_verificacion = ?2, fecha_listo = ?3, updated_at = ?3
            WHERE id = ?1 AND estado = 'EN_PROCESO'
            "#,
        )
        .bind(id)
        .bind(&codigo)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Fallo al marcar documento como listo")?;

        EventoService::registrar_en(
            &mut *tx,
            NuevoEvento::new(id, TipoEvento::CambioEstado, "EN_PROCESO -> LISTO")
                .por_usuario(usuario_id)
                .con_metadata(json!({ "anterior": "EN_PROCESO", "nuevo": "LISTO" })),
        )
        .await?;

        tx.commit().await?;
        log::info!("(marcar_listo) Documento {} listo para entrega", id);
        self.obtener(id).await
    }

    /// LISTO -> ENTREGADO. Exige código (o justificación) y pago completo.
    pub async fn entregar(
        &self,
        id: &str,
        req: EntregarDocumentoRequest,
        usuario_id: Option<&str>,
    ) -> Result<ResultadoEntrega> {
        let entregado_a = req.entregado_a.trim().to_string();
        if entregado_a.is_empty() {
            return Err(AppError::validacion("Indique quién retira el documento").into());
        }
        let justificacion = limpiar_opcional(req.sin_codigo_justificacion);

        let mut tx = self.db_pool.begin().await?;
        let doc = cargar_documento(&mut tx, id).await?;
        exigir_estado(&doc, EstadoDocumento::Listo, "entregar")?;

        if justificacion.is_none() {
            let ingresado = req.codigo_verificacion.as_deref().unwrap_or("");
            let esperado = doc.codigo_verificacion.as_deref().unwrap_or("");
            if !codigo_coincide(esperado, ingresado) {
                return Err(AppError::validacion("Código de verificación incorrecto").into());
            }
        }
        if let Some(motivo) = motivo_no_entregable(&doc) {
            return Err(AppError::validacion(motivo).into());
        }

        let mut entregados = vec![id.to_string()];
        let mut omitidos = Vec::new();

        registrar_entrega(
            &mut tx,
            &doc,
            &entregado_a,
            justificacion.as_deref(),
            None,
            usuario_id,
        )
        .await?;

        if req.incluir_relacionados {
            let relacionados =
                RelacionService::relacionados_en(&mut tx, id, TipoRelacion::Grupo).await?;
            for rel_id in relacionados {
                let rel = cargar_documento(&mut tx, &rel_id).await?;
                let motivo = if rel.estado != EstadoDocumento::Listo {
                    Some(format!("El documento está {}", rel.estado))
                } else {
                    motivo_no_entregable(&rel)
                };
                match motivo {
                    Some(motivo) => omitidos.push(EntregaOmitida {
                        documento_id: rel_id,
                        motivo,
                    }),
                    None => {
                        registrar_entrega(
                            &mut tx,
                            &rel,
                            &entregado_a,
                            justificacion.as_deref(),
                            Some(id),
                            usuario_id,
                        )
                        .await?;
                        entregados.push(rel_id);
                    }
                }
            }
        }

        tx.commit().await?;
        log::info!(
            "(entregar) Entregados {:?} a '{}', omitidos={}",
            entregados,
            entregado_a,
            omitidos.len()
        );

        let mut docs = Vec::with_capacity(entregados.len());
        for doc_id in &entregados {
            docs.push(self.obtener(doc_id).await?);
        }
        Ok(ResultadoEntrega {
            entregados: docs,
            omitidos,
        })
    }

    /// LISTO -> EN_PROCESO (p.e. se detectó un error antes de la entrega).
    pub async fn revertir_a_proceso(
        &self,
        id: &str,
        req: RevertirDocumentoRequest,
        usuario_id: Option<&str>,
    ) -> Result<Documento> {
        let mut tx = self.db_pool.begin().await?;
        let doc = cargar_documento(&mut tx, id).await?;
        exigir_estado(&doc, EstadoDocumento::Listo, "revertir a proceso")?;

        sqlx::query(
            r#"
            UPDATE documentos
            SET estado = 'EN_PROCESO', codigo_verificacion = NULL, fecha_listo = NULL, updated_at = ?2
            WHERE id = ?1 AND estado = 'LISTO'
            "#,
        )
        .bind(id)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .context("Fallo al revertir documento")?;

        let motivo = limpiar_opcional(req.motivo);
        EventoService::registrar_en(
            &mut *tx,
            NuevoEvento::new(
                id,
                TipoEvento::CambioEstado,
                match &motivo {
                    Some(m) => format!("LISTO -> EN_PROCESO: {}", m),
                    None => "LISTO -> EN_PROCESO".to_string(),
                },
            )
            .por_usuario(usuario_id)
            .con_metadata(json!({ "anterior": "LISTO", "nuevo": "EN_PROCESO", "motivo": motivo })),
        )
        .await?;

        tx.commit().await?;
        self.obtener(id).await
    }

    pub async fn cancelar(
        &self,
        id: &str,
        req: CancelarDocumentoRequest,
        usuario_id: Option<&str>,
    ) -> Result<Documento> {
        let motivo = req.motivo.trim().to_string();
        if motivo.is_empty() {
            return Err(AppError::validacion("El motivo de cancelación es obligatorio").into());
        }

        let mut tx = self.db_pool.begin().await?;
        let doc = cargar_documento(&mut tx, id).await?;
        if doc.estado.es_terminal() {
            return Err(AppError::conflicto(format!(
                "No se puede cancelar un documento {}",
                doc.estado
            ))
            .into());
        }

        sqlx::query(
            "UPDATE documentos SET estado = 'CANCELADO', updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .context("Fallo al cancelar documento")?;

        EventoService::registrar_en(
            &mut *tx,
            NuevoEvento::new(id, TipoEvento::Cancelacion, format!("Cancelado: {}", motivo))
                .por_usuario(usuario_id)
                .con_metadata(json!({ "anterior": doc.estado.as_str(), "motivo": motivo })),
        )
        .await?;

        tx.commit().await?;
        log::warn!("(cancelar) Documento {} cancelado: {}", id, motivo);
        self.obtener(id).await
    }

    async fn validar_matrizador(&self, matrizador_id: Option<&str>) -> Result<Option<String>> {
        let id = match matrizador_id.map(str::trim) {
            None | Some("") => return Ok(None),
            Some(id) => id,
        };
        let matrizador = self.matrizador_service.obtener(id).await?;
        if !matrizador.puede_matrizar() {
            return Err(AppError::validacion(format!(
                "{} no puede tener documentos asignados (rol {}, activo={})",
                matrizador.nombre, matrizador.rol, matrizador.activo
            ))
            .into());
        }
        Ok(Some(matrizador.id))
    }
}

/// Carga un documento con la conexión dada (sirve dentro de una transacción).
pub(crate) async fn cargar_documento(conn: &mut SqliteConnection, id: &str) -> Result<Documento> {
    let sql = format!("SELECT {} FROM documentos WHERE id = ?1", COLUMNAS_DOCUMENTO);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("Fallo al consultar documento")?
        .ok_or_else(|| AppError::no_encontrado(format!("No existe el documento {}", id)))?;
    Documento::from_row(&row)
}

fn exigir_estado(doc: &Documento, esperado: EstadoDocumento, accion: &str) -> Result<()> {
    if doc.estado != esperado {
        return Err(AppError::conflicto(format!(
            "No se puede {}: el documento está {} (se requiere {})",
            accion, doc.estado, esperado
        ))
        .into());
    }
    Ok(())
}

fn motivo_no_entregable(doc: &Documento) -> Option<String> {
    if doc.estado_pago.esta_saldado() {
        None
    } else {
        Some(format!(
            "El documento {} tiene saldo pendiente de {:.2}",
            doc.codigo_barras, doc.valor_pendiente
        ))
    }
}

async fn registrar_entrega(
    conn: &mut SqliteConnection,
    doc: &Documento,
    entregado_a: &str,
    justificacion: Option<&str>,
    junto_con: Option<&str>,
    usuario_id: Option<&str>,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        UPDATE documentos
        SET estado = 'ENTREGADO', entregado_a = ?2, fecha_entrega = ?3, updated_at = ?3
        WHERE id = ?1 AND estado = 'LISTO'
        "#,
    )
    .bind(&doc.id)
    .bind(entregado_a)
    .bind(&now)
    .execute(&mut *conn)
    .await
    .context("Fallo al registrar entrega")?;

    let detalle = match junto_con {
        Some(principal) => format!("Entregado a {} junto con {}", entregado_a, principal),
        None => format!("Entregado a {}", entregado_a),
    };
    EventoService::registrar_en(
        &mut *conn,
        NuevoEvento::new(&doc.id, TipoEvento::Entrega, detalle)
            .por_usuario(usuario_id)
            .con_metadata(json!({
                "entregado_a": entregado_a,
                "sin_codigo_justificacion": justificacion,
                "junto_con": junto_con,
            })),
    )
    .await?;
    Ok(())
}

fn limpiar_opcional(valor: Option<String>) -> Option<String> {
    valor
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

struct RangoFechas {
    desde: Option<String>,
    hasta_exclusivo: Option<String>,
}

fn rango_fechas(filtro: &FiltroDocumentos) -> Result<RangoFechas> {
    let parse = |valor: &str| {
        NaiveDate::parse_from_str(valor.trim(), "%Y-%m-%d").map_err(|_| {
            AppError::validacion(format!("Fecha inválida '{}', use AAAA-MM-DD", valor))
        })
    };
    let desde = filtro.fecha_desde.as_deref().map(parse).transpose()?;
    let hasta = filtro.fecha_hasta.as_deref().map(parse).transpose()?;
    if let (Some(d), Some(h)) = (desde, hasta) {
        if d > h {
            return Err(AppError::validacion("fecha_desde es posterior a fecha_hasta").into());
        }
    }
    Ok(RangoFechas {
        desde: desde.map(|d| medianoche_local(d).to_rfc3339()),
        hasta_exclusivo: hasta
            .and_then(|h| h.succ_opt())
            .map(|h| medianoche_local(h).to_rfc3339()),
    })
}

fn aplicar_filtros<'a>(
    qb: &mut QueryBuilder<'a, Sqlite>,
    filtro: &'a FiltroDocumentos,
    rango: &'a RangoFechas,
) {
    if let Some(estado) = filtro.estado {
        qb.push(" AND estado = ").push_bind(estado.as_str());
    }
    if let Some(estado_pago) = filtro.estado_pago {
        qb.push(" AND estado_pago = ").push_bind(estado_pago.as_str());
    }
    if let Some(tipo) = filtro.tipo_documento {
        qb.push(" AND tipo_documento = ").push_bind(tipo.as_str());
    }
    if let Some(matrizador_id) = filtro.matrizador_id.as_deref().filter(|m| !m.is_empty()) {
        qb.push(" AND matrizador_id = ").push_bind(matrizador_id);
    }
    if let Some(busqueda) = filtro
        .busqueda
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
    {
        let patron = format!("%{}%", busqueda);
        qb.push(" AND (nombre_cliente LIKE ")
            .push_bind(patron.clone())
            .push(" OR identificacion_cliente LIKE ")
            .push_bind(patron.clone())
            .push(" OR codigo_barras LIKE ")
            .push_bind(patron.clone())
            .push(" OR numero_factura LIKE ")
            .push_bind(patron)
            .push(")");
    }
    if let Some(desde) = &rango.desde {
        qb.push(" AND created_at >= ").push_bind(desde.as_str());
    }
    if let Some(hasta) = &rango.hasta_exclusivo {
        qb.push(" AND created_at < ").push_bind(hasta.as_str());
    }
}

//! models/documento_model.rs
//! Documento notarial: ingreso, facturación, estado de trámite y entrega.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};

use crate::models::{parse_fecha, parse_fecha_opt};
use crate::validation::pagos::{EstadoPago, ValoresPago};

enum_texto! {
    /// Estado del trámite. ENTREGADO y CANCELADO son terminales.
    EstadoDocumento {
        EnProceso => "EN_PROCESO",
        Listo => "LISTO",
        Entregado => "ENTREGADO",
        Cancelado => "CANCELADO",
    }
}

impl EstadoDocumento {
    pub fn es_terminal(&self) -> bool {
        matches!(self, EstadoDocumento::Entregado | EstadoDocumento::Cancelado)
    }
}

enum_texto! {
    TipoDocumento {
        Protocolo => "PROTOCOLO",
        Diligencia => "DILIGENCIA",
        Certificacion => "CERTIFICACION",
        Arrendamiento => "ARRENDAMIENTO",
        Otros => "OTROS",
    }
}

pub const COLUMNAS_DOCUMENTO: &str = "id, codigo_barras, tipo_documento, nombre_cliente, \
    identificacion_cliente, email_cliente, telefono_cliente, matrizador_id, estado, \
    numero_factura, valor_factura, valor_pagado, valor_pendiente, valor_retenido, \
    estado_pago, metodo_pago, codigo_verificacion, fecha_listo, fecha_entrega, \
    entregado_a, observaciones, created_at, updated_at";

#[derive(Debug, Clone, Serialize)]
pub struct Documento {
    pub id: String,
    pub codigo_barras: String,
    pub tipo_documento: TipoDocumento,
    pub nombre_cliente: String,
    pub identificacion_cliente: Option<String>,
    pub email_cliente: Option<String>,
    pub telefono_cliente: Option<String>,
    pub matrizador_id: Option<String>,
    pub estado: EstadoDocumento,
    pub numero_factura: Option<String>,
    pub valor_factura: f64,
    pub valor_pagado: f64,
    pub valor_pendiente: f64,
    pub valor_retenido: f64,
    pub estado_pago: EstadoPago,
    pub metodo_pago: Option<String>,
    /// Solo lo conoce el cliente (llega en la notificación).
    #[serde(skip_serializing)]
    pub codigo_verificacion: Option<String>,
    pub fecha_listo: Option<DateTime<Utc>>,
    pub fecha_entrega: Option<DateTime<Utc>>,
    pub entregado_a: Option<String>,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Documento {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let tipo: String = row.try_get("tipo_documento")?;
        let estado: String = row.try_get("estado")?;
        let estado_pago: String = row.try_get("estado_pago")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Documento {
            id: row.try_get("id")?,
            codigo_barras: row.try_get("codigo_barras")?,
            tipo_documento: tipo.parse()?,
            nombre_cliente: row.try_get("nombre_cliente")?,
            identificacion_cliente: row.try_get("identificacion_cliente")?,
            email_cliente: row.try_get("email_cliente")?,
            telefono_cliente: row.try_get("telefono_cliente")?,
            matrizador_id: row.try_get("matrizador_id")?,
            estado: estado.parse()?,
            numero_factura: row.try_get("numero_factura")?,
            valor_factura: row.try_get("valor_factura")?,
            valor_pagado: row.try_get("valor_pagado")?,
            valor_pendiente: row.try_get("valor_pendiente")?,
            valor_retenido: row.try_get("valor_retenido")?,
            estado_pago: estado_pago.parse()?,
            metodo_pago: row.try_get("metodo_pago")?,
            codigo_verificacion: row.try_get("codigo_verificacion")?,
            fecha_listo: parse_fecha_opt(row.try_get("fecha_listo")?)?,
            fecha_entrega: parse_fecha_opt(row.try_get("fecha_entrega")?)?,
            entregado_a: row.try_get("entregado_a")?,
            observaciones: row.try_get("observaciones")?,
            created_at: parse_fecha(&created_at)?,
            updated_at: parse_fecha(&updated_at)?,
        })
    }

    pub fn valores(&self) -> ValoresPago {
        ValoresPago {
            factura: self.valor_factura,
            pagado: self.valor_pagado,
            pendiente: self.valor_pendiente,
            retenido: self.valor_retenido,
        }
    }
}

/// Request de ingreso (recepción / caja)
#[derive(Debug, Clone, Deserialize)]
pub struct CrearDocumentoRequest {
    /// Si no viene, se genera uno interno.
    pub codigo_barras: Option<String>,
    pub tipo_documento: TipoDocumento,
    pub nombre_cliente: String,
    pub identificacion_cliente: Option<String>,
    pub email_cliente: Option<String>,
    pub telefono_cliente: Option<String>,
    pub matrizador_id: Option<String>,
    pub numero_factura: Option<String>,
    pub valor_factura: f64,
    pub observaciones: Option<String>,
}

/// Solo se actualizan los campos presentes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActualizarDocumentoRequest {
    pub nombre_cliente: Option<String>,
    pub identificacion_cliente: Option<String>,
    pub email_cliente: Option<String>,
    pub telefono_cliente: Option<String>,
    pub matrizador_id: Option<String>,
    pub numero_factura: Option<String>,
    pub valor_factura: Option<f64>,
    pub observaciones: Option<String>,
}

/// Filtros, orden y paginación del listado (query string).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltroDocumentos {
    pub estado: Option<EstadoDocumento>,
    pub estado_pago: Option<EstadoPago>,
    pub matrizador_id: Option<String>,
    pub tipo_documento: Option<TipoDocumento>,
    /// Texto libre sobre cliente, identificación, código o factura
    pub busqueda: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub fecha_desde: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub fecha_hasta: Option<String>,
    pub orden: Option<String>,
    pub direccion: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntregarDocumentoRequest {
    pub codigo_verificacion: Option<String>,
    /// Nombre de quien retira
    pub entregado_a: String,
    /// Entrega sin código (cliente lo perdió); exige justificación
    pub sin_codigo_justificacion: Option<String>,
    #[serde(default)]
    pub incluir_relacionados: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelarDocumentoRequest {
    pub motivo: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevertirDocumentoRequest {
    pub motivo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntregaOmitida {
    pub documento_id: String,
    pub motivo: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultadoEntrega {
    pub entregados: Vec<Documento>,
    pub omitidos: Vec<EntregaOmitida>,
}

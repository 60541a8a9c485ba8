//! models/dashboard_model.rs
//! Resúmenes por rol. Los montos van crudos y formateados para la vista.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::helpers::formato::{formatear_moneda, Badge};
use crate::models::documento_model::Documento;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResumenMontos {
    pub facturado: f64,
    pub pagado: f64,
    pub pendiente: f64,
    pub retenido: f64,
    pub facturado_fmt: String,
    pub pagado_fmt: String,
    pub pendiente_fmt: String,
    pub retenido_fmt: String,
}

impl ResumenMontos {
    pub fn new(facturado: f64, pagado: f64, pendiente: f64, retenido: f64) -> Self {
        ResumenMontos {
            facturado,
            pagado,
            pendiente,
            retenido,
            facturado_fmt: formatear_moneda(facturado),
            pagado_fmt: formatear_moneda(pagado),
            pendiente_fmt: formatear_moneda(pendiente),
            retenido_fmt: formatear_moneda(retenido),
        }
    }
}

/// Fila de tabla de dashboard: el documento más sus etiquetas ya formateadas.
#[derive(Debug, Clone, Serialize)]
pub struct FilaDocumento {
    #[serde(flatten)]
    pub documento: Documento,
    pub badge_estado: Badge,
    pub badge_pago: Badge,
    pub valor_factura_fmt: String,
    pub valor_pendiente_fmt: String,
    pub fecha_ingreso_fmt: String,
    /// "hace N días" desde que quedó listo (recepción) o desde el ingreso
    pub antiguedad: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentosPorMatrizador {
    pub matrizador_id: Option<String>,
    pub nombre: Option<String>,
    pub total: i64,
    pub en_proceso: i64,
    pub listos: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardAdmin {
    pub total_documentos: i64,
    pub por_estado: BTreeMap<String, i64>,
    pub por_estado_pago: BTreeMap<String, i64>,
    pub montos: ResumenMontos,
    pub notificaciones_fallidas: i64,
    pub por_matrizador: Vec<DocumentosPorMatrizador>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardCaja {
    pub montos: ResumenMontos,
    pub documentos_con_saldo: i64,
    pub pagos_hoy: i64,
    pub pendientes: Vec<FilaDocumento>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMatrizador {
    pub matrizador_id: String,
    pub por_estado: BTreeMap<String, i64>,
    pub recientes: Vec<FilaDocumento>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardRecepcion {
    pub listos_para_entrega: Vec<FilaDocumento>,
    pub listos_con_saldo: i64,
    pub entregados_hoy: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardArchivo {
    pub total_entregados: u64,
    pub cancelados: i64,
    pub page: u64,
    pub page_size: u64,
    pub entregados: Vec<FilaDocumento>,
}

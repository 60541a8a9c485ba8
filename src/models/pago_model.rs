//! models/pago_model.rs
//! Requests y reportes de caja: abonos, retenciones y reconciliación.

use serde::{Deserialize, Serialize};

use crate::models::documento_model::Documento;
use crate::validation::pagos::{EstadoPago, Inconsistencia, ValoresPago};

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrarPagoRequest {
    pub monto: f64,
    /// EFECTIVO, TRANSFERENCIA, TARJETA, CHEQUE ...
    pub metodo_pago: Option<String>,
    pub numero_recibo: Option<String>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrarRetencionRequest {
    pub monto: f64,
    /// Número del comprobante de retención emitido por el cliente
    pub numero_comprobante: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultadoPago {
    pub estado_pago_anterior: EstadoPago,
    pub documento: Documento,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentoInconsistente {
    pub documento_id: String,
    pub codigo_barras: String,
    pub estado_pago_guardado: String,
    pub valores: ValoresPago,
    pub inconsistencias: Vec<Inconsistencia>,
    pub corregible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReporteReconciliacion {
    pub documentos_revisados: usize,
    pub documentos_inconsistentes: usize,
    pub items: Vec<DocumentoInconsistente>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultadoCorreccion {
    pub corregidos: Vec<String>,
    /// Requieren revisión manual (sobrepagos, montos negativos, factura inválida)
    pub requieren_revision: Vec<String>,
}

//! validation/pagos.rs
//! Reglas aritméticas de facturación: factura = pagado + pendiente + retenido.
//!
//! Todas las comparaciones se hacen en centavos enteros para no arrastrar
//! errores de punto flotante; la tolerancia es de 2 centavos.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TOLERANCIA_CENTAVOS: i64 = 2;

/// Tope para cualquier monto: mantiene las sumas en centavos lejos del límite de i64.
pub const MONTO_MAXIMO: f64 = 1_000_000_000_000.0;

/// Estado de pago derivado de los montos del documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoPago {
    Pendiente,
    PagoParcial,
    Pagado,
    PagadoConRetencion,
}

impl EstadoPago {
    pub const TODOS: [EstadoPago; 4] = [
        EstadoPago::Pendiente,
        EstadoPago::PagoParcial,
        EstadoPago::Pagado,
        EstadoPago::PagadoConRetencion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoPago::Pendiente => "PENDIENTE",
            EstadoPago::PagoParcial => "PAGO_PARCIAL",
            EstadoPago::Pagado => "PAGADO",
            EstadoPago::PagadoConRetencion => "PAGADO_CON_RETENCION",
        }
    }

    /// Un documento solo puede entregarse si está saldado.
    pub fn esta_saldado(&self) -> bool {
        matches!(self, EstadoPago::Pagado | EstadoPago::PagadoConRetencion)
    }
}

impl fmt::Display for EstadoPago {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstadoPago {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EstadoPago::TODOS
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Estado de pago desconocido: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidacionPagoError {
    #[error("El valor de la factura debe ser mayor a 0")]
    FacturaNoPositiva,

    #[error("El campo {campo} no es un número válido")]
    NoNumerico { campo: &'static str },

    #[error("El campo {campo} no puede ser negativo ({valor:.2})")]
    Negativo { campo: &'static str, valor: f64 },

    #[error(
        "Lo pagado ({pagado:.2}) más lo retenido ({retenido:.2}) excede el valor de la factura ({factura:.2})"
    )]
    ExcedeFactura {
        factura: f64,
        pagado: f64,
        retenido: f64,
    },

    #[error(
        "Los valores no cuadran: factura {factura:.2} != pagado + pendiente + retenido ({suma:.2})"
    )]
    SumaNoCuadra { factura: f64, suma: f64 },

    #[error("El campo {campo} excede el máximo permitido ({maximo:.2})")]
    FueraDeRango { campo: &'static str, maximo: f64 },

    #[error("El monto debe ser mayor a 0")]
    MontoNoPositivo,

    #[error("El documento no tiene saldo pendiente")]
    SinSaldoPendiente,

    #[error("El monto {monto:.2} excede el saldo pendiente ({pendiente:.2})")]
    MontoExcedePendiente { monto: f64, pendiente: f64 },
}

/// Los cuatro montos de un documento.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValoresPago {
    pub factura: f64,
    pub pagado: f64,
    pub pendiente: f64,
    pub retenido: f64,
}

impl ValoresPago {
    /// Valores iniciales de un documento recién ingresado: todo pendiente.
    pub fn iniciales(factura: f64) -> Self {
        let factura = redondear(factura);
        ValoresPago {
            factura,
            pagado: 0.0,
            pendiente: factura,
            retenido: 0.0,
        }
    }

    /// Recalcula el pendiente a partir de factura, pagado y retenido.
    pub fn recalculados(factura: f64, pagado: f64, retenido: f64) -> Self {
        ValoresPago {
            factura: redondear(factura),
            pagado: redondear(pagado),
            pendiente: calcular_pendiente(factura, pagado, retenido),
            retenido: redondear(retenido),
        }
    }
}

/// Problema encontrado al auditar un documento ya guardado.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tipo", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Inconsistencia {
    MontoNegativo { campo: String, valor: f64 },
    MontoFueraDeRango { campo: String, valor: f64 },
    SumaNoCuadra { factura: f64, suma: f64, diferencia: f64 },
    Sobrepago { excedente: f64 },
    EstadoIncorrecto { guardado: String, esperado: String },
    FacturaInvalida,
}

impl Inconsistencia {
    /// Se puede corregir recalculando el pendiente y el estado sin perder información.
    pub fn es_corregible(&self) -> bool {
        matches!(
            self,
            Inconsistencia::SumaNoCuadra { .. } | Inconsistencia::EstadoIncorrecto { .. }
        )
    }
}

pub fn a_centavos(valor: f64) -> i64 {
    (valor * 100.0).round() as i64
}

pub fn redondear(valor: f64) -> f64 {
    a_centavos(valor) as f64 / 100.0
}

pub fn calcular_pendiente(factura: f64, pagado: f64, retenido: f64) -> f64 {
    let centavos = a_centavos(factura)
        .saturating_sub(a_centavos(pagado))
        .saturating_sub(a_centavos(retenido));
    centavos.max(0) as f64 / 100.0
}

fn dentro_de_tolerancia(a: i64, b: i64) -> bool {
    (a - b).abs() <= TOLERANCIA_CENTAVOS
}

fn fuera_de_rango(valor: f64) -> bool {
    valor.abs() > MONTO_MAXIMO
}

/// Valida los montos de un documento. Devuelve el primer error encontrado.
pub fn validar_valores(v: &ValoresPago) -> Result<(), ValidacionPagoError> {
    let campos = [
        ("valor_factura", v.factura),
        ("valor_pagado", v.pagado),
        ("valor_pendiente", v.pendiente),
        ("valor_retenido", v.retenido),
    ];
    for (campo, valor) in campos {
        if !valor.is_finite() {
            return Err(ValidacionPagoError::NoNumerico { campo });
        }
        if fuera_de_rango(valor) {
            return Err(ValidacionPagoError::FueraDeRango {
                campo,
                maximo: MONTO_MAXIMO,
            });
        }
    }

    if a_centavos(v.factura) <= 0 {
        return Err(ValidacionPagoError::FacturaNoPositiva);
    }

    for &(campo, valor) in &campos[1..] {
        if a_centavos(valor) < 0 {
            return Err(ValidacionPagoError::Negativo { campo, valor });
        }
    }

    let factura = a_centavos(v.factura);
    let cubierto = a_centavos(v.pagado) + a_centavos(v.retenido);
    if cubierto > factura + TOLERANCIA_CENTAVOS {
        return Err(ValidacionPagoError::ExcedeFactura {
            factura: v.factura,
            pagado: v.pagado,
            retenido: v.retenido,
        });
    }

    let suma = cubierto + a_centavos(v.pendiente);
    if !dentro_de_tolerancia(factura, suma) {
        return Err(ValidacionPagoError::SumaNoCuadra {
            factura: v.factura,
            suma: suma as f64 / 100.0,
        });
    }

    Ok(())
}

/// Deriva el estado de pago de montos válidos.
pub fn derivar_estado_pago(v: &ValoresPago) -> Result<EstadoPago, ValidacionPagoError> {
    validar_valores(v)?;

    let pendiente = a_centavos(v.pendiente);
    let cubierto = a_centavos(v.pagado) + a_centavos(v.retenido);

    let estado = if cubierto == 0 {
        EstadoPago::Pendiente
    } else if pendiente <= TOLERANCIA_CENTAVOS {
        if a_centavos(v.retenido) > 0 {
            EstadoPago::PagadoConRetencion
        } else {
            EstadoPago::Pagado
        }
    } else {
        EstadoPago::PagoParcial
    };
    Ok(estado)
}

fn validar_monto(v: &ValoresPago, monto: f64) -> Result<(), ValidacionPagoError> {
    if !monto.is_finite() {
        return Err(ValidacionPagoError::NoNumerico { campo: "monto" });
    }
    if fuera_de_rango(monto) {
        return Err(ValidacionPagoError::FueraDeRango {
            campo: "monto",
            maximo: MONTO_MAXIMO,
        });
    }
    if a_centavos(monto) <= 0 {
        return Err(ValidacionPagoError::MontoNoPositivo);
    }
    if a_centavos(v.pendiente) <= 0 {
        return Err(ValidacionPagoError::SinSaldoPendiente);
    }
    if a_centavos(monto) > a_centavos(v.pendiente) + TOLERANCIA_CENTAVOS {
        return Err(ValidacionPagoError::MontoExcedePendiente {
            monto,
            pendiente: v.pendiente,
        });
    }
    Ok(())
}

/// Aplica un abono y devuelve los nuevos montos (ya validados).
pub fn aplicar_pago(v: &ValoresPago, monto: f64) -> Result<ValoresPago, ValidacionPagoError> {
    validar_valores(v)?;
    validar_monto(v, monto)?;
    let nuevos = ValoresPago::recalculados(v.factura, v.pagado + monto, v.retenido);
    validar_valores(&nuevos)?;
    Ok(nuevos)
}

/// Aplica una retención (comprobante de retención del cliente).
pub fn aplicar_retencion(
    v: &ValoresPago,
    monto: f64,
) -> Result<ValoresPago, ValidacionPagoError> {
    validar_valores(v)?;
    validar_monto(v, monto)?;
    let nuevos = ValoresPago::recalculados(v.factura, v.pagado, v.retenido + monto);
    validar_valores(&nuevos)?;
    Ok(nuevos)
}

/// Audita los montos guardados contra el estado guardado. Nunca falla: acumula
/// todo lo que encuentra para el reporte de reconciliación.
pub fn verificar_consistencia(v: &ValoresPago, estado_guardado: &str) -> Vec<Inconsistencia> {
    let mut hallazgos = Vec::new();

    if !v.factura.is_finite() || fuera_de_rango(v.factura) || a_centavos(v.factura) <= 0 {
        hallazgos.push(Inconsistencia::FacturaInvalida);
        return hallazgos;
    }

    for (campo, valor) in [
        ("valor_pagado", v.pagado),
        ("valor_pendiente", v.pendiente),
        ("valor_retenido", v.retenido),
    ] {
        if valor.is_finite() && fuera_de_rango(valor) {
            hallazgos.push(Inconsistencia::MontoFueraDeRango {
                campo: campo.to_string(),
                valor,
            });
        } else if !valor.is_finite() || a_centavos(valor) < 0 {
            hallazgos.push(Inconsistencia::MontoNegativo {
                campo: campo.to_string(),
                valor,
            });
        }
    }
    if !hallazgos.is_empty() {
        return hallazgos;
    }

    let factura = a_centavos(v.factura);
    let cubierto = a_centavos(v.pagado) + a_centavos(v.retenido);
    if cubierto > factura + TOLERANCIA_CENTAVOS {
        hallazgos.push(Inconsistencia::Sobrepago {
            excedente: (cubierto - factura) as f64 / 100.0,
        });
        return hallazgos;
    }

    let suma = cubierto + a_centavos(v.pendiente);
    if !dentro_de_tolerancia(factura, suma) {
        hallazgos.push(Inconsistencia::SumaNoCuadra {
            factura: v.factura,
            suma: suma as f64 / 100.0,
            diferencia: (factura - suma) as f64 / 100.0,
        });
    }

    // El estado esperado se calcula sobre el pendiente correcto, no el guardado.
    let corregidos = ValoresPago::recalculados(v.factura, v.pagado, v.retenido);
    if let Ok(esperado) = derivar_estado_pago(&corregidos) {
        if estado_guardado != esperado.as_str() {
            hallazgos.push(Inconsistencia::EstadoIncorrecto {
                guardado: estado_guardado.to_string(),
                esperado: esperado.as_str().to_string(),
            });
        }
    }

    hallazgos
}

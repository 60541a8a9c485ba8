//! helpers/formato.rs
//! Formato de montos, fechas y etiquetas de estado para las respuestas de los dashboards.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

use crate::models::documento_model::EstadoDocumento;
use crate::validation::pagos::{a_centavos, EstadoPago};

/// Hora de Ecuador continental (UTC-5, sin horario de verano).
const OFFSET_LOCAL_SEGS: i32 = -5 * 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub texto: &'static str,
    pub color: &'static str,
}

fn hora_local(fecha: &DateTime<Utc>) -> NaiveDateTime {
    match FixedOffset::east_opt(OFFSET_LOCAL_SEGS) {
        Some(zona) => fecha.with_timezone(&zona).naive_local(),
        None => fecha.naive_utc(),
    }
}

/// Medianoche local del día de `ahora`, expresada en UTC ("hoy" en los dashboards).
pub fn inicio_del_dia_local(ahora: &DateTime<Utc>) -> DateTime<Utc> {
    medianoche_local(hora_local(ahora).date())
}

/// Medianoche local de una fecha calendario, expresada en UTC.
pub fn medianoche_local(fecha: NaiveDate) -> DateTime<Utc> {
    let utc = fecha.and_time(NaiveTime::MIN) - chrono::Duration::seconds(OFFSET_LOCAL_SEGS as i64);
    DateTime::from_naive_utc_and_offset(utc, Utc)
}

/// `1234.5` -> `"$1,234.50"`, `-3.2` -> `"-$3.20"`
pub fn formatear_moneda(valor: f64) -> String {
    let centavos = a_centavos(valor);
    let signo = if centavos < 0 { "-" } else { "" };
    let abs = centavos.unsigned_abs();
    let entero = (abs / 100).to_string();
    let decimales = abs % 100;

    let mut agrupado = String::with_capacity(entero.len() + entero.len() / 3);
    for (i, c) in entero.chars().enumerate() {
        if i > 0 && (entero.len() - i) % 3 == 0 {
            agrupado.push(',');
        }
        agrupado.push(c);
    }

    format!("{}${}.{:02}", signo, agrupado, decimales)
}

pub fn formatear_fecha(fecha: &DateTime<Utc>) -> String {
    hora_local(fecha).format("%d/%m/%Y").to_string()
}

pub fn formatear_fecha_hora(fecha: &DateTime<Utc>) -> String {
    hora_local(fecha).format("%d/%m/%Y %H:%M").to_string()
}

/// Días calendario (hora local) entre dos instantes, nunca negativo.
pub fn dias_transcurridos(desde: &DateTime<Utc>, hasta: &DateTime<Utc>) -> i64 {
    (hora_local(hasta).date() - hora_local(desde).date())
        .num_days()
        .max(0)
}

pub fn tiempo_transcurrido(desde: &DateTime<Utc>, hasta: &DateTime<Utc>) -> String {
    match dias_transcurridos(desde, hasta) {
        0 => "hoy".to_string(),
        1 => "hace 1 día".to_string(),
        n => format!("hace {} días", n),
    }
}

pub fn badge_estado_documento(estado: EstadoDocumento) -> Badge {
    match estado {
        EstadoDocumento::EnProceso => Badge {
            texto: "En proceso",
            color: "warning",
        },
        EstadoDocumento::Listo => Badge {
            texto: "Listo para entrega",
            color: "info",
        },
        EstadoDocumento::Entregado => Badge {
            texto: "Entregado",
            color: "success",
        },
        EstadoDocumento::Cancelado => Badge {
            texto: "Cancelado",
            color: "secondary",
        },
    }
}

pub fn badge_estado_pago(estado: EstadoPago) -> Badge {
    match estado {
        EstadoPago::Pendiente => Badge {
            texto: "Pendiente",
            color: "danger",
        },
        EstadoPago::PagoParcial => Badge {
            texto: "Pago parcial",
            color: "warning",
        },
        EstadoPago::Pagado => Badge {
            texto: "Pagado",
            color: "success",
        },
        EstadoPago::PagadoConRetencion => Badge {
            texto: "Pagado con retención",
            color: "success",
        },
    }
}

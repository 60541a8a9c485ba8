//! helpers/codigo.rs
//! Generación de códigos: verificación de entrega y código de barras interno.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Código de 4 dígitos que el cliente presenta al retirar su documento.
pub fn generar_codigo_verificacion() -> String {
    let n: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{:04}", n)
}

/// Código interno cuando el documento no trae uno de la matriz,
/// p.e. `N20250314-7F3A9C`.
pub fn generar_codigo_barras(ahora: &DateTime<Utc>) -> String {
    let sufijo = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "N{}-{}",
        ahora.format("%Y%m%d"),
        sufijo[..6].to_uppercase()
    )
}

/// Comparación del código ingresado en recepción: ignora espacios alrededor.
pub fn codigo_coincide(esperado: &str, ingresado: &str) -> bool {
    let ingresado = ingresado.trim();
    !esperado.is_empty() && esperado == ingresado
}

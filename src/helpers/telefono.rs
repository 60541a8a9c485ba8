//! helpers/telefono.rs
//! Normalización de números celulares ecuatorianos a formato E.164 (+593...).

/// Acepta `0987654321`, `987654321`, `593987654321`, `+593 98 765 4321`,
/// `(098) 765-4321`. Devuelve `None` si no es un celular válido.
pub fn normalizar_telefono_ecuador(entrada: &str) -> Option<String> {
    let limpio: String = entrada
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();

    let digitos = limpio.strip_prefix('+').unwrap_or(&limpio);
    if digitos.is_empty() || !digitos.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let nacional = if let Some(resto) = digitos.strip_prefix("593") {
        resto.trim_start_matches('0')
    } else if let Some(resto) = digitos.strip_prefix('0') {
        resto
    } else {
        digitos
    };

    // Celulares: 9 dígitos empezando con 9
    if nacional.len() == 9 && nacional.starts_with('9') {
        Some(format!("+593{}", nacional))
    } else {
        None
    }
}

//! tests/helpers_tests.rs
//! Formato, teléfonos y códigos.

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::helpers::codigo::{codigo_coincide, generar_codigo_barras, generar_codigo_verificacion};
    use crate::helpers::formato::{
        badge_estado_documento, badge_estado_pago, formatear_fecha, formatear_fecha_hora,
        formatear_moneda, inicio_del_dia_local, tiempo_transcurrido,
    };
    use crate::helpers::telefono::normalizar_telefono_ecuador;
    use crate::models::documento_model::EstadoDocumento;
    use crate::validation::pagos::EstadoPago;

    #[test]
    fn formatea_moneda_con_miles() {
        assert_eq!(formatear_moneda(0.0), "$0.00");
        assert_eq!(formatear_moneda(1234.5), "$1,234.50");
        assert_eq!(formatear_moneda(1_234_567.891), "$1,234,567.89");
        assert_eq!(formatear_moneda(999.999), "$1,000.00");
        assert_eq!(formatear_moneda(-3.2), "-$3.20");
    }

    #[test]
    fn fechas_en_hora_de_ecuador() {
        // 03:00 UTC es todavía el día anterior en Ecuador
        let fecha = Utc.with_ymd_and_hms(2024, 3, 15, 3, 0, 0).unwrap();
        assert_eq!(formatear_fecha(&fecha), "14/03/2024");
        assert_eq!(formatear_fecha_hora(&fecha), "14/03/2024 22:00");
    }

    #[test]
    fn inicio_del_dia_es_medianoche_local() {
        let fecha = Utc.with_ymd_and_hms(2024, 3, 15, 3, 0, 0).unwrap();
        assert_eq!(
            inicio_del_dia_local(&fecha),
            Utc.with_ymd_and_hms(2024, 3, 14, 5, 0, 0).unwrap()
        );
        let tarde = Utc.with_ymd_and_hms(2024, 3, 15, 20, 30, 0).unwrap();
        assert_eq!(
            inicio_del_dia_local(&tarde),
            Utc.with_ymd_and_hms(2024, 3, 15, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn tiempo_transcurrido_en_dias() {
        let desde = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(tiempo_transcurrido(&desde, &desde), "hoy");
        let un_dia = Utc.with_ymd_and_hms(2024, 3, 2, 11, 0, 0).unwrap();
        assert_eq!(tiempo_transcurrido(&desde, &un_dia), "hace 1 día");
        let diez = Utc.with_ymd_and_hms(2024, 3, 11, 10, 0, 0).unwrap();
        assert_eq!(tiempo_transcurrido(&desde, &diez), "hace 10 días");
        // Fechas invertidas no dan negativos
        assert_eq!(tiempo_transcurrido(&diez, &desde), "hoy");
    }

    #[test]
    fn badges_por_estado() {
        assert_eq!(badge_estado_documento(EstadoDocumento::Listo).color, "info");
        assert_eq!(
            badge_estado_documento(EstadoDocumento::Cancelado).texto,
            "Cancelado"
        );
        assert_eq!(badge_estado_pago(EstadoPago::Pendiente).color, "danger");
        assert_eq!(
            badge_estado_pago(EstadoPago::PagadoConRetencion).texto,
            "Pagado con retención"
        );
    }

    #[test]
    fn normaliza_celulares_ecuatorianos() {
        for entrada in [
            "0987654321",
            "987654321",
            "593987654321",
            "+593987654321",
            "+593 98 765 4321",
            "(098) 765-4321",
            "098.765.4321",
            "5930987654321",
        ] {
            assert_eq!(
                normalizar_telefono_ecuador(entrada).as_deref(),
                Some("+593987654321"),
                "entrada {}",
                entrada
            );
        }
    }

    #[test]
    fn rechaza_telefonos_invalidos() {
        for entrada in ["", "022345678", "09876", "+1 555 123 4567", "09876543a1", "++593987654321"] {
            assert_eq!(normalizar_telefono_ecuador(entrada), None, "entrada {}", entrada);
        }
    }

    #[test]
    fn codigo_de_verificacion_tiene_cuatro_digitos() {
        for _ in 0..50 {
            let codigo = generar_codigo_verificacion();
            assert_eq!(codigo.len(), 4);
            assert!(codigo.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn codigo_de_barras_lleva_la_fecha() {
        let fecha = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        let codigo = generar_codigo_barras(&fecha);
        assert!(codigo.starts_with("N20250314-"), "{}", codigo);
        assert_eq!(codigo.len(), "N20250314-".len() + 6);
        assert_ne!(codigo, generar_codigo_barras(&fecha));
    }

    #[test]
    fn compara_codigo_ignorando_espacios() {
        assert!(codigo_coincide("0427", " 0427 "));
        assert!(!codigo_coincide("0427", "427"));
        assert!(!codigo_coincide("", ""));
    }
}

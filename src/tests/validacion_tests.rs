//! tests/validacion_tests.rs
//! Reglas de montos y estado de pago.

#[cfg(test)]
mod tests {
    use crate::validation::pagos::{
        aplicar_pago, aplicar_retencion, calcular_pendiente, derivar_estado_pago,
        validar_valores, verificar_consistencia, EstadoPago, Inconsistencia, ValidacionPagoError,
        ValoresPago,
    };

    fn valores(factura: f64, pagado: f64, pendiente: f64, retenido: f64) -> ValoresPago {
        ValoresPago {
            factura,
            pagado,
            pendiente,
            retenido,
        }
    }

    #[test]
    fn documento_nuevo_queda_pendiente() {
        let v = ValoresPago::iniciales(150.0);
        assert_eq!(v, valores(150.0, 0.0, 150.0, 0.0));
        assert_eq!(derivar_estado_pago(&v), Ok(EstadoPago::Pendiente));
    }

    #[test]
    fn factura_debe_ser_positiva() {
        assert_eq!(
            validar_valores(&ValoresPago::iniciales(0.0)),
            Err(ValidacionPagoError::FacturaNoPositiva)
        );
        assert_eq!(
            validar_valores(&ValoresPago::iniciales(-10.0)),
            Err(ValidacionPagoError::FacturaNoPositiva)
        );
    }

    #[test]
    fn rechaza_montos_no_numericos_y_negativos() {
        assert_eq!(
            validar_valores(&valores(100.0, f64::NAN, 100.0, 0.0)),
            Err(ValidacionPagoError::NoNumerico {
                campo: "valor_pagado"
            })
        );
        assert!(matches!(
            validar_valores(&valores(100.0, 0.0, 110.0, -10.0)),
            Err(ValidacionPagoError::Negativo {
                campo: "valor_retenido",
                ..
            })
        ));
    }

    #[test]
    fn suma_tolera_dos_centavos() {
        assert!(validar_valores(&valores(100.0, 50.0, 49.98, 0.0)).is_ok());
        assert!(validar_valores(&valores(100.0, 50.0, 50.02, 0.0)).is_ok());
        assert!(matches!(
            validar_valores(&valores(100.0, 50.0, 49.97, 0.0)),
            Err(ValidacionPagoError::SumaNoCuadra { .. })
        ));
    }

    #[test]
    fn pagado_mas_retenido_no_excede_factura() {
        assert!(matches!(
            validar_valores(&valores(100.0, 90.0, 0.0, 20.0)),
            Err(ValidacionPagoError::ExcedeFactura { .. })
        ));
    }

    #[test]
    fn deriva_cada_estado_de_pago() {
        assert_eq!(
            derivar_estado_pago(&valores(100.0, 40.0, 60.0, 0.0)),
            Ok(EstadoPago::PagoParcial)
        );
        assert_eq!(
            derivar_estado_pago(&valores(100.0, 100.0, 0.0, 0.0)),
            Ok(EstadoPago::Pagado)
        );
        assert_eq!(
            derivar_estado_pago(&valores(100.0, 98.0, 0.0, 2.0)),
            Ok(EstadoPago::PagadoConRetencion)
        );
        // Un saldo dentro de la tolerancia cuenta como pagado
        assert_eq!(
            derivar_estado_pago(&valores(100.0, 99.99, 0.01, 0.0)),
            Ok(EstadoPago::Pagado)
        );
    }

    #[test]
    fn factura_minima_sin_abonos_sigue_pendiente() {
        assert_eq!(
            derivar_estado_pago(&ValoresPago::iniciales(0.02)),
            Ok(EstadoPago::Pendiente)
        );
    }

    #[test]
    fn pendiente_nunca_es_negativo() {
        assert_eq!(calcular_pendiente(100.0, 100.01, 0.0), 0.0);
        assert_eq!(calcular_pendiente(100.0, 33.33, 10.0), 56.67);
    }

    #[test]
    fn aplicar_pago_recalcula_pendiente() {
        let v = ValoresPago::iniciales(100.0);
        let nuevos = aplicar_pago(&v, 30.1).unwrap();
        assert_eq!(nuevos, valores(100.0, 30.1, 69.9, 0.0));

        let nuevos = aplicar_retencion(&nuevos, 9.9).unwrap();
        assert_eq!(nuevos, valores(100.0, 30.1, 60.0, 9.9));
    }

    #[test]
    fn aplicar_pago_valida_el_monto() {
        let v = ValoresPago::iniciales(100.0);
        assert_eq!(aplicar_pago(&v, 0.0), Err(ValidacionPagoError::MontoNoPositivo));
        assert_eq!(
            aplicar_pago(&v, f64::INFINITY),
            Err(ValidacionPagoError::NoNumerico { campo: "monto" })
        );
        assert!(matches!(
            aplicar_retencion(&v, 100.03),
            Err(ValidacionPagoError::MontoExcedePendiente { .. })
        ));
        // Dentro de la tolerancia se acepta y el pendiente queda en 0
        let nuevos = aplicar_pago(&v, 100.02).unwrap();
        assert_eq!(nuevos.pendiente, 0.0);
    }

    #[test]
    fn montos_enormes_se_rechazan_sin_desbordar() {
        for enorme in [1e17, 1e300] {
            assert!(matches!(
                validar_valores(&ValoresPago::iniciales(enorme)),
                Err(ValidacionPagoError::FueraDeRango { campo: "valor_factura", .. })
            ));
            assert!(matches!(
                validar_valores(&valores(100.0, enorme, 0.0, 0.0)),
                Err(ValidacionPagoError::FueraDeRango { campo: "valor_pagado", .. })
            ));
            assert!(matches!(
                aplicar_pago(&ValoresPago::iniciales(100.0), enorme),
                Err(ValidacionPagoError::FueraDeRango { campo: "monto", .. })
            ));
            assert!(matches!(
                aplicar_retencion(&ValoresPago::iniciales(100.0), -enorme),
                Err(ValidacionPagoError::FueraDeRango { campo: "monto", .. })
            ));
            assert_eq!(
                verificar_consistencia(&valores(enorme, 0.0, enorme, 0.0), "PENDIENTE"),
                vec![Inconsistencia::FacturaInvalida]
            );
            assert_eq!(
                verificar_consistencia(&valores(100.0, enorme, 0.0, 0.0), "PAGADO"),
                vec![Inconsistencia::MontoFueraDeRango {
                    campo: "valor_pagado".to_string(),
                    valor: enorme,
                }]
            );
        }
        assert_eq!(calcular_pendiente(1e300, 0.0, 0.0), i64::MAX as f64 / 100.0);
        // El tope sigue admitiendo montos reales grandes
        assert!(validar_valores(&ValoresPago::iniciales(999_999_999.99)).is_ok());
    }

    #[test]
    fn documento_saldado_no_admite_mas_pagos() {
        let pagado = aplicar_pago(&ValoresPago::iniciales(100.0), 100.0).unwrap();
        assert_eq!(pagado.pendiente, 0.0);
        assert_eq!(aplicar_pago(&pagado, 0.01), Err(ValidacionPagoError::SinSaldoPendiente));
        assert_eq!(
            aplicar_retencion(&pagado, 0.02),
            Err(ValidacionPagoError::SinSaldoPendiente)
        );
        // Con saldo, la tolerancia de 2 centavos sigue aplicando
        let parcial = aplicar_pago(&ValoresPago::iniciales(100.0), 99.99).unwrap();
        assert_eq!(aplicar_pago(&parcial, 0.02).unwrap().pendiente, 0.0);
    }

    #[test]
    fn consistencia_detecta_estado_incorrecto() {
        let hallazgos = verificar_consistencia(&valores(100.0, 100.0, 0.0, 0.0), "PENDIENTE");
        assert_eq!(
            hallazgos,
            vec![Inconsistencia::EstadoIncorrecto {
                guardado: "PENDIENTE".to_string(),
                esperado: "PAGADO".to_string(),
            }]
        );
        assert!(hallazgos.iter().all(Inconsistencia::es_corregible));
    }

    #[test]
    fn consistencia_detecta_suma_que_no_cuadra() {
        let hallazgos = verificar_consistencia(&valores(100.0, 40.0, 10.0, 0.0), "PAGO_PARCIAL");
        assert_eq!(hallazgos.len(), 1);
        match &hallazgos[0] {
            Inconsistencia::SumaNoCuadra { diferencia, .. } => assert_eq!(*diferencia, 50.0),
            otro => panic!("inesperado: {:?}", otro),
        }
    }

    #[test]
    fn sobrepago_no_es_corregible() {
        let hallazgos = verificar_consistencia(&valores(100.0, 120.0, 0.0, 0.0), "PAGADO");
        assert_eq!(hallazgos, vec![Inconsistencia::Sobrepago { excedente: 20.0 }]);
        assert!(!hallazgos[0].es_corregible());
    }

    #[test]
    fn documento_correcto_no_tiene_hallazgos() {
        assert!(verificar_consistencia(&valores(80.0, 50.0, 25.0, 5.0), "PAGO_PARCIAL").is_empty());
    }
}

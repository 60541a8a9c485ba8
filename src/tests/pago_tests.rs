//! tests/pago_tests.rs
//! Caja: abonos, retenciones y reconciliación.

#[cfg(test)]
mod tests {
    use actix_rt::test;

    use crate::errors::AppError;
    use crate::models::documento_model::CancelarDocumentoRequest;
    use crate::models::evento_model::TipoEvento;
    use crate::models::pago_model::RegistrarRetencionRequest;
    use crate::tests::{
        config_prueba, crear_documento, error_app, pago, servicios_con_pool, servicios_prueba,
    };
    use crate::validation::pagos::{verificar_consistencia, EstadoPago};

    fn retencion(monto: f64, comprobante: &str) -> RegistrarRetencionRequest {
        RegistrarRetencionRequest {
            monto,
            numero_comprobante: comprobante.to_string(),
        }
    }

    #[test]
    async fn abonos_parciales_hasta_saldar() {
        let servicios = servicios_prueba(config_prueba()).await;
        let doc = crear_documento(&servicios, None, 100.0).await;

        let resultado = servicios
            .pago_service
            .registrar_pago(&doc.id, pago(35.5), Some("caja-1"))
            .await
            .unwrap();
        assert_eq!(resultado.estado_pago_anterior, EstadoPago::Pendiente);
        assert_eq!(resultado.documento.estado_pago, EstadoPago::PagoParcial);
        assert_eq!(resultado.documento.valor_pagado, 35.5);
        assert_eq!(resultado.documento.valor_pendiente, 64.5);
        assert_eq!(resultado.documento.metodo_pago.as_deref(), Some("EFECTIVO"));

        let resultado = servicios
            .pago_service
            .registrar_pago(&doc.id, pago(64.5), None)
            .await
            .unwrap();
        assert_eq!(resultado.estado_pago_anterior, EstadoPago::PagoParcial);
        assert_eq!(resultado.documento.estado_pago, EstadoPago::Pagado);
        assert_eq!(resultado.documento.valor_pendiente, 0.0);

        let pagos = servicios
            .evento_service
            .listar_por_documento(&doc.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|e| e.tipo == TipoEvento::Pago)
            .count();
        assert_eq!(pagos, 2);
    }

    #[test]
    async fn abono_mayor_al_saldo_se_rechaza() {
        let servicios = servicios_prueba(config_prueba()).await;
        let doc = crear_documento(&servicios, None, 50.0).await;

        let err = servicios
            .pago_service
            .registrar_pago(&doc.id, pago(50.1), None)
            .await
            .unwrap_err();
        assert!(matches!(error_app(err), AppError::Validacion(_)));

        let err = servicios
            .pago_service
            .registrar_pago(&doc.id, pago(-5.0), None)
            .await
            .unwrap_err();
        assert!(matches!(error_app(err), AppError::Validacion(_)));

        // Nada cambió
        let doc = servicios.documento_service.obtener(&doc.id).await.unwrap();
        assert_eq!(doc.valor_pendiente, 50.0);
        assert_eq!(doc.estado_pago, EstadoPago::Pendiente);
    }

    #[test]
    async fn retencion_y_pago_dejan_pagado_con_retencion() {
        let servicios = servicios_prueba(config_prueba()).await;
        let doc = crear_documento(&servicios, None, 112.0).await;

        let err = servicios
            .pago_service
            .registrar_retencion(&doc.id, retencion(10.0, "  "), None)
            .await
            .unwrap_err();
        assert!(matches!(error_app(err), AppError::Validacion(_)));

        let resultado = servicios
            .pago_service
            .registrar_retencion(&doc.id, retencion(11.2, "001-002-0000456"), None)
            .await
            .unwrap();
        assert_eq!(resultado.documento.valor_retenido, 11.2);
        assert_eq!(resultado.documento.estado_pago, EstadoPago::PagoParcial);

        let resultado = servicios
            .pago_service
            .registrar_pago(&doc.id, pago(100.8), None)
            .await
            .unwrap();
        let doc = resultado.documento;
        assert_eq!(doc.estado_pago, EstadoPago::PagadoConRetencion);
        assert!(verificar_consistencia(&doc.valores(), doc.estado_pago.as_str()).is_empty());

        let eventos = servicios
            .evento_service
            .listar_por_documento(&doc.id)
            .await
            .unwrap();
        let evento = eventos
            .iter()
            .find(|e| e.tipo == TipoEvento::Retencion)
            .unwrap();
        let metadata = evento.metadata.as_ref().unwrap();
        assert_eq!(metadata["numero_comprobante"], "001-002-0000456");
    }

    #[test]
    async fn documento_cancelado_no_recibe_pagos() {
        let servicios = servicios_prueba(config_prueba()).await;
        let doc = crear_documento(&servicios, None, 20.0).await;
        servicios
            .documento_service
            .cancelar(
                &doc.id,
                CancelarDocumentoRequest {
                    motivo: "Duplicado".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        let err = servicios
            .pago_service
            .registrar_pago(&doc.id, pago(5.0), None)
            .await
            .unwrap_err();
        assert!(matches!(error_app(err), AppError::Conflicto(_)));
    }

    #[test]
    async fn pendientes_de_pago_excluye_saldados_y_cancelados() {
        let servicios = servicios_prueba(config_prueba()).await;
        let con_saldo = crear_documento(&servicios, None, 30.0).await;
        let pagado = crear_documento(&servicios, None, 40.0).await;
        servicios
            .pago_service
            .registrar_pago(&pagado.id, pago(40.0), None)
            .await
            .unwrap();
        let cancelado = crear_documento(&servicios, None, 50.0).await;
        servicios
            .documento_service
            .cancelar(
                &cancelado.id,
                CancelarDocumentoRequest {
                    motivo: "Error de ingreso".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        let lista = servicios
            .pago_service
            .pendientes_de_pago(None, None)
            .await
            .unwrap();
        assert_eq!(lista.total, 1);
        assert_eq!(lista.items[0].id, con_saldo.id);
    }

    #[test]
    async fn reconciliacion_corrige_lo_recuperable() {
        let (pool, servicios) = servicios_con_pool(config_prueba()).await;
        let estado_malo = crear_documento(&servicios, None, 100.0).await;
        let suma_mala = crear_documento(&servicios, None, 80.0).await;
        let sobrepagado = crear_documento(&servicios, None, 60.0).await;
        let sano = crear_documento(&servicios, None, 10.0).await;

        // Datos dañados fuera de la app (importaciones, ediciones manuales)
        for (id, sql) in [
            (
                &estado_malo.id,
                "UPDATE documentos SET valor_pagado = 100, valor_pendiente = 0 WHERE id = ?1",
            ),
            (
                &suma_mala.id,
                "UPDATE documentos SET valor_pagado = 30, valor_pendiente = 80, \
                 estado_pago = 'PAGO_PARCIAL' WHERE id = ?1",
            ),
            (
                &sobrepagado.id,
                "UPDATE documentos SET valor_pagado = 75, valor_pendiente = 0, \
                 estado_pago = 'PAGADO' WHERE id = ?1",
            ),
        ] {
            sqlx::query(sql).bind(id).execute(&pool).await.unwrap();
        }

        let reporte = servicios.pago_service.reconciliar().await.unwrap();
        assert_eq!(reporte.documentos_revisados, 4);
        assert_eq!(reporte.documentos_inconsistentes, 3);
        assert!(reporte.items.iter().all(|i| i.documento_id != sano.id));

        let resultado = servicios
            .pago_service
            .corregir_inconsistencias(Some("admin"))
            .await
            .unwrap();
        let mut corregidos = resultado.corregidos.clone();
        corregidos.sort();
        let mut esperados = vec![estado_malo.id.clone(), suma_mala.id.clone()];
        esperados.sort();
        assert_eq!(corregidos, esperados);
        assert_eq!(resultado.requieren_revision, vec![sobrepagado.id.clone()]);

        let doc = servicios
            .documento_service
            .obtener(&estado_malo.id)
            .await
            .unwrap();
        assert_eq!(doc.estado_pago, EstadoPago::Pagado);
        let doc = servicios
            .documento_service
            .obtener(&suma_mala.id)
            .await
            .unwrap();
        assert_eq!(doc.valor_pendiente, 50.0);
        assert_eq!(doc.estado_pago, EstadoPago::PagoParcial);

        let reporte = servicios.pago_service.reconciliar().await.unwrap();
        assert_eq!(reporte.documentos_inconsistentes, 1);

        let correccion = servicios
            .evento_service
            .listar_por_documento(&suma_mala.id)
            .await
            .unwrap()
            .into_iter()
            .find(|e| e.tipo == TipoEvento::Correccion)
            .unwrap();
        assert_eq!(correccion.usuario_id.as_deref(), Some("admin"));
    }

    #[test]
    async fn documento_saldado_rechaza_abonos_de_centavos() {
        let servicios = servicios_prueba(config_prueba()).await;
        let doc = crear_documento(&servicios, None, 100.0).await;
        servicios
            .pago_service
            .registrar_pago(&doc.id, pago(100.0), None)
            .await
            .unwrap();

        let err = servicios
            .pago_service
            .registrar_pago(&doc.id, pago(0.01), None)
            .await
            .unwrap_err();
        assert!(matches!(error_app(err), AppError::Validacion(_)));
        let err = servicios
            .pago_service
            .registrar_retencion(&doc.id, retencion(0.02, "001-001-000000123"), None)
            .await
            .unwrap_err();
        assert!(matches!(error_app(err), AppError::Validacion(_)));

        let pagos = servicios
            .evento_service
            .listar_por_documento(&doc.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|e| matches!(e.tipo, TipoEvento::Pago | TipoEvento::Retencion))
            .count();
        assert_eq!(pagos, 1);
    }

    #[test]
    async fn pendientes_con_pagina_enorme() {
        let servicios = servicios_prueba(config_prueba()).await;
        crear_documento(&servicios, None, 10.0).await;

        let pagina = servicios
            .pago_service
            .pendientes_de_pago(Some(u64::MAX / 10), None)
            .await
            .unwrap();
        assert_eq!(pagina.total, 1);
        assert!(pagina.items.is_empty());
    }
}

//! tests/dashboard_tests.rs

#[cfg(test)]
mod tests {
    use actix_rt::test;

    use crate::models::documento_model::{CancelarDocumentoRequest, EntregarDocumentoRequest};
    use crate::models::matrizador_model::Rol;
    use crate::tests::{
        config_prueba, crear_documento, crear_usuario, documento_entregable, pago,
        servicios_prueba,
    };

    #[test]
    async fn dashboards_por_rol() {
        let servicios = servicios_prueba(config_prueba()).await;
        let ana = crear_usuario(&servicios, "Ana Torres", Rol::Matrizador).await;

        let en_proceso = crear_documento(&servicios, Some(&ana.id), 100.0).await;
        servicios
            .pago_service
            .registrar_pago(&en_proceso.id, pago(40.0), None)
            .await
            .unwrap();

        let listo_con_saldo = crear_documento(&servicios, Some(&ana.id), 50.0).await;
        servicios
            .documento_service
            .marcar_listo(&listo_con_saldo.id, None)
            .await
            .unwrap();

        let entregado = documento_entregable(&servicios, 30.0).await;
        servicios
            .documento_service
            .entregar(
                &entregado.id,
                EntregarDocumentoRequest {
                    codigo_verificacion: entregado.codigo_verificacion.clone(),
                    entregado_a: "Titular".to_string(),
                    sin_codigo_justificacion: None,
                    incluir_relacionados: false,
                },
                None,
            )
            .await
            .unwrap();

        let cancelado = crear_documento(&servicios, None, 1000.0).await;
        servicios
            .documento_service
            .cancelar(
                &cancelado.id,
                CancelarDocumentoRequest {
                    motivo: "Duplicado".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        // admin
        let admin = servicios.dashboard_service.admin().await.unwrap();
        assert_eq!(admin.total_documentos, 4);
        assert_eq!(admin.por_estado.get("EN_PROCESO"), Some(&1));
        assert_eq!(admin.por_estado.get("LISTO"), Some(&1));
        assert_eq!(admin.por_estado.get("ENTREGADO"), Some(&1));
        assert_eq!(admin.por_estado.get("CANCELADO"), Some(&1));
        assert_eq!(admin.por_estado_pago.get("PAGADO"), Some(&1));
        // Los cancelados no cuentan en los montos
        assert_eq!(admin.montos.facturado, 180.0);
        assert_eq!(admin.montos.pagado, 70.0);
        assert_eq!(admin.montos.pendiente, 110.0);
        assert_eq!(admin.montos.facturado_fmt, "$180.00");
        assert_eq!(admin.notificaciones_fallidas, 0);
        let de_ana = admin
            .por_matrizador
            .iter()
            .find(|m| m.matrizador_id.as_deref() == Some(ana.id.as_str()))
            .unwrap();
        assert_eq!(de_ana.nombre.as_deref(), Some("Ana Torres"));
        assert_eq!(de_ana.total, 2);
        assert_eq!(de_ana.en_proceso, 1);
        assert_eq!(de_ana.listos, 1);

        // caja
        let caja = servicios.dashboard_service.caja().await.unwrap();
        assert_eq!(caja.documentos_con_saldo, 2);
        assert_eq!(caja.pendientes.len(), 2);
        assert_eq!(caja.pendientes[0].documento.id, en_proceso.id);
        assert_eq!(caja.pendientes[0].valor_pendiente_fmt, "$60.00");
        assert_eq!(caja.pendientes[0].badge_pago.texto, "Pago parcial");
        // abono de en_proceso y pago completo de entregado
        assert_eq!(caja.pagos_hoy, 2);

        // matrizador
        let panel = servicios.dashboard_service.matrizador(&ana.id).await.unwrap();
        assert_eq!(panel.por_estado.values().sum::<i64>(), 2);
        assert_eq!(panel.recientes.len(), 2);

        // recepción
        let recepcion = servicios.dashboard_service.recepcion().await.unwrap();
        assert_eq!(recepcion.listos_para_entrega.len(), 1);
        assert_eq!(recepcion.listos_para_entrega[0].documento.id, listo_con_saldo.id);
        assert_eq!(recepcion.listos_para_entrega[0].antiguedad, "hoy");
        assert_eq!(recepcion.listos_con_saldo, 1);
        assert_eq!(recepcion.entregados_hoy, 1);

        // archivo
        let archivo = servicios
            .dashboard_service
            .archivo(Some(1), Some(10))
            .await
            .unwrap();
        assert_eq!(archivo.total_entregados, 1);
        assert_eq!(archivo.cancelados, 1);
        assert_eq!(archivo.entregados[0].documento.id, entregado.id);
        assert_eq!(archivo.entregados[0].badge_estado.texto, "Entregado");
    }

    #[test]
    async fn dashboards_vacios() {
        let servicios = servicios_prueba(config_prueba()).await;
        let admin = servicios.dashboard_service.admin().await.unwrap();
        assert_eq!(admin.total_documentos, 0);
        assert_eq!(admin.montos.pendiente_fmt, "$0.00");
        assert!(admin.por_matrizador.is_empty());

        let archivo = servicios.dashboard_service.archivo(None, None).await.unwrap();
        assert_eq!(archivo.page, 1);
        assert_eq!(archivo.page_size, 20);
        assert!(archivo.entregados.is_empty());
    }

    #[test]
    async fn archivo_con_pagina_enorme() {
        let servicios = servicios_prueba(config_prueba()).await;
        documento_entregable(&servicios, 30.0).await;

        let archivo = servicios
            .dashboard_service
            .archivo(Some(u64::MAX / 10), None)
            .await
            .unwrap();
        assert_eq!(archivo.page, u64::MAX / 10);
        assert!(archivo.entregados.is_empty());
    }
}

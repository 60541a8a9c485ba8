//! tests/handler_tests.rs
//! Endpoints HTTP: autenticación por cabecera, permisos por rol y respuestas.

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::app::{init_app, Servicios};
    use crate::handlers::auth::CABECERA_USUARIO;
    use crate::models::matrizador_model::Rol;
    use crate::tests::{config_prueba, crear_documento, crear_usuario, servicios_prueba};

    macro_rules! app_de_prueba {
        ($servicios:expr) => {{
            let servicios: Servicios = $servicios.clone();
            test::init_service(
                App::new()
                    .configure(move |cfg| servicios.registrar(cfg))
                    .configure(init_app),
            )
            .await
        }};
    }

    #[actix_rt::test]
    async fn health_no_requiere_usuario() {
        let servicios = servicios_prueba(config_prueba()).await;
        let app = app_de_prueba!(servicios);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }

    #[actix_rt::test]
    async fn sin_cabecera_o_usuario_desconocido_es_401() {
        let servicios = servicios_prueba(config_prueba()).await;
        let app = app_de_prueba!(servicios);

        let req = test::TestRequest::get().uri("/api/documentos").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/documentos")
            .insert_header((CABECERA_USUARIO, "fantasma"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_rt::test]
    async fn usuario_desactivado_es_403() {
        let servicios = servicios_prueba(config_prueba()).await;
        let cajera = crear_usuario(&servicios, "Caja Dos", Rol::Caja).await;
        servicios
            .matrizador_service
            .desactivar(&cajera.id)
            .await
            .unwrap();
        let app = app_de_prueba!(servicios);

        let req = test::TestRequest::get()
            .uri("/api/documentos")
            .insert_header((CABECERA_USUARIO, cajera.id.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn recepcion_ingresa_y_caja_cobra() {
        let servicios = servicios_prueba(config_prueba()).await;
        let recepcion = crear_usuario(&servicios, "Recepcion Uno", Rol::Recepcion).await;
        let caja = crear_usuario(&servicios, "Caja Uno", Rol::Caja).await;
        let app = app_de_prueba!(servicios);

        let req = test::TestRequest::post()
            .uri("/api/documentos")
            .insert_header((CABECERA_USUARIO, recepcion.id.as_str()))
            .set_json(json!({
                "tipo_documento": "DILIGENCIA",
                "nombre_cliente": "Pedro Salas",
                "valor_factura": 45.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let doc: Value = test::read_body_json(resp).await;
        assert_eq!(doc["estado"], "EN_PROCESO");
        assert_eq!(doc["estado_pago"], "PENDIENTE");
        // El código de verificación nunca se expone
        assert!(doc.get("codigo_verificacion").is_none());
        let id = doc["id"].as_str().unwrap().to_string();

        // Recepción no cobra
        let req = test::TestRequest::post()
            .uri(&format!("/api/caja/documentos/{}/pagos", id))
            .insert_header((CABECERA_USUARIO, recepcion.id.as_str()))
            .set_json(json!({ "monto": 45.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri(&format!("/api/caja/documentos/{}/pagos", id))
            .insert_header((CABECERA_USUARIO, caja.id.as_str()))
            .set_json(json!({ "monto": 50.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri(&format!("/api/caja/documentos/{}/pagos", id))
            .insert_header((CABECERA_USUARIO, caja.id.as_str()))
            .set_json(json!({ "monto": 45.0, "metodo_pago": "transferencia" }))
            .to_request();
        let resultado: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resultado["estado_pago_anterior"], "PENDIENTE");
        assert_eq!(resultado["documento"]["estado_pago"], "PAGADO");

        let req = test::TestRequest::get()
            .uri(&format!("/api/documentos/{}/eventos", id))
            .insert_header((CABECERA_USUARIO, caja.id.as_str()))
            .to_request();
        let eventos: Value = test::call_and_read_body_json(&app, req).await;
        let tipos: Vec<&str> = eventos
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["tipo"].as_str().unwrap())
            .collect();
        assert_eq!(tipos, vec!["CREACION", "PAGO"]);
        assert_eq!(eventos[0]["usuario_id"], recepcion.id.as_str());
    }

    #[actix_rt::test]
    async fn matrizador_solo_marca_listos_sus_documentos() {
        let servicios = servicios_prueba(config_prueba()).await;
        let ana = crear_usuario(&servicios, "Ana Torres", Rol::Matrizador).await;
        let luis = crear_usuario(&servicios, "Luis Mora", Rol::Matrizador).await;
        let doc = crear_documento(&servicios, Some(&ana.id), 20.0).await;
        let app = app_de_prueba!(servicios);

        let req = test::TestRequest::post()
            .uri(&format!("/api/documentos/{}/listo", doc.id))
            .insert_header((CABECERA_USUARIO, luis.id.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri(&format!("/api/documentos/{}/listo", doc.id))
            .insert_header((CABECERA_USUARIO, ana.id.as_str()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["estado"], "LISTO");

        let req = test::TestRequest::post()
            .uri(&format!("/api/documentos/{}/listo", doc.id))
            .insert_header((CABECERA_USUARIO, ana.id.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // Cancelar es solo de ADMIN
        let req = test::TestRequest::post()
            .uri(&format!("/api/documentos/{}/cancelar", doc.id))
            .insert_header((CABECERA_USUARIO, ana.id.as_str()))
            .set_json(json!({ "motivo": "prueba" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn dashboards_respetan_el_rol() {
        let servicios = servicios_prueba(config_prueba()).await;
        let admin = crear_usuario(&servicios, "Admin", Rol::Admin).await;
        let archivo = crear_usuario(&servicios, "Archivo Uno", Rol::Archivo).await;
        let app = app_de_prueba!(servicios);

        for (uri, usuario, esperado) in [
            ("/api/dashboard/admin", &admin, StatusCode::OK),
            ("/api/dashboard/admin", &archivo, StatusCode::FORBIDDEN),
            ("/api/dashboard/archivo", &archivo, StatusCode::OK),
            ("/api/dashboard/caja", &archivo, StatusCode::FORBIDDEN),
            ("/api/dashboard/recepcion", &admin, StatusCode::OK),
            ("/api/dashboard/matrizador", &admin, StatusCode::OK),
        ] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header((CABECERA_USUARIO, usuario.id.as_str()))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), esperado, "{} como {}", uri, usuario.rol);
        }
    }

    #[actix_rt::test]
    async fn admin_gestiona_personal_y_reconciliacion() {
        let servicios = servicios_prueba(config_prueba()).await;
        let admin = crear_usuario(&servicios, "Admin", Rol::Admin).await;
        let app = app_de_prueba!(servicios);

        let req = test::TestRequest::post()
            .uri("/api/matrizadores")
            .insert_header((CABECERA_USUARIO, admin.id.as_str()))
            .set_json(json!({
                "nombre": "Carla Vega",
                "email": "Carla.Vega@Notaria.ec",
                "rol": "MATRIZADOR",
                "telefono": "0991234567"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let carla: Value = test::read_body_json(resp).await;
        assert_eq!(carla["email"], "carla.vega@notaria.ec");
        assert_eq!(carla["telefono"], "+593991234567");

        // Email repetido
        let req = test::TestRequest::post()
            .uri("/api/matrizadores")
            .insert_header((CABECERA_USUARIO, admin.id.as_str()))
            .set_json(json!({
                "nombre": "Otra Carla",
                "email": "carla.vega@notaria.ec",
                "rol": "CAJA"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri(&format!("/api/matrizadores/{}/desactivar", admin.id))
            .insert_header((CABECERA_USUARIO, admin.id.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get()
            .uri("/api/matrizadores?rol=MATRIZADOR")
            .insert_header((CABECERA_USUARIO, admin.id.as_str()))
            .to_request();
        let lista: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(lista.as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri("/api/admin/reconciliacion")
            .insert_header((CABECERA_USUARIO, admin.id.as_str()))
            .to_request();
        let reporte: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(reporte["documentos_inconsistentes"], 0);
    }
}

//! tests/mod.rs
//! Pruebas de la app contra una base SQLite en memoria con las migraciones reales.

mod dashboard_tests;
mod handler_tests;
mod helpers_tests;
mod pago_tests;
mod validacion_tests;

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::app::Servicios;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::logger::init_test_logger;
use crate::models::documento_model::{CrearDocumentoRequest, Documento, TipoDocumento};
use crate::models::matrizador_model::{CrearMatrizadorRequest, Matrizador, Rol};
use crate::models::pago_model::RegistrarPagoRequest;

/// Una sola conexión que nunca se recicla: cada conexión a `:memory:` es otra base.
pub async fn crear_pool_prueba() -> Pool<Sqlite> {
    init_test_logger();
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("url de prueba")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("No se pudo abrir SQLite en memoria");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Fallo en migraciones de prueba");
    pool
}

pub fn config_prueba() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        notaria_nombre: "Notaría Primera".to_string(),
        notificaciones_simuladas: true,
        ..AppConfig::default()
    }
}

pub async fn servicios_prueba(config: AppConfig) -> Servicios {
    servicios_con_pool(config).await.1
}

/// Para las pruebas que necesitan tocar la base por fuera de los servicios.
pub async fn servicios_con_pool(config: AppConfig) -> (Pool<Sqlite>, Servicios) {
    let pool = crear_pool_prueba().await;
    let servicios = Servicios::new(pool.clone(), Arc::new(config));
    (pool, servicios)
}

pub async fn crear_usuario(servicios: &Servicios, nombre: &str, rol: Rol) -> Matrizador {
    servicios
        .matrizador_service
        .crear(CrearMatrizadorRequest {
            nombre: nombre.to_string(),
            email: format!("{}@notaria.ec", nombre.to_lowercase().replace(' ', ".")),
            rol,
            telefono: None,
        })
        .await
        .expect("crear usuario")
}

pub fn solicitud_documento(matrizador_id: Option<&str>, valor_factura: f64) -> CrearDocumentoRequest {
    CrearDocumentoRequest {
        codigo_barras: None,
        tipo_documento: TipoDocumento::Protocolo,
        nombre_cliente: "María Pérez".to_string(),
        identificacion_cliente: Some("1712345678".to_string()),
        email_cliente: Some("Maria.Perez@Correo.ec".to_string()),
        telefono_cliente: Some("098 765 4321".to_string()),
        matrizador_id: matrizador_id.map(str::to_string),
        numero_factura: Some("001-001-000123".to_string()),
        valor_factura,
        observaciones: None,
    }
}

pub async fn crear_documento(
    servicios: &Servicios,
    matrizador_id: Option<&str>,
    valor_factura: f64,
) -> Documento {
    servicios
        .documento_service
        .crear(solicitud_documento(matrizador_id, valor_factura), None)
        .await
        .expect("crear documento")
}

pub fn pago(monto: f64) -> RegistrarPagoRequest {
    RegistrarPagoRequest {
        monto,
        metodo_pago: Some("efectivo".to_string()),
        numero_recibo: None,
        observaciones: None,
    }
}

/// Documento LISTO y pagado, listo para entregar.
pub async fn documento_entregable(servicios: &Servicios, valor_factura: f64) -> Documento {
    let doc = crear_documento(servicios, None, valor_factura).await;
    servicios
        .pago_service
        .registrar_pago(&doc.id, pago(valor_factura), None)
        .await
        .expect("pagar");
    servicios
        .documento_service
        .marcar_listo(&doc.id, None)
        .await
        .expect("marcar listo")
}

pub fn error_app(e: anyhow::Error) -> AppError {
    AppError::from(e)
}

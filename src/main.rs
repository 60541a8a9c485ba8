use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::app::Servicios;
use crate::config::AppConfig;
use crate::logger::init_logger;
use crate::services::backup_service::ruta_base_de_datos;
use crate::services::notification_service::NotificationService;

mod app;
mod config;
mod errors;
mod handlers;
mod helpers;
mod logger;
mod models;
mod services;
mod validation;

#[cfg(test)]
mod tests;

async fn setup_database(config: &AppConfig) -> anyhow::Result<Pool<Sqlite>> {
    // Crear la carpeta de la base (p.e. "data") si no existe
    if let Some(parent) = ruta_base_de_datos(&config.database_url)
        .as_deref()
        .and_then(|p| p.parent())
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("No se pudo crear el directorio {:?}", parent))?;
    }

    log::info!("Conectando a SQLite en {}", config.database_url);
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("DATABASE_URL inválida: {}", config.database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Fallo en las migraciones")?;

    Ok(db_pool)
}

/// Reintenta periódicamente las notificaciones FALLIDA.
fn lanzar_reintentos(notification_service: NotificationService, intervalo: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(intervalo).await;
            match notification_service.reintentar_fallidas().await {
                Ok(resumen) if resumen.revisadas > 0 => log::info!(
                    "(reintentos) revisadas={}, enviadas={}, fallidas={}",
                    resumen.revisadas,
                    resumen.enviadas,
                    resumen.fallidas
                ),
                Ok(_) => {}
                Err(e) => log::error!("(reintentos) Error en reintento: {:?}", e),
            }
        }
    });
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = Arc::new(AppConfig::from_env());
    if config.notificaciones_simuladas {
        log::warn!("Notificaciones en modo simulado: no se enviará nada a los clientes");
    }

    let db_pool = setup_database(&config).await?;
    let servicios = Servicios::new(db_pool, config.clone());

    if config.reintento_intervalo_segs > 0 {
        lanzar_reintentos(
            servicios.notification_service.clone(),
            Duration::from_secs(config.reintento_intervalo_segs),
        );
    }

    let (host, port) = config.bind_addr();
    log::info!("Levantando servidor en {}:{}", host, port);
    HttpServer::new(move || {
        let servicios = servicios.clone();
        App::new()
            .configure(move |cfg| servicios.registrar(cfg))
            .configure(app::init_app)
    })
    .workers(config.workers.max(1))
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}

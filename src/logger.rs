//! logger.rs
//! Configuración del logger (env_logger) para el servidor y para las pruebas.

use env_logger::{Builder, Env};

/// Logger del servidor. El nivel sale de RUST_LOG; sin variable usamos "info"
/// y bajamos el ruido de sqlx a "warn".
pub fn init_logger() {
    let log_env = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sqlx=warn".to_string());

    Builder::from_env(Env::default().default_filter_or(log_env))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}

/// Logger para tests: captura la salida por test y tolera inicializaciones repetidas.
#[cfg(test)]
pub fn init_test_logger() {
    let _ = Builder::from_env(Env::default().default_filter_or("debug,sqlx=warn"))
        .is_test(true)
        .try_init();
}

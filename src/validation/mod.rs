//! validation/mod.rs
//! Reglas de negocio puras (sin base de datos).

pub mod pagos;

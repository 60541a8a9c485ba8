//! helpers/mod.rs
//! Funciones de presentación y utilidades sin estado (formato, teléfonos, códigos).

pub mod codigo;
pub mod formato;
pub mod telefono;

//! models/matrizador_model.rs
//! Personal de la notaría y sus roles.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};

use crate::models::parse_fecha;

enum_texto! {
    Rol {
        Admin => "ADMIN",
        Caja => "CAJA",
        Matrizador => "MATRIZADOR",
        Recepcion => "RECEPCION",
        Archivo => "ARCHIVO",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Matrizador {
    pub id: String,
    pub nombre: String,
    pub email: String,
    pub rol: Rol,
    pub telefono: Option<String>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Matrizador {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let rol: String = row.try_get("rol")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Matrizador {
            id: row.try_get("id")?,
            nombre: row.try_get("nombre")?,
            email: row.try_get("email")?,
            rol: rol.parse()?,
            telefono: row.try_get("telefono")?,
            activo: row.try_get("activo")?,
            created_at: parse_fecha(&created_at)?,
            updated_at: parse_fecha(&updated_at)?,
        })
    }

    /// Puede tener documentos asignados.
    pub fn puede_matrizar(&self) -> bool {
        self.activo && matches!(self.rol, Rol::Matrizador | Rol::Admin)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrearMatrizadorRequest {
    pub nombre: String,
    pub email: String,
    pub rol: Rol,
    pub telefono: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActualizarMatrizadorRequest {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub rol: Option<Rol>,
    pub telefono: Option<String>,
    pub activo: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltroMatrizadores {
    pub rol: Option<Rol>,
    pub activo: Option<bool>,
}

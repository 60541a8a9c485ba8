//! models/backup_model.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

enum_texto! {
    MetodoBackup {
        /// `sqlite3 <db> ".backup ..."`
        Sqlite3 => "SQLITE3",
        VacuumInto => "VACUUM_INTO",
    }
}

/// Archivo de respaldo en `BACKUP_DIR`.
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub nombre: String,
    pub tamano_bytes: u64,
    pub creado: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupCreado {
    #[serde(flatten)]
    pub backup: BackupInfo,
    pub metodo: MetodoBackup,
    pub duracion_ms: u128,
}

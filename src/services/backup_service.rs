//! services/backup_service.rs
//! Respaldos de la base SQLite en BACKUP_DIR.
//!
//! Con `sqlite3` en el PATH se usa `.backup`; si no está (o la base es en
//! memoria) se usa `VACUUM INTO`. En ambos casos se escribe a un temporal en
//! el mismo directorio y se renombra al terminar.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use tokio::{
    process::Command,
    sync::{Semaphore, SemaphorePermit},
    time::timeout,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::backup_model::{BackupCreado, BackupInfo, MetodoBackup};

/// Un respaldo a la vez
const MAX_BACKUPS_SIMULTANEOS: usize = 1;
const BACKUP_TIMEOUT: Duration = Duration::from_secs(300);
const PREFIJO_BACKUP: &str = "notaria_";
const EXTENSION_BACKUP: &str = ".db";

#[derive(Clone, Debug)]
pub struct BackupService {
    db_pool: Pool<Sqlite>,
    backup_dir: Arc<PathBuf>,
    /// Archivo de la base; `None` para bases en memoria
    database_path: Option<Arc<PathBuf>>,
    sqlite3_path: Option<Arc<PathBuf>>,
    semaphore: Arc<Semaphore>,
}

impl BackupService {
    pub fn new(db_pool: Pool<Sqlite>, database_url: &str, backup_dir: impl Into<PathBuf>) -> Self {
        let sqlite3_path = match which::which("sqlite3") {
            Ok(path) => {
                log::info!("(backup_service) Usando sqlite3 en {:?}", path);
                Some(Arc::new(path))
            }
            Err(_) => {
                log::warn!("(backup_service) sqlite3 no está en el PATH, se usará VACUUM INTO");
                None
            }
        };

        Self {
            db_pool,
            backup_dir: Arc::new(backup_dir.into()),
            database_path: ruta_base_de_datos(database_url).map(Arc::new),
            sqlite3_path,
            semaphore: Arc::new(Semaphore::new(MAX_BACKUPS_SIMULTANEOS)),
        }
    }

    pub async fn crear_backup(&self) -> Result<BackupCreado> {
        let start = Instant::now();
        let _guard = self.acquire_permit().await?;

        tokio::fs::create_dir_all(&*self.backup_dir)
            .await
            .with_context(|| format!("No se pudo crear {:?}", self.backup_dir))?;

        let ahora = Utc::now();
        let nombre = format!(
            "{}{}_{}{}",
            PREFIJO_BACKUP,
            ahora.format("%Y%m%d_%H%M%S"),
            &Uuid::new_v4().simple().to_string()[..6],
            EXTENSION_BACKUP
        );
        let destino = self.backup_dir.join(&nombre);

        // Temporal vacío en el mismo directorio: el rename final no cruza filesystems.
        let temporal = tempfile::Builder::new()
            .prefix(".respaldo_")
            .suffix(".tmp")
            .tempfile_in(&*self.backup_dir)
            .context("No se pudo crear el archivo temporal del respaldo")?;

        let metodo = match (&self.sqlite3_path, &self.database_path) {
            (Some(sqlite3), Some(db_path)) => {
                match self.backup_con_sqlite3(sqlite3, db_path, temporal.path()).await {
                    Ok(()) => MetodoBackup::Sqlite3,
                    Err(e) => {
                        log::warn!(
                            "(crear_backup) sqlite3 falló ({:#}), se reintenta con VACUUM INTO",
                            e
                        );
                        truncar(temporal.path()).await?;
                        self.backup_con_vacuum(temporal.path()).await?;
                        MetodoBackup::VacuumInto
                    }
                }
            }
            _ => {
                self.backup_con_vacuum(temporal.path()).await?;
                MetodoBackup::VacuumInto
            }
        };

        temporal
            .persist(&destino)
            .map_err(|e| anyhow!("No se pudo guardar el respaldo en {:?}: {}", destino, e.error))?;

        let backup = info_backup(&destino).await?;
        let duracion_ms = start.elapsed().as_millis();
        log::info!(
            "(crear_backup) Respaldo {} creado con {} ({} bytes, {} ms)",
            backup.nombre,
            metodo,
            backup.tamano_bytes,
            duracion_ms
        );

        Ok(BackupCreado {
            backup,
            metodo,
            duracion_ms,
        })
    }

    /// Respaldos existentes, del más reciente al más antiguo.
    pub async fn listar_backups(&self) -> Result<Vec<BackupInfo>> {
        let mut entradas = match tokio::fs::read_dir(&*self.backup_dir).await {
            Ok(entradas) => entradas,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("No se pudo leer {:?}", self.backup_dir))
            }
        };

        let mut backups = Vec::new();
        while let Some(entrada) = entradas.next_entry().await? {
            let nombre = entrada.file_name().to_string_lossy().to_string();
            if !es_nombre_backup(&nombre) {
                continue;
            }
            backups.push(info_backup(&entrada.path()).await?);
        }
        backups.sort_by(|a, b| b.creado.cmp(&a.creado).then_with(|| b.nombre.cmp(&a.nombre)));
        Ok(backups)
    }

    /// Ruta de un respaldo existente. Solo acepta nombres generados por este servicio.
    pub fn ruta_backup(&self, nombre: &str) -> Result<PathBuf> {
        if !es_nombre_backup(nombre) {
            return Err(AppError::validacion(format!("Nombre de respaldo inválido: '{}'", nombre)).into());
        }
        let ruta = self.backup_dir.join(nombre);
        if !ruta.is_file() {
            return Err(AppError::no_encontrado(format!("No existe el respaldo {}", nombre)).into());
        }
        Ok(ruta)
    }

    async fn acquire_permit(&self) -> Result<SemaphorePermit> {
        timeout(Duration::from_secs(5), self.semaphore.acquire())
            .await
            .map_err(|_| AppError::conflicto("Ya hay un respaldo en curso"))?
            .map_err(|_| anyhow!("No se pudo adquirir el semaphore"))
    }

    async fn backup_con_sqlite3(&self, sqlite3: &Path, db_path: &Path, destino: &Path) -> Result<()> {
        let comando = format!(".backup '{}'", destino.to_string_lossy().replace('\'', "''"));
        let mut cmd = Command::new(sqlite3);
        cmd.arg(db_path).arg(comando);

        let output = timeout(BACKUP_TIMEOUT, cmd.output())
            .await
            .context("Timeout ejecutando sqlite3")?
            .context("No se pudo ejecutar sqlite3")?;

        if !output.status.success() {
            return Err(anyhow!(
                "sqlite3 terminó con {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(())
    }

    async fn backup_con_vacuum(&self, destino: &Path) -> Result<()> {
        let sql = format!(
            "VACUUM INTO '{}'",
            destino.to_string_lossy().replace('\'', "''")
        );
        timeout(BACKUP_TIMEOUT, sqlx::query(&sql).execute(&self.db_pool))
            .await
            .context("Timeout ejecutando VACUUM INTO")?
            .context("Fallo VACUUM INTO")?;
        Ok(())
    }
}

/// `sqlite:data/notaria.db?mode=rwc` -> `data/notaria.db`. `None` si es en memoria.
pub fn ruta_base_de_datos(database_url: &str) -> Option<PathBuf> {
    let resto = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let ruta = resto.split('?').next().unwrap_or_default();
    if ruta.is_empty() || ruta == ":memory:" || resto.contains("mode=memory") {
        return None;
    }
    Some(PathBuf::from(ruta))
}

pub fn es_nombre_backup(nombre: &str) -> bool {
    nombre.starts_with(PREFIJO_BACKUP)
        && nombre.ends_with(EXTENSION_BACKUP)
        && nombre
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !nombre.contains("..")
}

async fn truncar(path: &Path) -> Result<()> {
    tokio::fs::write(path, b"")
        .await
        .with_context(|| format!("No se pudo vaciar {:?}", path))
}

async fn info_backup(path: &Path) -> Result<BackupInfo> {
    let meta = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("No se pudo leer {:?}", path))?;
    let creado: DateTime<Utc> = meta.modified().map(DateTime::from).unwrap_or_else(|_| Utc::now());
    Ok(BackupInfo {
        nombre: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        tamano_bytes: meta.len(),
        creado,
    })
}

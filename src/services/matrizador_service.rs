//! services/matrizador_service.rs
//! Alta, edición y baja lógica del personal.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::errors::AppError;
use crate::helpers::telefono::normalizar_telefono_ecuador;
use crate::models::matrizador_model::{
    ActualizarMatrizadorRequest, CrearMatrizadorRequest, FiltroMatrizadores, Matrizador,
};

const COLUMNAS: &str = "id, nombre, email, rol, telefono, activo, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct MatrizadorService {
    db_pool: Pool<Sqlite>,
}

impl MatrizadorService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        MatrizadorService { db_pool }
    }

    pub async fn crear(&self, req: CrearMatrizadorRequest) -> Result<Matrizador> {
        let nombre = req.nombre.trim().to_string();
        let email = normalizar_email(&req.email)?;
        if nombre.is_empty() {
            return Err(AppError::validacion("El nombre es obligatorio").into());
        }
        let telefono = normalizar_telefono_opcional(req.telefono.as_deref())?;

        if self.buscar_por_email(&email).await?.is_some() {
            return Err(AppError::conflicto(format!("Ya existe un usuario con email {}", email)).into());
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO matrizadores (id, nombre, email, rol, telefono, activo, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            "#,
        )
        .bind(&id)
        .bind(&nombre)
        .bind(&email)
        .bind(req.rol.as_str())
        .bind(&telefono)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar matrizador")?;

        log::info!("(crear_matrizador) {} <{}> rol={}", nombre, email, req.rol);
        self.obtener(&id).await
    }

    pub async fn obtener(&self, id: &str) -> Result<Matrizador> {
        let sql = format!("SELECT {} FROM matrizadores WHERE id = ?1", COLUMNAS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Fallo al consultar matrizador")?
            .ok_or_else(|| AppError::no_encontrado(format!("No existe el usuario {}", id)))?;
        Matrizador::from_row(&row)
    }

    async fn buscar_por_email(&self, email: &str) -> Result<Option<Matrizador>> {
        let sql = format!("SELECT {} FROM matrizadores WHERE email = ?1", COLUMNAS);
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.db_pool)
            .await
            .context("Fallo al buscar matrizador por email")?;
        row.as_ref().map(Matrizador::from_row).transpose()
    }

    pub async fn listar(&self, filtro: &FiltroMatrizadores) -> Result<Vec<Matrizador>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM matrizadores WHERE 1 = 1", COLUMNAS));
        if let Some(rol) = filtro.rol {
            qb.push(" AND rol = ").push_bind(rol.as_str());
        }
        if let Some(activo) = filtro.activo {
            qb.push(" AND activo = ").push_bind(activo);
        }
        qb.push(" ORDER BY nombre ASC");

        let rows = qb
            .build()
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar matrizadores")?;
        rows.iter().map(Matrizador::from_row).collect()
    }

    pub async fn actualizar(&self, id: &str, req: ActualizarMatrizadorRequest) -> Result<Matrizador> {
        let actual = self.obtener(id).await?;

        let nombre = match req.nombre {
            Some(n) if n.trim().is_empty() => {
                return Err(AppError::validacion("El nombre es obligatorio").into())
            }
            Some(n) => n.trim().to_string(),
            None => actual.nombre,
        };
        let email = match req.email {
            Some(e) => {
                let e = normalizar_email(&e)?;
                if e != actual.email {
                    if let Some(otro) = self.buscar_por_email(&e).await? {
                        if otro.id != id {
                            return Err(AppError::conflicto(format!(
                                "Ya existe un usuario con email {}",
                                e
                            ))
                            .into());
                        }
                    }
                }
                e
            }
            None => actual.email,
        };
        let telefono = match req.telefono {
            Some(t) => normalizar_telefono_opcional(Some(&t))?,
            None => actual.telefono,
        };
        let rol = req.rol.unwrap_or(actual.rol);
        let activo = req.activo.unwrap_or(actual.activo);

        sqlx::query(
            r#"
            UPDATE matrizadores
            SET nombre = ?2, email = ?3, rol = ?4, telefono = ?5, activo = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&nombre)
        .bind(&email)
        .bind(rol.as_str())
        .bind(&telefono)
        .bind(activo)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar matrizador")?;

        self.obtener(id).await
    }

    /// Baja lógica: el historial sigue apuntando al usuario.
    pub async fn desactivar(&self, id: &str) -> Result<Matrizador> {
        self.actualizar(
            id,
            ActualizarMatrizadorRequest {
                activo: Some(false),
                ..Default::default()
            },
        )
        .await
    }
}

fn normalizar_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valido = matches!(
        email.split_once('@'),
        Some((usuario, dominio)) if !usuario.is_empty() && dominio.contains('.')
    );
    if valido {
        Ok(email)
    } else {
        Err(AppError::validacion(format!("Email inválido: '{}'", email)).into())
    }
}

pub(crate) fn normalizar_telefono_opcional(telefono: Option<&str>) -> Result<Option<String>> {
    match telefono.map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) => normalizar_telefono_ecuador(t)
            .map(Some)
            .ok_or_else(|| AppError::validacion(format!("Teléfono inválido: '{}'", t)).into()),
    }
}

pub(crate) fn normalizar_email_opcional(email: Option<&str>) -> Result<Option<String>> {
    match email.map(str::trim) {
        None | Some("") => Ok(None),
        Some(e) => normalizar_email(e).map(Some),
    }
}

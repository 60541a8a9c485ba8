//! models/mod.rs
//! Entidades persistidas y DTOs de requests/responses.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Enum guardado como texto en la base (`"EN_PROCESO"`, `"CAJA"`, ...).
/// Genera `as_str`, `Display`, `FromStr` y serde con el mismo texto.
macro_rules! enum_texto {
    ($(#[$meta:meta])* $nombre:ident {
        $($(#[$vmeta:meta])* $variante:ident => $texto:literal),+ $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $nombre {
            $(
                $(#[$vmeta])*
                #[serde(rename = $texto)]
                $variante
            ),+
        }

        impl $nombre {
            pub const TODOS: &'static [$nombre] = &[$($nombre::$variante),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($nombre::$variante => $texto),+
                }
            }
        }

        impl std::fmt::Display for $nombre {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $nombre {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $nombre::TODOS
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| {
                        anyhow::anyhow!(concat!(stringify!($nombre), " desconocido: {}"), s)
                    })
            }
        }
    };
}

pub mod backup_model;
pub mod dashboard_model;
pub mod documento_model;
pub mod evento_model;
pub mod matrizador_model;
pub mod notificacion_model;
pub mod pago_model;
pub mod relacion_model;

/// Para listar con paginación
#[derive(Debug, Clone, Serialize)]
pub struct ListaPaginada<T> {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub items: Vec<T>,
}

/// `?page=&page_size=` de los listados
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginacionQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

pub const PAGE_SIZE_DEFAULT: u64 = 20;
pub const PAGE_SIZE_MAX: u64 = 100;

/// Normaliza page (>= 1) y page_size (1..=100).
pub fn normalizar_paginacion(page: Option<u64>, page_size: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size
        .unwrap_or(PAGE_SIZE_DEFAULT)
        .clamp(1, PAGE_SIZE_MAX);
    (page, page_size)
}

/// OFFSET de SQL para una página ya normalizada. Una página fuera de alcance
/// satura en `i64::MAX` y devuelve una lista vacía.
pub fn offset_paginacion(page: u64, page_size: u64) -> i64 {
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    i64::try_from(offset).unwrap_or(i64::MAX)
}

pub(crate) fn parse_fecha(valor: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(valor)
        .map(|f| f.with_timezone(&Utc))
        .with_context(|| format!("Fecha inválida en la base: '{}'", valor))
}

pub(crate) fn parse_fecha_opt(valor: Option<String>) -> Result<Option<DateTime<Utc>>> {
    valor.as_deref().map(parse_fecha).transpose()
}

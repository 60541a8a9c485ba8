//! config/app_config.rs
//! Configuración global de la aplicación (servidor, base de datos, canales de notificación).

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Credenciales SMTP para el canal de email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub pass: String,
    /// Remitente visible, p.e. "Notaría <avisos@notaria.ec>"
    pub from: String,
}

/// Credenciales de Twilio para el canal de WhatsApp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    #[serde(skip_serializing)]
    pub auth_token: String,
    /// Número remitente habilitado para WhatsApp (E.164, sin prefijo "whatsapp:")
    pub whatsapp_from: String,
    pub api_url: String,
}

/// Configuración global, con valores por defecto
/// (se sobreescribe desde variables de entorno / .env)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub database_url: String,
    pub backup_dir: String,
    pub notaria_nombre: String,
    /// Si está activo, las notificaciones se registran pero no salen a la red.
    pub notificaciones_simuladas: bool,
    pub max_intentos_notificacion: i64,
    /// Intervalo del reintento automático de notificaciones fallidas (0 = desactivado)
    pub reintento_intervalo_segs: u64,
    pub smtp: Option<SmtpConfig>,
    pub twilio: Option<TwilioConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 5022,
            workers: 1,
            database_url: "sqlite:data/notaria.db".to_string(),
            backup_dir: "data/backups".to_string(),
            notaria_nombre: "Notaría".to_string(),
            notificaciones_simuladas: false,
            max_intentos_notificacion: 3,
            reintento_intervalo_segs: 0,
            smtp: None,
            twilio: None,
        }
    }
}

impl AppConfig {
    /// Lee la configuración desde el entorno. Las variables ausentes toman el default.
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();

        let smtp = match (env::var("SMTP_HOST"), env::var("SMTP_USER")) {
            (Ok(host), Ok(user)) if !host.is_empty() => Some(SmtpConfig {
                port: parse_var("SMTP_PORT", 587),
                pass: env::var("SMTP_PASS").unwrap_or_default(),
                from: env::var("SMTP_FROM").unwrap_or_else(|_| user.clone()),
                host,
                user,
            }),
            _ => None,
        };

        let twilio = match (
            env::var("TWILIO_ACCOUNT_SID"),
            env::var("TWILIO_AUTH_TOKEN"),
            env::var("TWILIO_WHATSAPP_FROM"),
        ) {
            (Ok(account_sid), Ok(auth_token), Ok(whatsapp_from)) if !account_sid.is_empty() => {
                Some(TwilioConfig {
                    account_sid,
                    auth_token,
                    whatsapp_from,
                    api_url: env::var("TWILIO_API_URL")
                        .unwrap_or_else(|_| "https://api.twilio.com/2010-04-01".to_string()),
                })
            }
            _ => None,
        };

        AppConfig {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port),
            workers: parse_var("WORKERS", defaults.workers),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            backup_dir: env::var("BACKUP_DIR").unwrap_or(defaults.backup_dir),
            notaria_nombre: env::var("NOTARIA_NOMBRE").unwrap_or(defaults.notaria_nombre),
            notificaciones_simuladas: parse_var(
                "NOTIFICACIONES_SIMULADAS",
                defaults.notificaciones_simuladas,
            ),
            max_intentos_notificacion: parse_var(
                "NOTIFICACIONES_MAX_INTENTOS",
                defaults.max_intentos_notificacion,
            ),
            reintento_intervalo_segs: parse_var(
                "REINTENTO_INTERVALO_SEGS",
                defaults.reintento_intervalo_segs,
            ),
            smtp,
            twilio,
        }
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("Valor inválido para {}='{}', se usa el default", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}

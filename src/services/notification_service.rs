//! services/notification_service.rs
//! Avisos al cliente por email y WhatsApp. Cada canal deja su registro en
//! notificaciones_enviadas y el documento recibe un evento NOTIFICACION.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::helpers::formato::{formatear_fecha_hora, formatear_moneda};
use crate::models::documento_model::{Documento, EstadoDocumento};
use crate::models::evento_model::{NuevoEvento, TipoEvento};
use crate::models::notificacion_model::{
    CanalNotificacion, EstadoNotificacion, MensajeCliente, NotificacionEnviada, ResumenReintento,
};
use crate::services::{
    documento_service::DocumentoService, email_service::EmailService,
    evento_service::EventoService, whatsapp_service::WhatsAppService,
};

const COLUMNAS: &str = "id, documento_id, canal, destinatario, asunto, mensaje, estado, \
    intentos, error_message, created_at, updated_at";

#[derive(Clone)]
pub struct NotificationService {
    db_pool: Pool<Sqlite>,
    config: Arc<AppConfig>,
    documento_service: DocumentoService,
    email_service: EmailService,
    whatsapp_service: WhatsAppService,
}

impl NotificationService {
    pub fn new(
        db_pool: Pool<Sqlite>,
        config: Arc<AppConfig>,
        documento_service: DocumentoService,
        email_service: EmailService,
        whatsapp_service: WhatsAppService,
    ) -> Self {
        Self {
            db_pool,
            config,
            documento_service,
            email_service,
            whatsapp_service,
        }
    }

    /// Aviso de "documento listo para retirar" por todos los canales con contacto.
    pub async fn notificar_documento_listo(
        &self,
        documento_id: &str,
        usuario_id: Option<&str>,
    ) -> Result<Vec<NotificacionEnviada>> {
        self.notificar(documento_id, usuario_id, false).await
    }

    /// Reenvío manual (recepción): recordatorio con el mismo código.
    pub async fn reenviar(
        &self,
        documento_id: &str,
        usuario_id: Option<&str>,
    ) -> Result<Vec<NotificacionEnviada>> {
        self.notificar(documento_id, usuario_id, true).await
    }

    async fn notificar(
        &self,
        documento_id: &str,
        usuario_id: Option<&str>,
        recordatorio: bool,
    ) -> Result<Vec<NotificacionEnviada>> {
        let doc = self.documento_service.obtener(documento_id).await?;
        if doc.estado != EstadoDocumento::Listo {
            return Err(AppError::conflicto(format!(
                "Solo se notifican documentos LISTO (estado actual {})",
                doc.estado
            ))
            .into());
        }

        let mut mensaje = self.construir_mensaje_listo(&doc);
        if recordatorio {
            mensaje.asunto = format!("Recordatorio: {}", mensaje.asunto);
            mensaje.texto = format!("Recordatorio.\n\n{}", mensaje.texto);
        }
        let destinos = destinatarios(&doc);
        log::info!(
            "(notificar) Documento {} -> {} canales (recordatorio={})",
            documento_id,
            destinos.len(),
            recordatorio
        );

        let mut registros = Vec::with_capacity(destinos.len());
        for (canal, destinatario) in destinos {
            let id = self
                .crear_registro(documento_id, canal, &destinatario, &mensaje)
                .await?;
            self.intentar_envio(&id, canal, &destinatario, &mensaje).await?;
            registros.push(self.obtener(&id).await?);
        }

        let detalle = if registros.is_empty() {
            "Sin datos de contacto: no se envió aviso".to_string()
        } else {
            registros
                .iter()
                .map(|n| format!("{} a {}: {}", n.canal, n.destinatario, n.estado))
                .collect::<Vec<_>>()
                .join("; ")
        };
        self.registrar_evento(
            documento_id,
            detalle,
            usuario_id,
            json!({
                "notificaciones": registros.iter().map(|n| &n.id).collect::<Vec<_>>(),
                "recordatorio": recordatorio,
            }),
        )
        .await?;

        Ok(registros)
    }

    pub async fn listar_por_documento(&self, documento_id: &str) -> Result<Vec<NotificacionEnviada>> {
        let sql = format!(
            "SELECT {} FROM notificaciones_enviadas WHERE documento_id = ?1 ORDER BY created_at ASC",
            COLUMNAS
        );
        let rows = sqlx::query(&sql)
            .bind(documento_id)
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar notificaciones")?;
        rows.iter().map(NotificacionEnviada::from_row).collect()
    }

    pub async fn obtener(&self, id: &str) -> Result<NotificacionEnviada> {
        let sql = format!("SELECT {} FROM notificaciones_enviadas WHERE id = ?1", COLUMNAS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Fallo al consultar notificación")?
            .ok_or_else(|| AppError::no_encontrado(format!("No existe la notificación {}", id)))?;
        NotificacionEnviada::from_row(&row)
    }

    /// Reintenta las notificaciones FALLIDA con menos de `max_intentos_notificacion` intentos.
    pub async fn reintentar_fallidas(&self) -> Result<ResumenReintento> {
        let max_intentos = self.config.max_intentos_notificacion;
        let sql = format!(
            "SELECT {} FROM notificaciones_enviadas \
             WHERE estado = 'FALLIDA' AND intentos < ?1 ORDER BY updated_at ASC",
            COLUMNAS
        );
        let rows = sqlx::query(&sql)
            .bind(max_intentos)
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al buscar notificaciones fallidas")?;
        let pendientes = rows
            .iter()
            .map(NotificacionEnviada::from_row)
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "(reintentar_fallidas) {} notificaciones para reintentar (intentos < {})",
            pendientes.len(),
            max_intentos
        );

        let mut resumen = ResumenReintento {
            revisadas: pendientes.len(),
            enviadas: 0,
            fallidas: 0,
        };
        for n in pendientes {
            let mensaje = MensajeCliente {
                asunto: n.asunto.clone().unwrap_or_default(),
                texto: n.mensaje.clone(),
            };
            let estado = self
                .intentar_envio(&n.id, n.canal, &n.destinatario, &mensaje)
                .await?;
            if estado == EstadoNotificacion::Fallida {
                resumen.fallidas += 1;
            } else {
                resumen.enviadas += 1;
                self.registrar_evento(
                    &n.documento_id,
                    format!("Reintento: {} a {}: {}", n.canal, n.destinatario, estado),
                    None,
                    json!({ "notificacion_id": n.id, "intento": n.intentos + 1 }),
                )
                .await?;
            }
        }
        Ok(resumen)
    }

    pub fn construir_mensaje_listo(&self, doc: &Documento) -> MensajeCliente {
        let mut texto = format!(
            "Estimado/a {}:\n\nSu documento ({}) con código {} está listo para ser retirado en {}.",
            doc.nombre_cliente, doc.tipo_documento, doc.codigo_barras, self.config.notaria_nombre
        );
        if let Some(listo) = &doc.fecha_listo {
            texto.push_str(&format!("\nListo desde: {}", formatear_fecha_hora(listo)));
        }
        if let Some(codigo) = &doc.codigo_verificacion {
            texto.push_str(&format!(
                "\n\nCódigo de verificación para el retiro: {}",
                codigo
            ));
        }
        if doc.valor_pendiente > 0.0 {
            texto.push_str(&format!(
                "\n\nSaldo pendiente por cancelar: {}",
                formatear_moneda(doc.valor_pendiente)
            ));
        }
        texto.push_str("\n\nGracias por su confianza.");

        MensajeCliente {
            asunto: format!("Documento {} listo para retirar", doc.codigo_barras),
            texto,
        }
    }

    async fn crear_registro(
        &self,
        documento_id: &str,
        canal: CanalNotificacion,
        destinatario: &str,
        mensaje: &MensajeCliente,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO notificaciones_enviadas (
                id, documento_id, canal, destinatario, asunto, mensaje, estado,
                intentos, error_message, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'PENDIENTE', 0, NULL, ?7, ?7)
            "#,
        )
        .bind(&id)
        .bind(documento_id)
        .bind(canal.as_str())
        .bind(destinatario)
        .bind(&mensaje.asunto)
        .bind(&mensaje.texto)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Error creando registro de notificación")?;
        Ok(id)
    }

    /// Envía por el canal y deja el resultado en el registro. Un fallo del
    /// canal no es un error de la operación: queda como FALLIDA.
    async fn intentar_envio(
        &self,
        notificacion_id: &str,
        canal: CanalNotificacion,
        destinatario: &str,
        mensaje: &MensajeCliente,
    ) -> Result<EstadoNotificacion> {
        let (estado, error) = if self.config.notificaciones_simuladas {
            log::info!(
                "(intentar_envio) [simulado] {} a {}: {}",
                canal,
                destinatario,
                mensaje.asunto
            );
            (EstadoNotificacion::Simulada, None)
        } else if !self.canal_configurado(canal) {
            log::warn!(
                "(intentar_envio) Canal {} no configurado, se omite aviso a {}",
                canal,
                destinatario
            );
            (
                EstadoNotificacion::Omitida,
                Some(format!("Canal {} no configurado", canal)),
            )
        } else {
            let resultado = match canal {
                CanalNotificacion::Email => self.email_service.enviar(destinatario, mensaje).await,
                CanalNotificacion::Whatsapp => self
                    .whatsapp_service
                    .enviar(destinatario, &mensaje.texto)
                    .await
                    .map(|_| ()),
            };
            match resultado {
                Ok(()) => (EstadoNotificacion::Enviada, None),
                Err(e) => {
                    log::error!(
                        "(intentar_envio) Error enviando {} a {}: {:?}",
                        canal,
                        destinatario,
                        e
                    );
                    (EstadoNotificacion::Fallida, Some(format!("{:#}", e)))
                }
            }
        };

        // Una omisión no cuenta como intento
        let incrementa = estado != EstadoNotificacion::Omitida;
        self.actualizar_registro(notificacion_id, estado, error.as_deref(), incrementa)
            .await?;
        Ok(estado)
    }

    fn canal_configurado(&self, canal: CanalNotificacion) -> bool {
        match canal {
            CanalNotificacion::Email => self.email_service.esta_configurado(),
            CanalNotificacion::Whatsapp => self.whatsapp_service.esta_configurado(),
        }
    }

    async fn actualizar_registro(
        &self,
        notificacion_id: &str,
        estado: EstadoNotificacion,
        error_message: Option<&str>,
        incrementar_intento: bool,
    ) -> Result<()> {
        let attempts_sql = if incrementar_intento {
            ", intentos = intentos + 1"
        } else {
            ""
        };
        let sql = format!(
            r#"
            UPDATE notificaciones_enviadas
            SET estado = ?1, error_message = ?2, updated_at = ?3
                {attempts_sql}
            WHERE id = ?4
            "#
        );

        sqlx::query(&sql)
            .bind(estado.as_str())
            .bind(error_message)
            .bind(Utc::now().to_rfc3339())
            .bind(notificacion_id)
            .execute(&self.db_pool)
            .await
            .context("Error actualizando registro de notificación")?;
        Ok(())
    }

    async fn registrar_evento(
        &self,
        documento_id: &str,
        detalle: String,
        usuario_id: Option<&str>,
        metadata: serde_json::Value,
    ) -> Result<()> {
        EventoService::registrar_en(
            &self.db_pool,
            NuevoEvento::new(documento_id, TipoEvento::Notificacion, detalle)
                .por_usuario(usuario_id)
                .con_metadata(metadata),
        )
        .await?;
        Ok(())
    }
}

/// Canales a usar según los datos de contacto del cliente.
pub fn destinatarios(doc: &Documento) -> Vec<(CanalNotificacion, String)> {
    let mut destinos = Vec::new();
    if let Some(email) = doc.email_cliente.as_deref().filter(|e| !e.is_empty()) {
        destinos.push((CanalNotificacion::Email, email.to_string()));
    }
    if let Some(tel) = doc.telefono_cliente.as_deref().filter(|t| !t.is_empty()) {
        destinos.push((CanalNotificacion::Whatsapp, tel.to_string()));
    }
    destinos
}

//! services/email_service.rs
//! Canal de email (SMTP con lettre).

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;
use crate::models::notificacion_model::MensajeCliente;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct EmailService {
    smtp: Option<SmtpConfig>,
}

impl EmailService {
    pub fn new(smtp: Option<SmtpConfig>) -> Self {
        Self { smtp }
    }

    pub fn esta_configurado(&self) -> bool {
        self.smtp.is_some()
    }

    pub async fn enviar(&self, destinatario: &str, mensaje: &MensajeCliente) -> Result<()> {
        let smtp = self
            .smtp
            .as_ref()
            .ok_or_else(|| anyhow!("SMTP no configurado"))?;

        let from: Mailbox = smtp
            .from
            .parse()
            .with_context(|| format!("Remitente inválido: '{}'", smtp.from))?;
        let to: Mailbox = destinatario
            .parse()
            .with_context(|| format!("Destinatario inválido: '{}'", destinatario))?;

        let tls_params = TlsParameters::new(smtp.host.clone())?;
        // 465 = TLS implícito, el resto negocia STARTTLS
        let tls = if smtp.port == 465 {
            Tls::Wrapper(tls_params)
        } else {
            Tls::Required(tls_params)
        };
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
            .port(smtp.port)
            .credentials(Credentials::new(smtp.user.clone(), smtp.pass.clone()))
            .tls(tls)
            .build();

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&mensaje.asunto)
            .multipart(MultiPart::alternative_plain_html(
                mensaje.texto.clone(),
                texto_a_html(&mensaje.texto),
            ))
            .context("No se pudo construir el email")?;

        tokio::time::timeout(SMTP_TIMEOUT, mailer.send(message))
            .await
            .context("Timeout enviando email")?
            .context("El servidor SMTP rechazó el envío")?;

        log::info!("(email) Enviado '{}' a {}", mensaje.asunto, destinatario);
        Ok(())
    }
}

/// Escapa el texto y convierte saltos de línea en párrafos.
pub fn texto_a_html(texto: &str) -> String {
    let escapado = texto
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    escapado
        .split("\n\n")
        .map(|p| format!("<p>{}</p>", p.replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n")
}

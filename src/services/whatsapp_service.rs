//! services/whatsapp_service.rs
//! Canal de WhatsApp a través de la API de mensajes de Twilio.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use crate::config::TwilioConfig;

#[derive(Debug, Clone)]
pub struct WhatsAppService {
    twilio: Option<TwilioConfig>,
    http_client: Client,
}

impl WhatsAppService {
    pub fn new(twilio: Option<TwilioConfig>) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            twilio,
            http_client,
        }
    }

    pub fn esta_configurado(&self) -> bool {
        self.twilio.is_some()
    }

    /// Envía `texto` al número E.164 dado. Devuelve el SID del mensaje en Twilio.
    pub async fn enviar(&self, telefono: &str, texto: &str) -> Result<String> {
        let twilio = self
            .twilio
            .as_ref()
            .ok_or_else(|| anyhow!("Twilio no configurado"))?;

        let url = format!(
            "{}/Accounts/{}/Messages.json",
            twilio.api_url.trim_end_matches('/'),
            twilio.account_sid
        );
        let from = format!("whatsapp:{}", twilio.whatsapp_from);
        let to = format!("whatsapp:{}", telefono);

        log::info!("(whatsapp) Enviando a {} vía {}", to, url);
        let resp = self
            .http_client
            .post(&url)
            .basic_auth(&twilio.account_sid, Some(&twilio.auth_token))
            .form(&[("From", from.as_str()), ("To", to.as_str()), ("Body", texto)])
            .send()
            .await
            .context("Fallo al hacer POST a Twilio")?;

        let status = resp.status();
        let body: serde_json::Value = resp.json().await.unwrap_or(serde_json::Value::Null);
        if !status.is_success() {
            let detalle = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("sin detalle");
            log::error!("(whatsapp) Twilio respondió {}: {}", status, detalle);
            return Err(anyhow!("Twilio respondió {}: {}", status, detalle));
        }

        let sid = body
            .get("sid")
            .and_then(|s| s.as_str())
            .unwrap_or_default()
            .to_string();
        log::info!("(whatsapp) Mensaje aceptado por Twilio sid={}", sid);
        Ok(sid)
    }
}

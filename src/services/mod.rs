//! services/mod.rs
//! Capas de negocio de la app. Cada servicio es `Clone` y se comparte con
//! los handlers vía `web::Data`.

pub mod backup_service;
pub mod dashboard_service;
pub mod documento_service;
pub mod email_service;
pub mod evento_service;
pub mod matrizador_service;
pub mod notification_service;
pub mod pago_service;
pub mod relacion_service;
pub mod whatsapp_service;

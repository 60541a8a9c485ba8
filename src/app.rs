//! app.rs
use std::sync::Arc;

use actix_web::web;
use sqlx::{Pool, Sqlite};

use crate::config::AppConfig;
use crate::handlers::{
    admin_handler, caja_handler, dashboard_handler, documento_handler, health_endpoint,
    matrizador_handler, notificacion_handler,
};
use crate::services::{
    backup_service::BackupService, dashboard_service::DashboardService,
    documento_service::DocumentoService, email_service::EmailService,
    evento_service::EventoService, matrizador_service::MatrizadorService,
    notification_service::NotificationService, pago_service::PagoService,
    relacion_service::RelacionService, whatsapp_service::WhatsAppService,
};

/// Servicios compartidos por todos los workers.
#[derive(Clone)]
pub struct Servicios {
    pub matrizador_service: MatrizadorService,
    pub documento_service: DocumentoService,
    pub evento_service: EventoService,
    pub relacion_service: RelacionService,
    pub pago_service: PagoService,
    pub notification_service: NotificationService,
    pub dashboard_service: DashboardService,
    pub backup_service: BackupService,
}

impl Servicios {
    pub fn new(db_pool: Pool<Sqlite>, config: Arc<AppConfig>) -> Self {
        let matrizador_service = MatrizadorService::new(db_pool.clone());
        let documento_service = DocumentoService::new(db_pool.clone(), matrizador_service.clone());
        let notification_service = NotificationService::new(
            db_pool.clone(),
            config.clone(),
            documento_service.clone(),
            EmailService::new(config.smtp.clone()),
            WhatsAppService::new(config.twilio.clone()),
        );

        Servicios {
            evento_service: EventoService::new(db_pool.clone()),
            relacion_service: RelacionService::new(db_pool.clone()),
            pago_service: PagoService::new(db_pool.clone()),
            dashboard_service: DashboardService::new(db_pool.clone()),
            backup_service: BackupService::new(
                db_pool,
                &config.database_url,
                config.backup_dir.clone(),
            ),
            matrizador_service,
            documento_service,
            notification_service,
        }
    }

    /// Registra cada servicio como `web::Data`.
    pub fn registrar(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.matrizador_service.clone()))
            .app_data(web::Data::new(self.documento_service.clone()))
            .app_data(web::Data::new(self.evento_service.clone()))
            .app_data(web::Data::new(self.relacion_service.clone()))
            .app_data(web::Data::new(self.pago_service.clone()))
            .app_data(web::Data::new(self.notification_service.clone()))
            .app_data(web::Data::new(self.dashboard_service.clone()))
            .app_data(web::Data::new(self.backup_service.clone()));
    }
}

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_endpoint))
            .service(
                web::scope("/documentos")
                    .route("", web::post().to(documento_handler::crear_documento_endpoint))
                    .route("", web::get().to(documento_handler::listar_documentos_endpoint))
                    .route(
                        "/{id}",
                        web::get().to(documento_handler::obtener_documento_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::put().to(documento_handler::actualizar_documento_endpoint),
                    )
                    .route(
                        "/{id}/eventos",
                        web::get().to(documento_handler::listar_eventos_endpoint),
                    )
                    .route(
                        "/{id}/listo",
                        web::post().to(documento_handler::marcar_listo_endpoint),
                    )
                    .route(
                        "/{id}/entregar",
                        web::post().to(documento_handler::entregar_documento_endpoint),
                    )
                    .route(
                        "/{id}/revertir",
                        web::post().to(documento_handler::revertir_documento_endpoint),
                    )
                    .route(
                        "/{id}/cancelar",
                        web::post().to(documento_handler::cancelar_documento_endpoint),
                    )
                    .route(
                        "/{id}/relaciones",
                        web::get().to(documento_handler::listar_relaciones_endpoint),
                    )
                    .route(
                        "/{id}/relaciones",
                        web::post().to(documento_handler::crear_relacion_endpoint),
                    )
                    .route(
                        "/{id}/notificaciones",
                        web::get().to(notificacion_handler::listar_notificaciones_endpoint),
                    )
                    .route(
                        "/{id}/notificar",
                        web::post().to(notificacion_handler::notificar_documento_endpoint),
                    ),
            )
            .route(
                "/relaciones/{id}",
                web::delete().to(documento_handler::eliminar_relacion_endpoint),
            )
            .service(
                web::scope("/caja")
                    .route(
                        "/documentos/{id}/pagos",
                        web::post().to(caja_handler::registrar_pago_endpoint),
                    )
                    .route(
                        "/documentos/{id}/retenciones",
                        web::post().to(caja_handler::registrar_retencion_endpoint),
                    )
                    .route(
                        "/pendientes",
                        web::get().to(caja_handler::listar_pendientes_endpoint),
                    ),
            )
            .service(
                web::scope("/matrizadores")
                    .route("", web::post().to(matrizador_handler::crear_matrizador_endpoint))
                    .route("", web::get().to(matrizador_handler::listar_matrizadores_endpoint))
                    .route(
                        "/{id}",
                        web::get().to(matrizador_handler::obtener_matrizador_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::put().to(matrizador_handler::actualizar_matrizador_endpoint),
                    )
                    .route(
                        "/{id}/desactivar",
                        web::post().to(matrizador_handler::desactivar_matrizador_endpoint),
                    ),
            )
            .service(
                web::scope("/admin")
                    .route(
                        "/reconciliacion",
                        web::get().to(admin_handler::reconciliacion_endpoint),
                    )
                    .route(
                        "/reconciliacion/corregir",
                        web::post().to(admin_handler::corregir_inconsistencias_endpoint),
                    )
                    .route("/backups", web::post().to(admin_handler::crear_backup_endpoint))
                    .route("/backups", web::get().to(admin_handler::listar_backups_endpoint))
                    .route(
                        "/backups/{nombre}",
                        web::get().to(admin_handler::descargar_backup_endpoint),
                    )
                    .route(
                        "/notificaciones/reintentar",
                        web::post().to(notificacion_handler::reintentar_notificaciones_endpoint),
                    ),
            )
            .service(
                web::scope("/dashboard")
                    .route("/admin", web::get().to(dashboard_handler::dashboard_admin_endpoint))
                    .route("/caja", web::get().to(dashboard_handler::dashboard_caja_endpoint))
                    .route(
                        "/matrizador",
                        web::get().to(dashboard_handler::dashboard_matrizador_endpoint),
                    )
                    .route(
                        "/recepcion",
                        web::get().to(dashboard_handler::dashboard_recepcion_endpoint),
                    )
                    .route(
                        "/archivo",
                        web::get().to(dashboard_handler::dashboard_archivo_endpoint),
                    ),
            ),
    );
}

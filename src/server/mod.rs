//! HTTP layer: route table, shared state and server start-up.

pub mod admin;
pub mod error;
pub mod guard;
pub mod public;


use crate::auth::AdminAuth;
use crate::images::ImageStore;
use crate::server::error::ApiError;
use crate::storage::SqliteStorage;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use tokio::sync::Mutex;
use tracing::info;

/// Registers every route plus JSON/query error handlers.
///
/// `search` and `images` are registered ahead of `/api/vehicles/{id}` so they
/// are not swallowed by the id route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(public::list_vehicles)
    .service(public::search_vehicles)
    .service(public::serve_image)
    .service(public::get_vehicle)
    .service(
        web::scope("/admin/api")
            .service(admin::login)
            .service(admin::upload_images)
            .service(admin::delete_image)
            .service(admin::create_vehicle)
            .service(admin::update_vehicle)
            .service(admin::delete_vehicle),
    );
}

pub async fn run(
    bind_address: &str,
    storage: web::Data<Mutex<SqliteStorage>>,
    auth: web::Data<AdminAuth>,
    images: web::Data<ImageStore>,
) -> std::io::Result<()> {
    info!("Listening on {}", bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(storage.clone())
            .app_data(auth.clone())
            .app_data(images.clone())
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await
}

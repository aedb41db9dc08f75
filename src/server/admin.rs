//! Admin routes under `/admin/api`. Everything except `/login` requires a
//! bearer token (see [`AdminClaims`]).

use crate::auth::AdminAuth;
use crate::images::{ImageStore, image_filenames};
use crate::model::VehicleInput;
use crate::normalizer::{is_canonical, normalize, title_case};
use crate::server::error::{ApiError, ApiResult};
use crate::server::guard::AdminClaims;
use crate::storage::SqliteStorage;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, post, put, web};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Multipart field carrying uploaded photos.
const UPLOAD_FIELD: &str = "files";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[post("/login")]
pub async fn login(auth: web::Data<AdminAuth>, body: web::Json<LoginRequest>) -> ApiResult<HttpResponse> {
    let password = body.into_inner().password;
    let checker = auth.clone();
    web::block(move || checker.verify_password(&password)).await??;

    let token = auth.issue_token()?;
    info!("Admin login succeeded");
    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        message: "Login successful",
    }))
}

#[post("/vehicles")]
pub async fn create_vehicle(
    admin: AdminClaims,
    storage: web::Data<Mutex<SqliteStorage>>,
    body: web::Json<VehicleInput>,
) -> ApiResult<HttpResponse> {
    let mut input = body.into_inner();
    if input.model.trim().is_empty() {
        return Err(ApiError::BadRequest("model must not be blank".to_string()));
    }
    input.make = normalize(&input.make);
    input.model = title_case(&input.model);

    let vehicle = storage.lock().await.insert(&input)?;
    info!(
        "{} created vehicle {}: {} {} {}",
        admin.0.sub, vehicle.id, vehicle.year, vehicle.make, vehicle.model
    );
    Ok(HttpResponse::Ok().json(vehicle))
}

/// Replaces a listing's fields exactly as sent. Unlike creation, make and
/// model are not normalized here; a non-canonical make is only logged.
#[put("/vehicles/{id}")]
pub async fn update_vehicle(
    admin: AdminClaims,
    storage: web::Data<Mutex<SqliteStorage>>,
    id: web::Path<i64>,
    body: web::Json<VehicleInput>,
) -> ApiResult<HttpResponse> {
    let id = id.into_inner();
    let input = body.into_inner();
    if !is_canonical(&input.make) {
        warn!(
            "Vehicle {} updated with make {:?}, stored as given (canonical form: {:?})",
            id,
            input.make,
            normalize(&input.make)
        );
    }

    let vehicle = storage.lock().await.update(id, &input)?.ok_or(ApiError::NotFound)?;
    info!("{} updated vehicle {}", admin.0.sub, id);
    Ok(HttpResponse::Ok().json(vehicle))
}

/// Deletes a listing and, best effort, the photos its details reference.
#[delete("/vehicles/{id}")]
pub async fn delete_vehicle(
    admin: AdminClaims,
    storage: web::Data<Mutex<SqliteStorage>>,
    images: web::Data<ImageStore>,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = id.into_inner();
    let vehicle = storage.lock().await.delete(id)?.ok_or(ApiError::NotFound)?;

    let filenames = image_filenames(vehicle.details_json.as_deref());
    if !filenames.is_empty() {
        let store = images.clone();
        web::block(move || {
            for filename in &filenames {
                if let Err(e) = store.delete(filename) {
                    warn!("Failed to delete image {} of vehicle {}: {}", filename, id, e);
                }
            }
        })
        .await?;
    }

    info!("{} deleted vehicle {}", admin.0.sub, id);
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Vehicle and associated images deleted successfully",
    }))
}

/// Stores every non-empty `files` part and returns the generated names in
/// upload order.
#[post("/vehicles/images/upload")]
pub async fn upload_images(
    _admin: AdminClaims,
    images: web::Data<ImageStore>,
    mut payload: Multipart,
) -> ApiResult<HttpResponse> {
    let mut filenames = Vec::new();

    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut bytes = web::BytesMut::new();
        while let Some(chunk) = field.try_next().await? {
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            continue;
        }

        let store = images.clone();
        let filename = web::block(move || store.save(original_name.as_deref(), &bytes)).await??;
        filenames.push(filename);
    }

    info!("Uploaded {} image(s)", filenames.len());
    Ok(HttpResponse::Ok().json(filenames))
}

#[delete("/vehicles/images/{filename}")]
pub async fn delete_image(
    _admin: AdminClaims,
    images: web::Data<ImageStore>,
    filename: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let filename = filename.into_inner();
    let store = images.clone();
    let name = filename.clone();
    web::block(move || store.delete(&name)).await??;

    info!("Deleted image {}", filename);
    Ok(HttpResponse::Ok().finish())
}

//! Public read-only routes.
//!
//! ```text
//! GET /api/vehicles                    list, optional status/make/minPrice/maxPrice
//! GET /api/vehicles/search?q=&limit=   vehicles then matching brands
//! GET /api/vehicles/images/{filename}  stored listing photo
//! GET /api/vehicles/{id}               single listing
//! ```

use crate::images::ImageStore;
use crate::model::{SearchResult, Vehicle, VehicleFilter};
use crate::search::{DEFAULT_LIMIT, search};
use crate::server::error::{ApiError, ApiResult};
use crate::storage::SqliteStorage;
use actix_files::NamedFile;
use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

/// Browsers may keep listing photos for a week.
const IMAGE_CACHE_CONTROL: &str = "public, max-age=604800";

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<usize>,
}

#[get("/api/vehicles")]
pub async fn list_vehicles(
    storage: web::Data<Mutex<SqliteStorage>>,
    filter: web::Query<VehicleFilter>,
) -> ApiResult<web::Json<Vec<Vehicle>>> {
    let vehicles = storage.lock().await.list(&filter)?;
    Ok(web::Json(vehicles))
}

#[get("/api/vehicles/search")]
pub async fn search_vehicles(
    storage: web::Data<Mutex<SqliteStorage>>,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<Vec<SearchResult>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let results = search(storage.get_ref(), &params.q, limit).await?;
    Ok(web::Json(results))
}

#[get("/api/vehicles/images/{filename}")]
pub async fn serve_image(
    req: HttpRequest,
    images: web::Data<ImageStore>,
    filename: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let path = images.resolve(&filename).map_err(|_| ApiError::NotFound)?;
    let file = NamedFile::open_async(&path).await.map_err(|e| {
        debug!("Image {} not served: {}", filename, e);
        ApiError::NotFound
    })?;

    let mut response = file.into_response(&req);
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(IMAGE_CACHE_CONTROL));
    Ok(response)
}

#[get("/api/vehicles/{id}")]
pub async fn get_vehicle(
    storage: web::Data<Mutex<SqliteStorage>>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Vehicle>> {
    let vehicle = storage.lock().await.get(*id)?.ok_or(ApiError::NotFound)?;
    Ok(web::Json(vehicle))
}

// Core structs: Vehicle, VehicleInput, SearchResult
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A persisted vehicle listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub mileage: i32,
    pub status: String,
    pub condition: String,
    pub details_json: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied fields for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub mileage: i32,
    pub status: String,
    pub condition: String,
    #[serde(default)]
    pub details_json: Option<String>,
}

/// Optional narrowing for the public listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFilter {
    pub status: Option<String>,
    pub make: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandMatch {
    pub make: String,
}

/// One entry of the autocomplete result list.
///
/// Serialized as `{"type": "vehicle", "data": {...}}` or
/// `{"type": "brand", "data": {"make": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum SearchResult {
    Vehicle(Vehicle),
    Brand(BrandMatch),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid image filename: {0:?}")]
    InvalidFilename(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Server misconfiguration: Missing Admin Credentials")]
    MissingCredentials,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("token encoding error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

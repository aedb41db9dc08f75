use crate::auth::{AdminAuth, Claims};
use crate::model::AuthError;
use crate::server::error::ApiError;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures::future::{Ready, ready};

/// Proof that the request carried a valid admin bearer token.
///
/// Taking this as a handler argument gates the route; requests without a
/// valid `Authorization: Bearer <token>` header get a 401.
#[derive(Debug)]
pub struct AdminClaims(pub Claims);

impl FromRequest for AdminClaims {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}

fn authorize(req: &HttpRequest) -> Result<AdminClaims, ApiError> {
    let auth = req
        .app_data::<web::Data<AdminAuth>>()
        .ok_or_else(|| ApiError::Internal("admin auth is not registered".to_string()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?;

    Ok(AdminClaims(auth.verify_token(token)?))
}

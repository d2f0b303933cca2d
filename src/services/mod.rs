pub mod adoption_service;
pub mod animal_service;
pub mod volunteer_service;
pub mod donation_service;
pub mod contact_service;
pub mod user_service;
pub mod dashboard_service;

use actix_web::HttpResponse;
use sea_orm::DbErr;
use std::fmt;

/// Erreurs métier des services, mappées vers HTTP à la frontière des routes
#[derive(Debug)]
pub enum ServiceError {
    Validation(String), // 400
    Auth(String),       // 401
    Forbidden(String),  // 403
    NotFound(String),   // 404
    Conflict(String),   // 409
    Internal(String),   // 500 (hash, token, etc.)
    Db(DbErr),          // 500
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ServiceError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            ServiceError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ServiceError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServiceError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ServiceError::Db(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        ServiceError::Db(e)
    }
}

impl ServiceError {
    /// Mappe l'erreur vers une réponse JSON avec le bon status code
    pub fn to_response(&self) -> HttpResponse {
        match self {
            ServiceError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": msg
            })),
            ServiceError::Auth(msg) => HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "error": msg
            })),
            ServiceError::Forbidden(msg) => HttpResponse::Forbidden().json(serde_json::json!({
                "success": false,
                "error": msg
            })),
            ServiceError::NotFound(msg) => HttpResponse::NotFound().json(serde_json::json!({
                "success": false,
                "error": msg
            })),
            ServiceError::Conflict(msg) => HttpResponse::Conflict().json(serde_json::json!({
                "success": false,
                "error": msg
            })),
            ServiceError::Internal(msg) => {
                eprintln!("❌ Internal error: {}", msg);
                internal_error_response(msg)
            }
            ServiceError::Db(e) => {
                eprintln!("❌ Database error: {}", e);
                internal_error_response(&e.to_string())
            }
        }
    }
}

// Le détail brut n'est exposé qu'en build de développement
#[cfg(debug_assertions)]
fn internal_error_response(detail: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({
        "success": false,
        "error": "Internal server error",
        "detail": detail
    }))
}

#[cfg(not(debug_assertions))]
fn internal_error_response(_detail: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({
        "success": false,
        "error": "Internal server error"
    }))
}

use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::user_service::UserService;

// DTO pour l'inscription
#[derive(Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub firstname: String,
    #[validate(length(min = 1, max = 100))]
    pub lastname: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Réponse après login/register
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i32,
    pub email: String,
    pub role: String,
}

/// POST /api/auth/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Validation failed",
            "details": errors
        }));
    }

    let body = body.into_inner();

    match UserService::register(
        db.get_ref(),
        body.firstname,
        body.lastname,
        body.email,
        body.phone,
        body.password,
    )
    .await
    {
        Ok((user, token)) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Account created",
            "data": AuthResponse {
                token,
                user_id: user.id,
                email: user.email,
                role: user.role,
            }
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /api/auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match UserService::authenticate(db.get_ref(), &body.email, &body.password).await {
        Ok((user, token)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Logged in",
            "data": AuthResponse {
                token,
                user_id: user.id,
                email: user.email,
                role: user.role,
            }
        })),
        Err(e) => e.to_response(),
    }
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
    );
}

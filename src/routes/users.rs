use actix_web::{delete, get, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::middleware::{AdminUser, AuthUser};
use crate::models::dto::{UpdateProfileRequest, UpdateRoleRequest};
use crate::services::user_service::UserService;

/// GET /api/profile - Profil de l'utilisateur connecté (PROTÉGÉE)
#[get("")]
pub async fn get_profile(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match UserService::get(db.get_ref(), auth_user.user_id).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": user
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /api/profile - Mise à jour du profil (PROTÉGÉE)
#[put("")]
pub async fn update_profile(
    auth_user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Validation failed",
            "details": errors
        }));
    }

    match UserService::update_profile(db.get_ref(), auth_user.user_id, body.into_inner()).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Profile updated",
            "data": user
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/admin/users - Tous les utilisateurs (ADMIN)
#[get("")]
pub async fn list_users(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match UserService::list(db.get_ref()).await {
        Ok(users) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": users
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/admin/users/stats - Compteurs par rôle (ADMIN)
#[get("/stats")]
pub async fn user_stats(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match UserService::stats(db.get_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": stats
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /api/admin/users/{id}/role - Changer le rôle d'un compte (ADMIN)
#[put("/{id}/role")]
pub async fn update_role(
    admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<UpdateRoleRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Validation failed",
            "details": errors
        }));
    }

    let target_id = path.into_inner();

    match UserService::update_role(db.get_ref(), admin.0.user_id, target_id, body.into_inner().role)
        .await
    {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Role updated",
            "data": user
        })),
        Err(e) => e.to_response(),
    }
}

/// DELETE /api/admin/users/{id} - Supprimer un compte (ADMIN)
#[delete("/{id}")]
pub async fn delete_user(
    admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match UserService::delete(db.get_ref(), admin.0.user_id, path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "User deleted"
        })),
        Err(e) => e.to_response(),
    }
}

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/profile")
            .service(get_profile)
            .service(update_profile)
    );
    cfg.service(
        web::scope("/admin/users")
            .service(user_stats)
            .service(list_users)
            .service(update_role)
            .service(delete_user)
    );
}

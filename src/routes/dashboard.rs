use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::middleware::{AdminUser, AuthUser};
use crate::services::dashboard_service::DashboardService;

/// GET /api/dashboard - Synthèse de l'utilisateur connecté (PROTÉGÉE)
#[get("/dashboard")]
pub async fn user_dashboard(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match DashboardService::user_dashboard(db.get_ref(), auth_user.user_id).await {
        Ok(dashboard) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": dashboard
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/admin/dashboard - Synthèse globale (ADMIN)
#[get("/admin/dashboard")]
pub async fn admin_dashboard(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match DashboardService::admin_dashboard(db.get_ref()).await {
        Ok(dashboard) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": dashboard
        })),
        Err(e) => e.to_response(),
    }
}

pub fn dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(user_dashboard);
    cfg.service(admin_dashboard);
}

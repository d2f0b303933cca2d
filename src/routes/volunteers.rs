use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::middleware::AdminUser;
use crate::models::dto::{CreateVolunteerRequest, UpdateStatusRequest};
use crate::services::volunteer_service::VolunteerService;

#[derive(Deserialize)]
pub struct VolunteerListQuery {
    pub status: Option<String>,
    pub city: Option<String>,
}

/// POST /api/volunteers/apply - Candidature bénévole (PUBLIC)
#[post("/apply")]
pub async fn apply(
    body: web::Json<CreateVolunteerRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Validation failed",
            "details": errors
        }));
    }

    match VolunteerService::apply(db.get_ref(), body.into_inner()).await {
        Ok(volunteer) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Application submitted",
            "data": volunteer
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/volunteers/status/{email} - Statut d'une candidature (PUBLIC)
#[get("/status/{email}")]
pub async fn application_status(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match VolunteerService::status_by_email(db.get_ref(), &path.into_inner()).await {
        Ok(volunteer) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": {
                "email": volunteer.email,
                "status": volunteer.status
            }
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/admin/volunteers - Toutes les candidatures (ADMIN)
#[get("")]
pub async fn list_volunteers(
    _admin: AdminUser,
    query: web::Query<VolunteerListQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let query = query.into_inner();

    match VolunteerService::list(db.get_ref(), query.status, query.city).await {
        Ok(volunteers) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": volunteers
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/admin/volunteers/stats - Compteurs par statut (ADMIN)
#[get("/stats")]
pub async fn volunteer_stats(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match VolunteerService::stats(db.get_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": stats
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /api/admin/volunteers/{id}/status - Décision sur une candidature (ADMIN)
#[put("/{id}/status")]
pub async fn update_volunteer_status(
    _admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<UpdateStatusRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match VolunteerService::update_status(db.get_ref(), path.into_inner(), body.into_inner().status)
        .await
    {
        Ok(volunteer) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Status updated",
            "data": volunteer
        })),
        Err(e) => e.to_response(),
    }
}

/// DELETE /api/admin/volunteers/{id} - Supprimer une candidature (ADMIN)
#[delete("/{id}")]
pub async fn delete_volunteer(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match VolunteerService::delete(db.get_ref(), path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Application deleted"
        })),
        Err(e) => e.to_response(),
    }
}

pub fn volunteer_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/volunteers")
            .service(apply)
            .service(application_status)
    );
    cfg.service(
        web::scope("/admin/volunteers")
            .service(volunteer_stats)
            .service(list_volunteers)
            .service(update_volunteer_status)
            .service(delete_volunteer)
    );
}

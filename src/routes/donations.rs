use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::middleware::{AdminUser, AuthUser};
use crate::models::dto::{
    CreateAnonymousDonationRequest, CreateDonationRequest, UpdateStatusRequest,
};
use crate::services::donation_service::DonationService;

#[derive(Deserialize)]
pub struct DonationListQuery {
    pub status: Option<String>,
}

/// POST /api/donations - Don d'un utilisateur connecté (PROTÉGÉE)
#[post("")]
pub async fn create_donation(
    auth_user: AuthUser,
    body: web::Json<CreateDonationRequest>,
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

    match DonationService::create(
        db.get_ref(),
        Some(auth_user.user_id),
        None,
        Some(auth_user.email),
        body.amount,
        body.message,
    )
    .await
    {
        Ok(donation) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Donation recorded",
            "data": donation
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /api/donations/anonymous - Don anonyme (PUBLIC)
#[post("/anonymous")]
pub async fn create_anonymous_donation(
    body: web::Json<CreateAnonymousDonationRequest>,
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

    match DonationService::create(
        db.get_ref(),
        None,
        Some(body.donor_name),
        Some(body.email),
        body.amount,
        body.message,
    )
    .await
    {
        Ok(donation) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Donation recorded",
            "data": donation
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/my-donations - Mes dons (PROTÉGÉE)
#[get("/my-donations")]
pub async fn my_donations(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match DonationService::list_for_user(db.get_ref(), auth_user.user_id).await {
        Ok(donations) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": donations
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/donations/{id} - Un don (auteur ou admin) (PROTÉGÉE)
#[get("/{id}")]
pub async fn get_donation(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match DonationService::get_for_requester(
        db.get_ref(),
        path.into_inner(),
        auth_user.user_id,
        auth_user.is_admin(),
    )
    .await
    {
        Ok(donation) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": donation
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/admin/donations - Tous les dons, filtre statut optionnel (ADMIN)
#[get("")]
pub async fn list_donations(
    _admin: AdminUser,
    query: web::Query<DonationListQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match DonationService::list_all(db.get_ref(), query.into_inner().status).await {
        Ok(donations) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": donations
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/admin/donations/stats - Compteurs + total complété (ADMIN)
#[get("/stats")]
pub async fn donation_stats(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match DonationService::stats(db.get_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": stats
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /api/admin/donations/{id}/status - Changer le statut d'un don (ADMIN)
#[put("/{id}/status")]
pub async fn update_donation_status(
    _admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<UpdateStatusRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match DonationService::update_status(db.get_ref(), path.into_inner(), body.into_inner().status)
        .await
    {
        Ok(donation) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Status updated",
            "data": donation
        })),
        Err(e) => e.to_response(),
    }
}

/// DELETE /api/admin/donations/{id} - Supprimer un don (ADMIN)
/// Refusé pour un don 'completed'
#[delete("/{id}")]
pub async fn delete_donation(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match DonationService::delete(db.get_ref(), path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Donation deleted"
        })),
        Err(e) => e.to_response(),
    }
}

pub fn donation_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(my_donations);
    cfg.service(
        web::scope("/donations")
            .service(create_donation)
            .service(create_anonymous_donation)
            .service(get_donation)
    );
    cfg.service(
        web::scope("/admin/donations")
            .service(donation_stats)
            .service(list_donations)
            .service(update_donation_status)
            .service(delete_donation)
    );
}

use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::middleware::{AdminUser, AuthUser};
use crate::models::dto::{CreateAdoptionRequest, DecideAdoptionRequest};
use crate::services::adoption_service::AdoptionService;

#[derive(Deserialize)]
pub struct AdoptionListQuery {
    pub status: Option<String>,
}

/// POST /api/adoptions - Déposer une demande d'adoption (PROTÉGÉE)
#[post("")]
pub async fn create_adoption(
    auth_user: AuthUser,
    body: web::Json<CreateAdoptionRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Validation failed",
            "details": errors
        }));
    }

    match AdoptionService::create(db.get_ref(), auth_user.user_id, body.into_inner()).await {
        Ok(request) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Adoption request submitted",
            "data": request
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/my-adoptions - Mes demandes d'adoption (PROTÉGÉE)
#[get("/my-adoptions")]
pub async fn my_adoptions(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AdoptionService::list_for_user(db.get_ref(), auth_user.user_id).await {
        Ok(requests) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": requests
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/adoptions/{id} - Une demande (propriétaire ou admin) (PROTÉGÉE)
#[get("/{id}")]
pub async fn get_adoption(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AdoptionService::get_for_requester(
        db.get_ref(),
        path.into_inner(),
        auth_user.user_id,
        auth_user.is_admin(),
    )
    .await
    {
        Ok(request) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": request
        })),
        Err(e) => e.to_response(),
    }
}

/// DELETE /api/adoptions/{id} - Annuler sa propre demande 'pending' (PROTÉGÉE)
#[delete("/{id}")]
pub async fn cancel_adoption(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AdoptionService::cancel(db.get_ref(), path.into_inner(), auth_user.user_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Adoption request cancelled"
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/admin/adoptions - Toutes les demandes, filtre statut optionnel (ADMIN)
#[get("")]
pub async fn list_adoptions(
    _admin: AdminUser,
    query: web::Query<AdoptionListQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AdoptionService::list_all(db.get_ref(), query.into_inner().status).await {
        Ok(requests) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": requests
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/admin/adoptions/stats - Compteurs par statut (ADMIN)
#[get("/stats")]
pub async fn adoption_stats(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AdoptionService::stats(db.get_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": stats
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /api/admin/adoptions/{id} - Décision admin (ADMIN)
/// Corps: {"status": "approved"|"rejected", "admin_comment": "..."}
/// L'approbation rejette les demandes sœurs et bascule l'animal en 'adopted',
/// le tout dans une seule transaction.
#[put("/{id}")]
pub async fn decide_adoption(
    _admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<DecideAdoptionRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Validation failed",
            "details": errors
        }));
    }

    match AdoptionService::decide(db.get_ref(), path.into_inner(), body.into_inner()).await {
        Ok(request) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Decision recorded",
            "data": request
        })),
        Err(e) => e.to_response(),
    }
}

pub fn adoption_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(my_adoptions);
    cfg.service(
        web::scope("/adoptions")
            .service(create_adoption)
            .service(get_adoption)
            .service(cancel_adoption)
    );
    cfg.service(
        web::scope("/admin/adoptions")
            .service(adoption_stats)
            .service(list_adoptions)
            .service(decide_adoption)
    );
}

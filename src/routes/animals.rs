use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::middleware::AdminUser;
use crate::models::dto::{
    AnimalSearchQuery, CreateAnimalRequest, UpdateAnimalRequest, UpdateStatusRequest,
};
use crate::services::animal_service::AnimalService;

/// GET /api/animals - Tous les animaux (PUBLIC)
#[get("")]
pub async fn list_animals(db: web::Data<DatabaseConnection>) -> HttpResponse {
    match AnimalService::list(db.get_ref()).await {
        Ok(animals) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": animals
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/animals/search - Recherche par filtres conjonctifs (PUBLIC)
/// Ex: /api/animals/search?species=chien&city=montreal&min_age=1&max_age=5
#[get("/search")]
pub async fn search_animals(
    query: web::Query<AnimalSearchQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AnimalService::search(db.get_ref(), query.into_inner()).await {
        Ok(animals) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": animals
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/animals/{id} - Fiche d'un animal (PUBLIC)
#[get("/{id}")]
pub async fn get_animal(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AnimalService::get(db.get_ref(), path.into_inner()).await {
        Ok(animal) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": animal
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /api/admin/animals - Ajouter un animal (ADMIN)
#[post("")]
pub async fn create_animal(
    _admin: AdminUser,
    body: web::Json<CreateAnimalRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Validation failed",
            "details": errors
        }));
    }

    match AnimalService::create(db.get_ref(), body.into_inner()).await {
        Ok(animal) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Animal created",
            "data": animal
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/admin/animals/stats - Compteurs par statut (ADMIN)
#[get("/stats")]
pub async fn animal_stats(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AnimalService::stats(db.get_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": stats
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /api/admin/animals/{id} - Mise à jour partielle (ADMIN)
#[put("/{id}")]
pub async fn update_animal(
    _admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<UpdateAnimalRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Validation failed",
            "details": errors
        }));
    }

    match AnimalService::update(db.get_ref(), path.into_inner(), body.into_inner()).await {
        Ok(animal) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Animal updated",
            "data": animal
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /api/admin/animals/{id}/status - Changement manuel de statut (ADMIN)
/// C'est l'échappatoire pour remettre un animal 'adopted' en 'available'
#[put("/{id}/status")]
pub async fn update_animal_status(
    _admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<UpdateStatusRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AnimalService::update_status(db.get_ref(), path.into_inner(), body.into_inner().status)
        .await
    {
        Ok(animal) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Status updated",
            "data": animal
        })),
        Err(e) => e.to_response(),
    }
}

/// DELETE /api/admin/animals/{id} - Supprimer un animal (ADMIN)
/// Refusé tant qu'une demande d'adoption 'pending' le référence
#[delete("/{id}")]
pub async fn delete_animal(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AnimalService::delete(db.get_ref(), path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Animal deleted"
        })),
        Err(e) => e.to_response(),
    }
}

pub fn animal_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/animals")
            .service(list_animals)
            .service(search_animals)
            .service(get_animal)
    );
    cfg.service(
        web::scope("/admin/animals")
            .service(create_animal)
            .service(animal_stats)
            .service(update_animal_status)
            .service(update_animal)
            .service(delete_animal)
    );
}

use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::middleware::{AdminUser, AuthUser};
use crate::models::dto::{
    CreateAnonymousContactRequest, CreateContactRequest, UpdateStatusRequest,
};
use crate::services::contact_service::ContactService;
use crate::services::user_service::UserService;

#[derive(Deserialize)]
pub struct ContactListQuery {
    pub status: Option<String>,
}

/// POST /api/contact - Message d'un utilisateur connecté (PROTÉGÉE)
/// Le nom et l'email sont repris du compte
#[post("")]
pub async fn create_contact(
    auth_user: AuthUser,
    body: web::Json<CreateContactRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Validation failed",
            "details": errors
        }));
    }

    let user = match UserService::get(db.get_ref(), auth_user.user_id).await {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };

    let body = body.into_inner();
    let name = format!("{} {}", user.firstname, user.lastname);

    match ContactService::create(
        db.get_ref(),
        Some(user.id),
        name,
        user.email,
        body.subject,
        body.message,
    )
    .await
    {
        Ok(message) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Message sent",
            "data": message
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /api/contact/anonymous - Message anonyme (PUBLIC)
#[post("/anonymous")]
pub async fn create_anonymous_contact(
    body: web::Json<CreateAnonymousContactRequest>,
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

    match ContactService::create(
        db.get_ref(),
        None,
        body.name,
        body.email,
        body.subject,
        body.message,
    )
    .await
    {
        Ok(message) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Message sent",
            "data": message
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/my-contacts - Mes messages (PROTÉGÉE)
#[get("/my-contacts")]
pub async fn my_contacts(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match ContactService::list_for_user(db.get_ref(), auth_user.user_id).await {
        Ok(messages) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": messages
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /api/admin/contact - Tous les messages, filtre statut optionnel (ADMIN)
#[get("")]
pub async fn list_contacts(
    _admin: AdminUser,
    query: web::Query<ContactListQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match ContactService::list_all(db.get_ref(), query.into_inner().status).await {
        Ok(messages) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": messages
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /api/admin/contact/{id}/status - Marquer lu/fermé (ADMIN)
#[put("/{id}/status")]
pub async fn update_contact_status(
    _admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<UpdateStatusRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match ContactService::update_status(db.get_ref(), path.into_inner(), body.into_inner().status)
        .await
    {
        Ok(message) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Status updated",
            "data": message
        })),
        Err(e) => e.to_response(),
    }
}

/// DELETE /api/admin/contact/{id} - Supprimer un message (ADMIN)
#[delete("/{id}")]
pub async fn delete_contact(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match ContactService::delete(db.get_ref(), path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Message deleted"
        })),
        Err(e) => e.to_response(),
    }
}

pub fn contact_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(my_contacts);
    cfg.service(
        web::scope("/contact")
            .service(create_contact)
            .service(create_anonymous_contact)
    );
    cfg.service(
        web::scope("/admin/contact")
            .service(list_contacts)
            .service(update_contact_status)
            .service(delete_contact)
    );
}

use actix_web::{dev::Payload, Error, FromRequest, HttpRequest, HttpResponse};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::utils::jwt;

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

fn unauthorized(message: &str) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "success": false,
        "error": message
    }));
    actix_web::error::InternalError::from_response("", response).into()
}

/// Implémentation de FromRequest pour AuthUser
/// Cela permet à Actix-Web d'extraire automatiquement AuthUser des requêtes
impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // 1. Extraire le header Authorization
        let auth_header = match req.headers().get("Authorization") {
            Some(header) => header,
            None => return ready(Err(unauthorized("Missing Authorization header"))),
        };

        // 2. Convertir le header en string
        let auth_str = match auth_header.to_str() {
            Ok(s) => s,
            Err(_) => return ready(Err(unauthorized("Invalid Authorization header"))),
        };

        // 3. Extraire le token (format: "Bearer <token>")
        let token = if auth_str.starts_with("Bearer ") {
            &auth_str[7..]
        } else {
            return ready(Err(unauthorized(
                "Invalid Authorization format (expected: Bearer <token>)",
            )));
        };

        // 4. Vérifier le token JWT
        let claims = match jwt::verify_token(token) {
            Ok(claims) => claims,
            Err(_) => return ready(Err(unauthorized("Invalid or expired token"))),
        };

        // 5. Créer et retourner AuthUser
        ready(Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }))
    }
}

/// Extracteur pour les routes /admin/* : authentification + vérification du rôle
/// Répond 403 si l'utilisateur authentifié n'est pas admin
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth_user = match AuthUser::from_request(req, payload).into_inner() {
            Ok(user) => user,
            Err(e) => return ready(Err(e)),
        };

        if !auth_user.is_admin() {
            let response = HttpResponse::Forbidden().json(serde_json::json!({
                "success": false,
                "error": "Admin role required"
            }));
            return ready(Err(
                actix_web::error::InternalError::from_response("", response).into()
            ));
        }

        ready(Ok(AdminUser(auth_user)))
    }
}

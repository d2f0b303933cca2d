use sea_orm::*;
use chrono::Utc;

use crate::models::users;
use crate::models::dto::UpdateProfileRequest;
use crate::services::ServiceError;
use crate::utils::{jwt, password};

pub struct UserService;

pub const ROLES: [&str; 2] = ["user", "admin"];

#[derive(Debug, serde::Serialize)]
pub struct UserStats {
    pub users: u64,
    pub admins: u64,
    pub total: u64,
}

impl UserService {
    /// Crée un compte (role = user) et retourne le modèle + un JWT.
    /// L'email est unique et stocké en minuscules.
    pub async fn register(
        db: &DatabaseConnection,
        firstname: String,
        lastname: String,
        email: String,
        phone: Option<String>,
        plain_password: String,
    ) -> Result<(users::Model, String), ServiceError> {
        if let Some(p) = &phone {
            if !crate::models::dto::is_valid_phone(p) {
                return Err(ServiceError::Validation(
                    "Invalid phone number format".to_string(),
                ));
            }
        }

        let email = email.trim().to_lowercase();

        // 1. Vérifier si l'email est déjà pris
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(db)
            .await?;

        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "An account already exists for {}",
                email
            )));
        }

        // 2. Hasher le mot de passe
        let password_hash = password::hash_password(&plain_password)
            .map_err(ServiceError::Internal)?;

        // 3. Créer l'utilisateur
        let new_user = users::ActiveModel {
            firstname: Set(firstname.trim().to_string()),
            lastname: Set(lastname.trim().to_string()),
            email: Set(email),
            phone: Set(phone.map(|p| p.trim().to_string())),
            password_hash: Set(password_hash),
            role: Set("user".to_string()),
            created_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        };

        let user = new_user.insert(db).await?;

        // 4. Générer le JWT
        let token = jwt::generate_token(user.id, &user.email, &user.role)
            .map_err(ServiceError::Internal)?;

        Ok((user, token))
    }

    /// Vérifie les identifiants et retourne le modèle + un JWT.
    /// Même message d'erreur que l'email existe ou non.
    pub async fn authenticate(
        db: &DatabaseConnection,
        email: &str,
        plain_password: &str,
    ) -> Result<(users::Model, String), ServiceError> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::Auth("Invalid email or password".to_string()))?;

        let is_valid = password::verify_password(plain_password, &user.password_hash)
            .map_err(ServiceError::Internal)?;

        if !is_valid {
            return Err(ServiceError::Auth("Invalid email or password".to_string()));
        }

        let token = jwt::generate_token(user.id, &user.email, &user.role)
            .map_err(ServiceError::Internal)?;

        Ok((user, token))
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<users::Model, ServiceError> {
        users::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
    }

    /// Mise à jour du profil: seuls les champs fournis sont modifiés.
    /// Un changement d'email revérifie l'unicité.
    pub async fn update_profile(
        db: &DatabaseConnection,
        user_id: i32,
        request: UpdateProfileRequest,
    ) -> Result<users::Model, ServiceError> {
        if let Some(p) = &request.phone {
            if !crate::models::dto::is_valid_phone(p) {
                return Err(ServiceError::Validation(
                    "Invalid phone number format".to_string(),
                ));
            }
        }

        let user = Self::get(db, user_id).await?;

        let new_email = request.email.map(|e| e.trim().to_lowercase());
        if let Some(email) = &new_email {
            if *email != user.email {
                let taken = users::Entity::find()
                    .filter(users::Column::Email.eq(email.as_str()))
                    .one(db)
                    .await?;

                if taken.is_some() {
                    return Err(ServiceError::Conflict(format!(
                        "An account already exists for {}",
                        email
                    )));
                }
            }
        }

        let mut active: users::ActiveModel = user.into();

        if let Some(firstname) = request.firstname {
            active.firstname = Set(firstname.trim().to_string());
        }
        if let Some(lastname) = request.lastname {
            active.lastname = Set(lastname.trim().to_string());
        }
        if let Some(email) = new_email {
            active.email = Set(email);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone.trim().to_string()));
        }

        Ok(active.update(db).await?)
    }

    /// Liste admin, plus récents d'abord
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<users::Model>, ServiceError> {
        let all_users = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .all(db)
            .await?;

        Ok(all_users)
    }

    /// Changement de rôle par un admin. Le rôle stocké est la seule source
    /// de vérité. Un admin ne peut pas se rétrograder lui-même.
    pub async fn update_role(
        db: &DatabaseConnection,
        admin_id: i32,
        target_id: i32,
        role: String,
    ) -> Result<users::Model, ServiceError> {
        if !ROLES.contains(&role.as_str()) {
            return Err(ServiceError::Validation(format!(
                "Invalid role '{}'. Must be one of: {}",
                role,
                ROLES.join(", ")
            )));
        }

        if target_id == admin_id && role != "admin" {
            return Err(ServiceError::Forbidden(
                "You cannot demote your own account".to_string(),
            ));
        }

        let user = Self::get(db, target_id).await?;
        let mut active: users::ActiveModel = user.into();
        active.role = Set(role);

        Ok(active.update(db).await?)
    }

    /// Suppression d'un compte par un admin (pas le sien)
    pub async fn delete(
        db: &DatabaseConnection,
        admin_id: i32,
        target_id: i32,
    ) -> Result<(), ServiceError> {
        if target_id == admin_id {
            return Err(ServiceError::Forbidden(
                "You cannot delete your own account".to_string(),
            ));
        }

        Self::get(db, target_id).await?;
        users::Entity::delete_by_id(target_id).exec(db).await?;
        Ok(())
    }

    pub async fn stats(db: &DatabaseConnection) -> Result<UserStats, ServiceError> {
        let (regular, admins) = futures::try_join!(
            users::Entity::find()
                .filter(users::Column::Role.eq("user"))
                .count(db),
            users::Entity::find()
                .filter(users::Column::Role.eq("admin"))
                .count(db),
        )?;

        Ok(UserStats {
            users: regular,
            admins,
            total: regular + admins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user_model(id: i32, email: &str, password_hash: &str, role: &str) -> users::Model {
        users::Model {
            id,
            firstname: "Alice".to_string(),
            lastname: "Martin".to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: password_hash.to_string(),
            role: role.to_string(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, "alice@exemple.com", "h", "user")]])
            .into_connection();

        let result = UserService::register(
            &db,
            "Alice".to_string(),
            "Martin".to_string(),
            "Alice@Exemple.com".to_string(),
            None,
            "motdepasse".to_string(),
        )
        .await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();

        let result = UserService::authenticate(&db, "inconnu@exemple.com", "x").await;

        assert!(matches!(result, Err(ServiceError::Auth(_))));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let hash = password::hash_password("le-bon-mot-de-passe").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, "alice@exemple.com", &hash, "user")]])
            .into_connection();

        let result = UserService::authenticate(&db, "alice@exemple.com", "mauvais").await;

        assert!(matches!(result, Err(ServiceError::Auth(_))));
    }

    #[tokio::test]
    async fn test_authenticate_success_returns_token() {
        let hash = password::hash_password("le-bon-mot-de-passe").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, "alice@exemple.com", &hash, "user")]])
            .into_connection();

        let (user, token) = UserService::authenticate(&db, "alice@exemple.com", "le-bon-mot-de-passe")
            .await
            .unwrap();

        assert_eq!(user.id, 1);
        let claims = jwt::verify_token(&token).unwrap();
        assert_eq!(claims.sub, 1);
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn test_update_role_refuses_self_demotion() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = UserService::update_role(&db, 5, 5, "user".to_string()).await;

        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_role_rejects_unknown_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = UserService::update_role(&db, 5, 6, "superadmin".to_string()).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, "alice@exemple.com", "h", "user")]])
            .append_query_results([vec![user_model(2, "bob@exemple.com", "h", "user")]])
            .into_connection();

        let request = UpdateProfileRequest {
            firstname: None,
            lastname: None,
            email: Some("bob@exemple.com".to_string()),
            phone: None,
        };
        let result = UserService::update_profile(&db, 1, request).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_refuses_own_account() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = UserService::delete(&db, 5, 5).await;

        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }
}

use sea_orm::*;
use chrono::Utc;

use crate::models::contact;
use crate::services::ServiceError;

pub struct ContactService;

pub const CONTACT_STATUSES: [&str; 3] = ["new", "read", "closed"];

impl ContactService {
    /// Enregistre un message de contact. user_id est None pour un message
    /// anonyme (nom et email fournis par le DTO anonyme).
    pub async fn create(
        db: &DatabaseConnection,
        user_id: Option<i32>,
        name: String,
        email: String,
        subject: String,
        message: String,
    ) -> Result<contact::Model, ServiceError> {
        let new_message = contact::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.trim().to_string()),
            email: Set(email.trim().to_lowercase()),
            subject: Set(subject.trim().to_string()),
            message: Set(message.trim().to_string()),
            status: Set("new".to_string()),
            created_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        };

        Ok(new_message.insert(db).await?)
    }

    /// Messages d'un utilisateur, plus récents d'abord
    pub async fn list_for_user(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<contact::Model>, ServiceError> {
        let messages = contact::Entity::find()
            .filter(contact::Column::UserId.eq(user_id))
            .order_by_desc(contact::Column::CreatedAt)
            .order_by_desc(contact::Column::Id)
            .all(db)
            .await?;

        Ok(messages)
    }

    /// Liste admin, filtre optionnel sur le statut
    pub async fn list_all(
        db: &DatabaseConnection,
        status: Option<String>,
    ) -> Result<Vec<contact::Model>, ServiceError> {
        let mut select = contact::Entity::find();

        if let Some(status) = status {
            select = select.filter(contact::Column::Status.eq(status));
        }

        let messages = select
            .order_by_desc(contact::Column::CreatedAt)
            .order_by_desc(contact::Column::Id)
            .all(db)
            .await?;

        Ok(messages)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<contact::Model, ServiceError> {
        contact::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Contact message {} not found", id)))
    }

    pub async fn update_status(
        db: &DatabaseConnection,
        id: i32,
        status: String,
    ) -> Result<contact::Model, ServiceError> {
        if !CONTACT_STATUSES.contains(&status.as_str()) {
            return Err(ServiceError::Validation(format!(
                "Invalid status '{}'. Must be one of: {}",
                status,
                CONTACT_STATUSES.join(", ")
            )));
        }

        let message = Self::get(db, id).await?;
        let mut active: contact::ActiveModel = message.into();
        active.status = Set(status);

        Ok(active.update(db).await?)
    }

    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
        Self::get(db, id).await?;
        contact::Entity::delete_by_id(id).exec(db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn contact_model(id: i32, status: &str) -> contact::Model {
        contact::Model {
            id,
            user_id: None,
            name: "Jean".to_string(),
            email: "jean@exemple.com".to_string(),
            subject: "Horaires".to_string(),
            message: "Quand puis-je passer au refuge?".to_string(),
            status: status.to_string(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_new_message_starts_as_new() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![contact_model(1, "new")]])
            .into_connection();

        let result = ContactService::create(
            &db,
            None,
            "Jean".to_string(),
            "Jean@Exemple.com".to_string(),
            "Horaires".to_string(),
            "Quand puis-je passer au refuge?".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(result.status, "new");
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = ContactService::update_status(&db, 1, "archived".to_string()).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<contact::Model>::new()])
            .into_connection();

        let result = ContactService::get(&db, 404).await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}

use sea_orm::*;
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr};
use chrono::Utc;

use crate::models::volunteer;
use crate::models::dto::CreateVolunteerRequest;
use crate::services::ServiceError;

pub struct VolunteerService;

pub const VOLUNTEER_STATUSES: [&str; 3] = ["pending", "approved", "rejected"];

#[derive(Debug, serde::Serialize)]
pub struct VolunteerStats {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub total: u64,
}

impl VolunteerService {
    /// Candidature bénévole publique. L'email est unique: une deuxième
    /// candidature avec le même email est refusée (Conflict).
    pub async fn apply(
        db: &DatabaseConnection,
        request: CreateVolunteerRequest,
    ) -> Result<volunteer::Model, ServiceError> {
        if !crate::models::dto::is_valid_phone(&request.phone) {
            return Err(ServiceError::Validation(
                "Invalid phone number format".to_string(),
            ));
        }

        let email = request.email.trim().to_lowercase();

        // 1. Vérifier si une candidature existe déjà pour cet email
        let existing = volunteer::Entity::find()
            .filter(volunteer::Column::Email.eq(&email))
            .one(db)
            .await?;

        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A volunteer application already exists for {}",
                email
            )));
        }

        // 2. Insérer la candidature (status = pending)
        let new_volunteer = volunteer::ActiveModel {
            firstname: Set(request.firstname.trim().to_string()),
            lastname: Set(request.lastname.trim().to_string()),
            email: Set(email),
            phone: Set(request.phone.trim().to_string()),
            city: Set(request.city.trim().to_string()),
            availability: Set(request.availability.map(|a| a.trim().to_string())),
            motivation: Set(request.motivation.map(|m| m.trim().to_string())),
            status: Set("pending".to_string()),
            created_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        };

        Ok(new_volunteer.insert(db).await?)
    }

    /// Consultation publique du statut d'une candidature par email
    pub async fn status_by_email(
        db: &DatabaseConnection,
        email: &str,
    ) -> Result<volunteer::Model, ServiceError> {
        volunteer::Entity::find()
            .filter(volunteer::Column::Email.eq(email.trim().to_lowercase()))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No volunteer application found for {}", email))
            })
    }

    /// Liste admin: filtres optionnels statut (égalité) et ville (sous-chaîne)
    pub async fn list(
        db: &DatabaseConnection,
        status: Option<String>,
        city: Option<String>,
    ) -> Result<Vec<volunteer::Model>, ServiceError> {
        let mut select = volunteer::Entity::find();

        if let Some(status) = status {
            select = select.filter(volunteer::Column::Status.eq(status));
        }
        if let Some(city) = city {
            select = select.filter(Expr::col(volunteer::Column::City).ilike(format!("%{}%", city)));
        }

        let volunteers = select
            .order_by_desc(volunteer::Column::CreatedAt)
            .order_by_desc(volunteer::Column::Id)
            .all(db)
            .await?;

        Ok(volunteers)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<volunteer::Model, ServiceError> {
        volunteer::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Volunteer application {} not found", id)))
    }

    pub async fn update_status(
        db: &DatabaseConnection,
        id: i32,
        status: String,
    ) -> Result<volunteer::Model, ServiceError> {
        if !VOLUNTEER_STATUSES.contains(&status.as_str()) {
            return Err(ServiceError::Validation(format!(
                "Invalid status '{}'. Must be one of: {}",
                status,
                VOLUNTEER_STATUSES.join(", ")
            )));
        }

        let volunteer_model = Self::get(db, id).await?;
        let mut active: volunteer::ActiveModel = volunteer_model.into();
        active.status = Set(status);

        Ok(active.update(db).await?)
    }

    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
        Self::get(db, id).await?;
        volunteer::Entity::delete_by_id(id).exec(db).await?;
        Ok(())
    }

    pub async fn stats(db: &DatabaseConnection) -> Result<VolunteerStats, ServiceError> {
        let (pending, approved, rejected) = futures::try_join!(
            volunteer::Entity::find()
                .filter(volunteer::Column::Status.eq("pending"))
                .count(db),
            volunteer::Entity::find()
                .filter(volunteer::Column::Status.eq("approved"))
                .count(db),
            volunteer::Entity::find()
                .filter(volunteer::Column::Status.eq("rejected"))
                .count(db),
        )?;

        Ok(VolunteerStats {
            pending,
            approved,
            rejected,
            total: pending + approved + rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn volunteer_model(id: i32, email: &str, status: &str) -> volunteer::Model {
        volunteer::Model {
            id,
            firstname: "Marie".to_string(),
            lastname: "Tremblay".to_string(),
            email: email.to_string(),
            phone: "514-555-0100".to_string(),
            city: "Montréal".to_string(),
            availability: None,
            motivation: None,
            status: status.to_string(),
            created_at: None,
        }
    }

    fn apply_request(email: &str) -> CreateVolunteerRequest {
        CreateVolunteerRequest {
            firstname: "Marie".to_string(),
            lastname: "Tremblay".to_string(),
            email: email.to_string(),
            phone: "514-555-0100".to_string(),
            city: "Montréal".to_string(),
            availability: None,
            motivation: None,
        }
    }

    #[tokio::test]
    async fn test_apply_rejects_duplicate_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![volunteer_model(1, "x@y.com", "pending")]])
            .into_connection();

        let result = VolunteerService::apply(&db, apply_request("x@y.com")).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_apply_normalizes_email_case() {
        let inserted = volunteer_model(1, "x@y.com", "pending");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<volunteer::Model>::new()])
            .append_query_results([vec![inserted]])
            .into_connection();

        let result = VolunteerService::apply(&db, apply_request("X@Y.com")).await.unwrap();

        assert_eq!(result.status, "pending");

        // L'email est stocké en minuscules
        let log = db.into_transaction_log();
        let sql = format!("{:?}", log);
        assert!(sql.contains("x@y.com"));
        assert!(!sql.contains("X@Y.com"));
    }

    #[tokio::test]
    async fn test_status_by_email_returns_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![volunteer_model(1, "x@y.com", "pending")]])
            .into_connection();

        let found = VolunteerService::status_by_email(&db, "x@y.com").await.unwrap();

        assert_eq!(found.status, "pending");
    }

    #[tokio::test]
    async fn test_status_by_email_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<volunteer::Model>::new()])
            .into_connection();

        let result = VolunteerService::status_by_email(&db, "inconnu@y.com").await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = VolunteerService::update_status(&db, 1, "en-attente".to_string()).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}

use sea_orm::*;
use rust_decimal::Decimal;
use chrono::Utc;
use uuid::Uuid;

use crate::models::donation;
use crate::services::ServiceError;

pub struct DonationService;

pub const DONATION_STATUSES: [&str; 3] = ["pending", "completed", "cancelled"];

/// Totaux des dons. completed_total ne somme que les dons 'completed'.
#[derive(Debug, serde::Serialize)]
pub struct DonationStats {
    pub pending: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub total: u64,
    pub completed_total: Decimal,
}

impl DonationService {
    /// Enregistre un don. user_id est None pour un don anonyme (le nom et
    /// l'email du donateur sont alors requis, validés par le DTO).
    /// Une référence UUID sert de numéro de reçu.
    pub async fn create(
        db: &DatabaseConnection,
        user_id: Option<i32>,
        donor_name: Option<String>,
        email: Option<String>,
        amount: f64,
        message: Option<String>,
    ) -> Result<donation::Model, ServiceError> {
        let amount_decimal = Decimal::from_f64_retain(amount)
            .filter(|d| *d > Decimal::ZERO)
            .ok_or_else(|| ServiceError::Validation("Invalid amount".to_string()))?;

        let new_donation = donation::ActiveModel {
            user_id: Set(user_id),
            donor_name: Set(donor_name.map(|n| n.trim().to_string())),
            email: Set(email.map(|e| e.trim().to_lowercase())),
            amount: Set(amount_decimal),
            message: Set(message.map(|m| m.trim().to_string())),
            reference: Set(Uuid::new_v4().to_string()),
            status: Set("pending".to_string()),
            created_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        };

        Ok(new_donation.insert(db).await?)
    }

    /// Dons d'un utilisateur, plus récents d'abord
    pub async fn list_for_user(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<donation::Model>, ServiceError> {
        let donations = donation::Entity::find()
            .filter(donation::Column::UserId.eq(user_id))
            .order_by_desc(donation::Column::CreatedAt)
            .order_by_desc(donation::Column::Id)
            .all(db)
            .await?;

        Ok(donations)
    }

    /// Un don, visible par son auteur ou un admin
    pub async fn get_for_requester(
        db: &DatabaseConnection,
        id: i32,
        requester_id: i32,
        is_admin: bool,
    ) -> Result<donation::Model, ServiceError> {
        let donation_model = donation::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Donation {} not found", id)))?;

        if !is_admin && donation_model.user_id != Some(requester_id) {
            return Err(ServiceError::Forbidden(
                "You can only view your own donations".to_string(),
            ));
        }

        Ok(donation_model)
    }

    /// Liste admin, filtre optionnel sur le statut
    pub async fn list_all(
        db: &DatabaseConnection,
        status: Option<String>,
    ) -> Result<Vec<donation::Model>, ServiceError> {
        let mut select = donation::Entity::find();

        if let Some(status) = status {
            select = select.filter(donation::Column::Status.eq(status));
        }

        let donations = select
            .order_by_desc(donation::Column::CreatedAt)
            .order_by_desc(donation::Column::Id)
            .all(db)
            .await?;

        Ok(donations)
    }

    pub async fn update_status(
        db: &DatabaseConnection,
        id: i32,
        status: String,
    ) -> Result<donation::Model, ServiceError> {
        if !DONATION_STATUSES.contains(&status.as_str()) {
            return Err(ServiceError::Validation(format!(
                "Invalid status '{}'. Must be one of: {}",
                status,
                DONATION_STATUSES.join(", ")
            )));
        }

        let donation_model = donation::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Donation {} not found", id)))?;

        let mut active: donation::ActiveModel = donation_model.into();
        active.status = Set(status);

        Ok(active.update(db).await?)
    }

    /// Suppression. Un don 'completed' est un document comptable: refusé.
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
        let donation_model = donation::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Donation {} not found", id)))?;

        if donation_model.status == "completed" {
            return Err(ServiceError::Conflict(
                "Completed donations cannot be deleted".to_string(),
            ));
        }

        donation::Entity::delete_by_id(id).exec(db).await?;
        Ok(())
    }

    /// Compteurs par statut + somme des dons complétés.
    /// La somme est repliée en mémoire sur les montants Decimal.
    pub async fn stats(db: &DatabaseConnection) -> Result<DonationStats, ServiceError> {
        let donations = donation::Entity::find().all(db).await?;

        let mut pending = 0u64;
        let mut completed = 0u64;
        let mut cancelled = 0u64;
        let mut completed_total = Decimal::ZERO;

        for d in &donations {
            match d.status.as_str() {
                "pending" => pending += 1,
                "completed" => {
                    completed += 1;
                    completed_total += d.amount;
                }
                "cancelled" => cancelled += 1,
                _ => {}
            }
        }

        Ok(DonationStats {
            pending,
            completed,
            cancelled,
            total: donations.len() as u64,
            completed_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn donation_model(id: i32, user_id: Option<i32>, amount: &str, status: &str) -> donation::Model {
        donation::Model {
            id,
            user_id,
            donor_name: None,
            email: None,
            amount: amount.parse().unwrap(),
            message: None,
            reference: format!("ref-{}", id),
            status: status.to_string(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_amount() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = DonationService::create(&db, Some(1), None, None, 0.0, None).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_refuses_completed_donation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![donation_model(1, Some(1), "50.00", "completed")]])
            .into_connection();

        let result = DonationService::delete(&db, 1).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_allows_pending_donation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![donation_model(1, Some(1), "50.00", "pending")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let result = DonationService::delete(&db, 1).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_get_requires_ownership_unless_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![donation_model(1, Some(1), "25.00", "pending")]])
            .append_query_results([vec![donation_model(1, Some(1), "25.00", "pending")]])
            .into_connection();

        let as_other_user = DonationService::get_for_requester(&db, 1, 99, false).await;
        assert!(matches!(as_other_user, Err(ServiceError::Forbidden(_))));

        let as_admin = DonationService::get_for_requester(&db, 1, 99, true).await;
        assert!(as_admin.is_ok());
    }

    #[tokio::test]
    async fn test_stats_sums_only_completed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                donation_model(1, Some(1), "10.00", "completed"),
                donation_model(2, None, "20.50", "completed"),
                donation_model(3, Some(2), "99.99", "pending"),
                donation_model(4, None, "5.00", "cancelled"),
            ]])
            .into_connection();

        let stats = DonationService::stats(&db).await.unwrap();

        assert_eq!(stats.completed, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed_total, "30.50".parse::<Decimal>().unwrap());
        assert_eq!(stats.total, stats.pending + stats.completed + stats.cancelled);
    }
}

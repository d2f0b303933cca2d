// ============================================================================
// SERVICE : ADOPTIONS
// ============================================================================
//
// Description:
//   Workflow d'adoption. C'est le seul service avec des effets en cascade:
//   la décision d'un admin sur une demande modifie les demandes sœurs et
//   l'animal référencé, dans une seule transaction.
//
// Règles:
//   - create : l'animal doit exister et être 'available'; au plus une demande
//     active ({pending, approved}) par couple (user, animal)
//   - decide 'approved' : demande → approved, animal → adopted (seulement si
//     pas déjà adopted, sinon Conflict), autres demandes pending → rejected
//   - decide 'rejected' : demande → rejected; si plus aucune pending et animal
//     pas adopted, animal → available
//   - cancel : réservé au propriétaire de la demande, statut pending seulement
//
// ============================================================================

use sea_orm::*;
use sea_orm::sea_query::Expr;
use chrono::Utc;

use crate::models::{adoption, animal, users};
use crate::models::dto::{
    AdoptionWithDetails, AnimalSummary, CreateAdoptionRequest, DecideAdoptionRequest, UserSummary,
};
use crate::services::ServiceError;

pub struct AdoptionService;

/// Répartition des demandes par statut
#[derive(Debug, serde::Serialize)]
pub struct AdoptionStats {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub total: u64,
}

impl AdoptionService {
    /// Crée une demande d'adoption (status = pending).
    /// Aucun effet sur l'animal: il reste 'available' tant qu'aucune demande
    /// n'est approuvée, plusieurs utilisateurs peuvent postuler en parallèle.
    pub async fn create(
        db: &DatabaseConnection,
        user_id: i32,
        request: CreateAdoptionRequest,
    ) -> Result<adoption::Model, ServiceError> {
        if !crate::models::dto::is_valid_phone(&request.phone) {
            return Err(ServiceError::Validation(
                "Invalid phone number format".to_string(),
            ));
        }

        // 1. L'animal doit exister
        let animal_model = animal::Entity::find_by_id(request.animal_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Animal {} not found", request.animal_id))
            })?;

        // 2. L'animal doit être disponible
        if animal_model.status != "available" {
            return Err(ServiceError::Conflict(format!(
                "Animal {} is not available for adoption",
                animal_model.id
            )));
        }

        // 3. Au plus une demande active par couple (user, animal)
        let existing = adoption::Entity::find()
            .filter(adoption::Column::UserId.eq(user_id))
            .filter(adoption::Column::AnimalId.eq(request.animal_id))
            .filter(adoption::Column::Status.is_in(["pending", "approved"]))
            .one(db)
            .await?;

        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "An active adoption request already exists for this animal".to_string(),
            ));
        }

        // 4. Insérer la demande
        let new_request = adoption::ActiveModel {
            user_id: Set(user_id),
            animal_id: Set(request.animal_id),
            firstname: Set(request.firstname.trim().to_string()),
            lastname: Set(request.lastname.trim().to_string()),
            phone: Set(request.phone.trim().to_string()),
            status: Set("pending".to_string()),
            admin_comment: Set(None),
            created_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        };

        Ok(new_request.insert(db).await?)
    }

    /// Décision admin sur une demande, exécutée dans une seule transaction.
    pub async fn decide(
        db: &DatabaseConnection,
        adoption_id: i32,
        decision: DecideAdoptionRequest,
    ) -> Result<AdoptionWithDetails, ServiceError> {
        if decision.status != "approved" && decision.status != "rejected" {
            return Err(ServiceError::Validation(
                "Status must be 'approved' or 'rejected'".to_string(),
            ));
        }

        let txn = db.begin().await?;

        // 1. Charger la demande
        let request = adoption::Entity::find_by_id(adoption_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Adoption request {} not found", adoption_id))
            })?;

        // 2. Seule une demande 'pending' peut être décidée
        //    (approved/rejected sont terminaux)
        if request.status != "pending" {
            return Err(ServiceError::Conflict(format!(
                "Adoption request {} is already {}",
                adoption_id, request.status
            )));
        }

        if decision.status == "approved" {
            // 3. Basculer l'animal en 'adopted', seulement s'il ne l'est pas déjà.
            //    Si 0 ligne touchée, une approbation concurrente a gagné l'animal:
            //    on abandonne avec Conflict au lieu de double-approuver.
            let flipped = animal::Entity::update_many()
                .col_expr(animal::Column::Status, Expr::value("adopted"))
                .filter(animal::Column::Id.eq(request.animal_id))
                .filter(animal::Column::Status.ne("adopted"))
                .exec(&txn)
                .await?;

            if flipped.rows_affected == 0 {
                return Err(ServiceError::Conflict(format!(
                    "Animal {} is already adopted",
                    request.animal_id
                )));
            }

            // 4. Approuver cette demande
            let mut active: adoption::ActiveModel = request.clone().into();
            active.status = Set("approved".to_string());
            active.admin_comment = Set(decision.admin_comment.clone());
            active.update(&txn).await?;

            // 5. Rejeter les demandes 'pending' sœurs du même animal
            adoption::Entity::update_many()
                .col_expr(adoption::Column::Status, Expr::value("rejected"))
                .filter(adoption::Column::AnimalId.eq(request.animal_id))
                .filter(adoption::Column::Id.ne(adoption_id))
                .filter(adoption::Column::Status.eq("pending"))
                .exec(&txn)
                .await?;
        } else {
            // 3. Rejeter cette demande
            let mut active: adoption::ActiveModel = request.clone().into();
            active.status = Set("rejected".to_string());
            active.admin_comment = Set(decision.admin_comment.clone());
            active.update(&txn).await?;

            // 4. S'il ne reste aucune demande 'pending', l'animal redevient
            //    'available' (sauf s'il est déjà 'adopted')
            let remaining = adoption::Entity::find()
                .filter(adoption::Column::AnimalId.eq(request.animal_id))
                .filter(adoption::Column::Status.eq("pending"))
                .count(&txn)
                .await?;

            if remaining == 0 {
                animal::Entity::update_many()
                    .col_expr(animal::Column::Status, Expr::value("available"))
                    .filter(animal::Column::Id.eq(request.animal_id))
                    .filter(animal::Column::Status.ne("adopted"))
                    .exec(&txn)
                    .await?;
            }
        }

        txn.commit().await?;

        // 5. Retourner la demande avec ses résumés animal/utilisateur
        Self::get_with_details(db, adoption_id).await
    }

    /// Annulation par le demandeur (DELETE), statut pending seulement
    pub async fn cancel(
        db: &DatabaseConnection,
        adoption_id: i32,
        requester_id: i32,
    ) -> Result<(), ServiceError> {
        let request = adoption::Entity::find_by_id(adoption_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Adoption request {} not found", adoption_id))
            })?;

        if request.user_id != requester_id {
            return Err(ServiceError::Forbidden(
                "You can only cancel your own adoption requests".to_string(),
            ));
        }

        if request.status != "pending" {
            return Err(ServiceError::Conflict(format!(
                "Only pending requests can be cancelled (current status: {})",
                request.status
            )));
        }

        adoption::Entity::delete_by_id(adoption_id).exec(db).await?;
        Ok(())
    }

    /// Demande avec résumés joints, réservée au propriétaire ou à un admin
    pub async fn get_for_requester(
        db: &DatabaseConnection,
        adoption_id: i32,
        requester_id: i32,
        is_admin: bool,
    ) -> Result<AdoptionWithDetails, ServiceError> {
        let request = adoption::Entity::find_by_id(adoption_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Adoption request {} not found", adoption_id))
            })?;

        if !is_admin && request.user_id != requester_id {
            return Err(ServiceError::Forbidden(
                "You can only view your own adoption requests".to_string(),
            ));
        }

        Self::join_details(db, request).await
    }

    pub async fn get_with_details(
        db: &DatabaseConnection,
        adoption_id: i32,
    ) -> Result<AdoptionWithDetails, ServiceError> {
        let request = adoption::Entity::find_by_id(adoption_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Adoption request {} not found", adoption_id))
            })?;

        Self::join_details(db, request).await
    }

    /// Demandes d'un utilisateur, plus récentes d'abord
    pub async fn list_for_user(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<adoption::Model>, ServiceError> {
        let requests = adoption::Entity::find()
            .filter(adoption::Column::UserId.eq(user_id))
            .order_by_desc(adoption::Column::CreatedAt)
            .order_by_desc(adoption::Column::Id)
            .all(db)
            .await?;

        Ok(requests)
    }

    /// Liste admin, filtre optionnel sur le statut, plus récentes d'abord
    pub async fn list_all(
        db: &DatabaseConnection,
        status: Option<String>,
    ) -> Result<Vec<adoption::Model>, ServiceError> {
        let mut select = adoption::Entity::find();

        if let Some(status) = status {
            select = select.filter(adoption::Column::Status.eq(status));
        }

        let requests = select
            .order_by_desc(adoption::Column::CreatedAt)
            .order_by_desc(adoption::Column::Id)
            .all(db)
            .await?;

        Ok(requests)
    }

    /// Compteurs par statut (le total est la somme des trois)
    pub async fn stats(db: &DatabaseConnection) -> Result<AdoptionStats, ServiceError> {
        let (pending, approved, rejected) = futures::try_join!(
            adoption::Entity::find()
                .filter(adoption::Column::Status.eq("pending"))
                .count(db),
            adoption::Entity::find()
                .filter(adoption::Column::Status.eq("approved"))
                .count(db),
            adoption::Entity::find()
                .filter(adoption::Column::Status.eq("rejected"))
                .count(db),
        )?;

        Ok(AdoptionStats {
            pending,
            approved,
            rejected,
            total: pending + approved + rejected,
        })
    }

    async fn join_details(
        db: &DatabaseConnection,
        request: adoption::Model,
    ) -> Result<AdoptionWithDetails, ServiceError> {
        let animal_model = animal::Entity::find_by_id(request.animal_id).one(db).await?;
        let user_model = users::Entity::find_by_id(request.user_id).one(db).await?;

        Ok(AdoptionWithDetails {
            id: request.id,
            status: request.status,
            firstname: request.firstname,
            lastname: request.lastname,
            phone: request.phone,
            admin_comment: request.admin_comment,
            created_at: request.created_at,
            animal: animal_model.map(|a| AnimalSummary {
                id: a.id,
                species: a.species,
                name: a.name,
                city: a.city,
                status: a.status,
            }),
            user: user_model.map(|u| UserSummary {
                id: u.id,
                firstname: u.firstname,
                lastname: u.lastname,
                email: u.email,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn animal_model(id: i32, status: &str) -> animal::Model {
        animal::Model {
            id,
            species: "chien".to_string(),
            name: "Rex".to_string(),
            city: "Montréal".to_string(),
            age: 3,
            breed: "Labrador".to_string(),
            description: "Très affectueux".to_string(),
            status: status.to_string(),
            created_at: None,
        }
    }

    fn adoption_model(id: i32, user_id: i32, animal_id: i32, status: &str) -> adoption::Model {
        adoption::Model {
            id,
            user_id,
            animal_id,
            firstname: "Alice".to_string(),
            lastname: "Martin".to_string(),
            phone: "514-555-0101".to_string(),
            status: status.to_string(),
            admin_comment: None,
            created_at: None,
        }
    }

    fn user_model(id: i32) -> users::Model {
        users::Model {
            id,
            firstname: "Alice".to_string(),
            lastname: "Martin".to_string(),
            email: "alice@exemple.com".to_string(),
            phone: None,
            password_hash: "pbkdf2:sha256:260000$x$y".to_string(),
            role: "user".to_string(),
            created_at: None,
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn create_request(animal_id: i32) -> CreateAdoptionRequest {
        CreateAdoptionRequest {
            animal_id,
            firstname: "Alice".to_string(),
            lastname: "Martin".to_string(),
            phone: "514-555-0101".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_phone() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let mut request = create_request(7);
        request.phone = "abc".to_string();
        let result = AdoptionService::create(&db, 1, request).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejected_when_animal_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<animal::Model>::new()])
            .into_connection();

        let result = AdoptionService::create(&db, 1, create_request(7)).await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_rejected_when_animal_not_available() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![animal_model(7, "adopted")]])
            .into_connection();

        let result = AdoptionService::create(&db, 1, create_request(7)).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_rejected_when_active_request_exists() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![animal_model(7, "available")]])
            .append_query_results([vec![adoption_model(101, 1, 7, "pending")]])
            .into_connection();

        let result = AdoptionService::create(&db, 1, create_request(7)).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_succeeds_after_previous_rejection() {
        // La demande précédente est 'rejected' donc pas active: le filtre
        // is_in(["pending","approved"]) ne la remonte pas
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![animal_model(7, "available")]])
            .append_query_results([Vec::<adoption::Model>::new()])
            .append_query_results([vec![adoption_model(103, 1, 7, "pending")]])
            .into_connection();

        let result = AdoptionService::create(&db, 1, create_request(7)).await.unwrap();

        assert_eq!(result.status, "pending");
        assert_eq!(result.animal_id, 7);
    }

    #[tokio::test]
    async fn test_decide_rejects_invalid_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let decision = DecideAdoptionRequest {
            status: "maybe".to_string(),
            admin_comment: None,
        };
        let result = AdoptionService::decide(&db, 101, decision).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_approve_cascades_and_returns_details() {
        let mut approved = adoption_model(101, 1, 7, "approved");
        approved.admin_comment = Some("Bon dossier".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // find demande (dans la transaction)
            .append_query_results([vec![adoption_model(101, 1, 7, "pending")]])
            // UPDATE animals ... WHERE status <> 'adopted' → 1 ligne
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            // UPDATE demande RETURNING
            .append_query_results([vec![approved.clone()]])
            // UPDATE demandes sœurs pending → rejected
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            // get_with_details: demande, animal, user
            .append_query_results([vec![approved]])
            .append_query_results([vec![animal_model(7, "adopted")]])
            .append_query_results([vec![user_model(1)]])
            .into_connection();

        let decision = DecideAdoptionRequest {
            status: "approved".to_string(),
            admin_comment: Some("Bon dossier".to_string()),
        };
        let result = AdoptionService::decide(&db, 101, decision).await.unwrap();

        assert_eq!(result.status, "approved");
        assert_eq!(result.admin_comment.as_deref(), Some("Bon dossier"));
        assert_eq!(result.animal.unwrap().status, "adopted");
        assert_eq!(result.user.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_concurrent_approval_conflicts() {
        // L'animal est déjà 'adopted': le UPDATE conditionnel ne touche aucune
        // ligne, la deuxième approbation échoue avec Conflict
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![adoption_model(102, 2, 7, "pending")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let decision = DecideAdoptionRequest {
            status: "approved".to_string(),
            admin_comment: None,
        };
        let result = AdoptionService::decide(&db, 102, decision).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_decide_refuses_already_decided_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![adoption_model(102, 2, 7, "rejected")]])
            .into_connection();

        let decision = DecideAdoptionRequest {
            status: "approved".to_string(),
            admin_comment: None,
        };
        let result = AdoptionService::decide(&db, 102, decision).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_reject_last_pending_reverts_animal() {
        let rejected = adoption_model(101, 1, 7, "rejected");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![adoption_model(101, 1, 7, "pending")]])
            // UPDATE demande RETURNING
            .append_query_results([vec![rejected.clone()]])
            // COUNT demandes pending restantes → 0
            .append_query_results([vec![count_row(0)]])
            // UPDATE animal → available (conditionné sur status <> 'adopted')
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            // get_with_details
            .append_query_results([vec![rejected]])
            .append_query_results([vec![animal_model(7, "available")]])
            .append_query_results([vec![user_model(1)]])
            .into_connection();

        let decision = DecideAdoptionRequest {
            status: "rejected".to_string(),
            admin_comment: None,
        };
        let result = AdoptionService::decide(&db, 101, decision).await.unwrap();

        assert_eq!(result.status, "rejected");
        assert_eq!(result.animal.unwrap().status, "available");
    }

    #[tokio::test]
    async fn test_reject_with_other_pending_keeps_animal_untouched() {
        let rejected = adoption_model(101, 1, 7, "rejected");

        // remaining = 1 → aucun UPDATE sur l'animal (pas d'exec_result fourni,
        // le mock échouerait si le service en tentait un)
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![adoption_model(101, 1, 7, "pending")]])
            .append_query_results([vec![rejected.clone()]])
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![rejected]])
            .append_query_results([vec![animal_model(7, "available")]])
            .append_query_results([vec![user_model(1)]])
            .into_connection();

        let decision = DecideAdoptionRequest {
            status: "rejected".to_string(),
            admin_comment: None,
        };
        let result = AdoptionService::decide(&db, 101, decision).await.unwrap();

        assert_eq!(result.status, "rejected");
    }

    #[tokio::test]
    async fn test_cancel_requires_ownership() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![adoption_model(101, 1, 7, "pending")]])
            .into_connection();

        let result = AdoptionService::cancel(&db, 101, 99).await;

        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cancel_requires_pending_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![adoption_model(101, 1, 7, "approved")]])
            .into_connection();

        let result = AdoptionService::cancel(&db, 101, 1).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cancel_deletes_pending_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![adoption_model(101, 1, 7, "pending")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let result = AdoptionService::cancel(&db, 101, 1).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_stats_total_reconciles_with_parts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(3)]])
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![count_row(2)]])
            .into_connection();

        let stats = AdoptionService::stats(&db).await.unwrap();

        assert_eq!(stats.pending, 3);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.total, stats.pending + stats.approved + stats.rejected);
    }
}

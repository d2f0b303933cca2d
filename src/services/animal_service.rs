use sea_orm::*;
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr};
use chrono::Utc;

use crate::models::{adoption, animal};
use crate::models::dto::{AnimalSearchQuery, CreateAnimalRequest, UpdateAnimalRequest};
use crate::services::ServiceError;

pub struct AnimalService;

pub const ANIMAL_STATUSES: [&str; 3] = ["available", "pending", "adopted"];

/// Répartition des animaux par statut
#[derive(Debug, serde::Serialize)]
pub struct AnimalStats {
    pub available: u64,
    pub pending: u64,
    pub adopted: u64,
    pub total: u64,
}

impl AnimalService {
    /// Crée un animal (status = available), champs textes normalisés (trim)
    pub async fn create(
        db: &DatabaseConnection,
        request: CreateAnimalRequest,
    ) -> Result<animal::Model, ServiceError> {
        let new_animal = animal::ActiveModel {
            species: Set(request.species.trim().to_string()),
            name: Set(request.name.trim().to_string()),
            city: Set(request.city.trim().to_string()),
            age: Set(request.age),
            breed: Set(request.breed.trim().to_string()),
            description: Set(request.description.trim().to_string()),
            status: Set("available".to_string()),
            created_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        };

        Ok(new_animal.insert(db).await?)
    }

    /// Tous les animaux, plus récents d'abord
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<animal::Model>, ServiceError> {
        let animals = animal::Entity::find()
            .order_by_desc(animal::Column::CreatedAt)
            .order_by_desc(animal::Column::Id)
            .all(db)
            .await?;

        Ok(animals)
    }

    /// Recherche conjonctive: sous-chaîne insensible à la casse sur les textes,
    /// bornes inclusives sur l'âge, égalité sur le statut
    pub async fn search(
        db: &DatabaseConnection,
        query: AnimalSearchQuery,
    ) -> Result<Vec<animal::Model>, ServiceError> {
        let mut select = animal::Entity::find();

        if let Some(species) = &query.species {
            select = select.filter(Expr::col(animal::Column::Species).ilike(format!("%{}%", species)));
        }
        if let Some(name) = &query.name {
            select = select.filter(Expr::col(animal::Column::Name).ilike(format!("%{}%", name)));
        }
        if let Some(city) = &query.city {
            select = select.filter(Expr::col(animal::Column::City).ilike(format!("%{}%", city)));
        }
        if let Some(breed) = &query.breed {
            select = select.filter(Expr::col(animal::Column::Breed).ilike(format!("%{}%", breed)));
        }
        if let Some(status) = &query.status {
            select = select.filter(animal::Column::Status.eq(status.as_str()));
        }
        if let Some(min_age) = query.min_age {
            select = select.filter(animal::Column::Age.gte(min_age));
        }
        if let Some(max_age) = query.max_age {
            select = select.filter(animal::Column::Age.lte(max_age));
        }

        let animals = select
            .order_by_desc(animal::Column::CreatedAt)
            .order_by_desc(animal::Column::Id)
            .all(db)
            .await?;

        Ok(animals)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<animal::Model, ServiceError> {
        animal::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Animal {} not found", id)))
    }

    /// Mise à jour partielle: seuls les champs fournis sont modifiés
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        request: UpdateAnimalRequest,
    ) -> Result<animal::Model, ServiceError> {
        let animal_model = Self::get(db, id).await?;
        let mut active: animal::ActiveModel = animal_model.into();

        if let Some(species) = request.species {
            active.species = Set(species.trim().to_string());
        }
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(city) = request.city {
            active.city = Set(city.trim().to_string());
        }
        if let Some(age) = request.age {
            active.age = Set(age);
        }
        if let Some(breed) = request.breed {
            active.breed = Set(breed.trim().to_string());
        }
        if let Some(description) = request.description {
            active.description = Set(description.trim().to_string());
        }

        Ok(active.update(db).await?)
    }

    /// Changement manuel de statut par un admin.
    /// C'est l'échappatoire hors transaction (ex: remettre un animal
    /// 'adopted' en 'available' après un retour au refuge).
    pub async fn update_status(
        db: &DatabaseConnection,
        id: i32,
        status: String,
    ) -> Result<animal::Model, ServiceError> {
        if !ANIMAL_STATUSES.contains(&status.as_str()) {
            return Err(ServiceError::Validation(format!(
                "Invalid status '{}'. Must be one of: {}",
                status,
                ANIMAL_STATUSES.join(", ")
            )));
        }

        let animal_model = Self::get(db, id).await?;
        let mut active: animal::ActiveModel = animal_model.into();
        active.status = Set(status);

        Ok(active.update(db).await?)
    }

    /// Suppression, refusée tant qu'il reste une demande d'adoption 'pending'
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
        Self::get(db, id).await?;

        let pending = adoption::Entity::find()
            .filter(adoption::Column::AnimalId.eq(id))
            .filter(adoption::Column::Status.eq("pending"))
            .count(db)
            .await?;

        if pending > 0 {
            return Err(ServiceError::Conflict(format!(
                "Animal {} has {} pending adoption request(s)",
                id, pending
            )));
        }

        animal::Entity::delete_by_id(id).exec(db).await?;
        Ok(())
    }

    pub async fn stats(db: &DatabaseConnection) -> Result<AnimalStats, ServiceError> {
        let (available, pending, adopted) = futures::try_join!(
            animal::Entity::find()
                .filter(animal::Column::Status.eq("available"))
                .count(db),
            animal::Entity::find()
                .filter(animal::Column::Status.eq("pending"))
                .count(db),
            animal::Entity::find()
                .filter(animal::Column::Status.eq("adopted"))
                .count(db),
        )?;

        Ok(AnimalStats {
            available,
            pending,
            adopted,
            total: available + pending + adopted,
        })
    }
}

// ============================================================================
// MODÈLE : ADOPTION REQUESTS
// ============================================================================
//
// Description:
//   Demandes d'adoption liant un utilisateur à un animal.
//
// Colonnes de la table adoption_requests:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - user_id (INTEGER, NOT NULL, FK vers users)
//   - animal_id (INTEGER, NOT NULL, FK vers animals)
//   - firstname / lastname / phone (VARCHAR, NOT NULL) - coordonnées du demandeur
//   - status (VARCHAR, NOT NULL) - 'pending', 'approved', 'rejected'
//   - admin_comment (VARCHAR, NULL) - commentaire de l'admin lors de la décision
//   - created_at (TIMESTAMP, DEFAULT CURRENT_TIMESTAMP)
//
// Workflow:
//   1. User crée une demande (status = pending), l'animal reste 'available'
//   2. Au plus une demande active ({pending, approved}) par couple (user, animal)
//   3. Admin approuve: la demande passe 'approved', l'animal passe 'adopted',
//      les autres demandes 'pending' du même animal passent 'rejected'
//      (une seule transaction)
//   4. Admin rejette: si plus aucune demande 'pending' et animal pas 'adopted',
//      l'animal redevient 'available'
//   5. User peut annuler (DELETE) sa propre demande tant qu'elle est 'pending'
//
// Points d'attention:
//   - 'approved' et 'rejected' sont terminaux, aucune transition n'en sort
//   - Un animal ne peut être supprimé s'il reste une demande 'pending'
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "adoption_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub animal_id: i32,

    pub firstname: String,

    pub lastname: String,

    pub phone: String,

    pub status: String, // 'pending', 'approved', 'rejected'

    pub admin_comment: Option<String>,

    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::animal::Entity",
        from = "Column::AnimalId",
        to = "super::animal::Column::Id"
    )]
    Animal,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::animal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Animal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

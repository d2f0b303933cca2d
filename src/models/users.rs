use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)] // Ne jamais exposer le hash en JSON
    pub password_hash: String,
    pub role: String, // 'user', 'admin'
    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::adoption::Entity")]
    Adoption,

    #[sea_orm(has_many = "super::donation::Entity")]
    Donation,

    #[sea_orm(has_many = "super::contact::Entity")]
    Contact,
}

impl Related<super::adoption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adoption.def()
    }
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donation.def()
    }
}

impl Related<super::contact::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contact.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

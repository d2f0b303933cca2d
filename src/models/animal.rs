use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "animals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub species: String, // 'chien', 'chat', 'lapin', etc.
    pub name: String,
    pub city: String,
    pub age: i32, // en années
    pub breed: String,
    pub description: String,
    pub status: String, // 'available', 'pending', 'adopted'
    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::adoption::Entity")]
    Adoption,
}

impl Related<super::adoption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adoption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    /// Release date as Unix seconds, local midnight.
    pub release_timestamp: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::watched::Entity")]
    Watched,
    #[sea_orm(has_many = "super::planned::Entity")]
    Planned,
}

impl Related<super::watched::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Watched.def()
    }
}

impl Related<super::planned::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Planned.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

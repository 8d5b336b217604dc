use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Stable subject issued by the identity provider.
    #[sea_orm(unique)]
    pub external_id: String,
    /// Monotonically increasing; never decremented or reset.
    pub free_credits_used: i32,
    pub created_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::packs::Entity")]
    Packs,
    #[sea_orm(has_many = "super::digests::Entity")]
    Digests,
}

impl Related<super::packs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Packs.def()
    }
}

impl Related<super::digests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Digests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

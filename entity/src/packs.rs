use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A purchased credit pack. Drained packs stay around for audit history.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "packs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub credits_total: i32,
    /// Monotonically non-increasing; never below zero.
    pub credits_remaining: i32,
    /// Payment-provider checkout session id; unique so webhook retries
    /// cannot fulfill the same purchase twice.
    #[sea_orm(unique)]
    pub checkout_session_id: String,
    /// Consumption order: oldest pack is drained first.
    pub purchased_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

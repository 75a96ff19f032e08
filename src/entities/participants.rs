use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 活动参与者实体
/// 说明:
/// - 名称在同一活动内唯一（区分大小写），不同活动之间互不影响
/// - is_winner 与 winners 表一一对应：存在中奖记录 <=> is_winner = true
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 所属活动ID
    pub event_id: i64,
    /// 参与者显示名称
    pub name: String,
    /// 是否已中奖
    pub is_winner: bool,
    /// 报名时间
    pub registered_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Event,
    #[sea_orm(has_one = "super::winners::Entity")]
    Winner,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::winners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Winner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

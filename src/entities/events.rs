use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 活动生命周期状态
///
/// 合法迁移（除此之外一律拒绝）:
/// - Init -> RegistrationOpen
/// - RegistrationOpen -> RegistrationClosed
/// - RegistrationClosed -> RegistrationOpen | Drawing
/// - Drawing -> Closed
/// - Closed 为终态
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[sea_orm(string_value = "init")]
    Init,
    #[sea_orm(string_value = "registration_open")]
    RegistrationOpen,
    #[sea_orm(string_value = "registration_closed")]
    RegistrationClosed,
    #[sea_orm(string_value = "drawing")]
    Drawing,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl EventStatus {
    /// 当前状态允许迁移到的目标状态
    pub fn allowed_transitions(self) -> &'static [EventStatus] {
        match self {
            EventStatus::Init => &[EventStatus::RegistrationOpen],
            EventStatus::RegistrationOpen => &[EventStatus::RegistrationClosed],
            EventStatus::RegistrationClosed => {
                &[EventStatus::RegistrationOpen, EventStatus::Drawing]
            }
            EventStatus::Drawing => &[EventStatus::Closed],
            EventStatus::Closed => &[],
        }
    }

    pub fn can_transition_to(self, next: EventStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// 仅报名开放期间允许新增 / 删除参与者
    pub fn accepts_registrations(self) -> bool {
        self == EventStatus::RegistrationOpen
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Init => write!(f, "init"),
            EventStatus::RegistrationOpen => write!(f, "registration_open"),
            EventStatus::RegistrationClosed => write!(f, "registration_closed"),
            EventStatus::Drawing => write!(f, "drawing"),
            EventStatus::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 活动名称（全局唯一）
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,
    #[sea_orm(has_many = "super::winners::Entity")]
    Winners,
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::winners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Winners.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_transition_table_is_exact() {
        let legal = [
            (EventStatus::Init, EventStatus::RegistrationOpen),
            (EventStatus::RegistrationOpen, EventStatus::RegistrationClosed),
            (EventStatus::RegistrationClosed, EventStatus::RegistrationOpen),
            (EventStatus::RegistrationClosed, EventStatus::Drawing),
            (EventStatus::Drawing, EventStatus::Closed),
        ];

        for from in EventStatus::iter() {
            for to in EventStatus::iter() {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{from} -> {to} should be {}",
                    if expected { "legal" } else { "illegal" }
                );
            }
        }
    }

    #[test]
    fn test_specific_edges() {
        assert!(!EventStatus::Init.can_transition_to(EventStatus::Drawing));
        assert!(EventStatus::Init.can_transition_to(EventStatus::RegistrationOpen));
        assert!(!EventStatus::Drawing.can_transition_to(EventStatus::RegistrationClosed));
        assert!(EventStatus::Drawing.can_transition_to(EventStatus::Closed));
        // 自环不合法
        assert!(!EventStatus::Drawing.can_transition_to(EventStatus::Drawing));
    }

    #[test]
    fn test_closed_is_the_only_terminal_state() {
        let terminal: Vec<_> = EventStatus::iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![EventStatus::Closed]);
    }

    #[test]
    fn test_status_serde_matches_storage_values() {
        for status in EventStatus::iter() {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.to_value()));
            assert_eq!(status.to_string(), status.to_value());
        }
    }
}

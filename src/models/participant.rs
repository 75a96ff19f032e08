use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{EventStatus, participant_entity, winner_entity};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RegisterParticipantRequest {
    #[schema(example = "Alice")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub is_winner: bool,
    pub registered_at: DateTime<Utc>,
}

impl From<participant_entity::Model> for ParticipantResponse {
    fn from(m: participant_entity::Model) -> Self {
        ParticipantResponse {
            id: m.id,
            event_id: m.event_id,
            name: m.name,
            is_winner: m.is_winner,
            registered_at: m.registered_at,
        }
    }
}

/// 参与者自身的中奖信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WinRecordResponse {
    pub id: i64,
    pub draw_order: i32,
    pub drawn_at: DateTime<Utc>,
}

impl From<winner_entity::Model> for WinRecordResponse {
    fn from(m: winner_entity::Model) -> Self {
        WinRecordResponse {
            id: m.id,
            draw_order: m.draw_order,
            drawn_at: m.drawn_at,
        }
    }
}

/// 参与者查询自身状态
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantStatusResponse {
    pub participant: ParticipantResponse,
    pub event_status: EventStatus,
    pub participant_count: i64,
    pub winner_count: i64,
    /// 未中奖时为 null
    pub winner: Option<WinRecordResponse>,
}

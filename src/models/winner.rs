use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{participant_entity, winner_entity};

use super::ParticipantResponse;

/// 中奖记录（附带参与者信息，便于直接展示）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WinnerResponse {
    pub id: i64,
    pub event_id: i64,
    pub participant_id: i64,
    pub draw_order: i32,
    pub drawn_at: DateTime<Utc>,
    pub participant: ParticipantResponse,
}

impl WinnerResponse {
    pub fn new(winner: winner_entity::Model, participant: participant_entity::Model) -> Self {
        WinnerResponse {
            id: winner.id,
            event_id: winner.event_id,
            participant_id: winner.participant_id,
            draw_order: winner.draw_order,
            drawn_at: winner.drawn_at,
            participant: participant.into(),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{EventStatus, event_entity};

use super::{ParticipantResponse, WinnerResponse};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateEventRequest {
    #[schema(example = "Spring Gala 2025")]
    pub name: String,
    #[schema(example = "Annual spring raffle")]
    pub description: Option<String>,
}

/// 仅 Init 状态可编辑
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateEventRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct TransitionStatusRequest {
    /// 目标状态
    pub status: EventStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<event_entity::Model> for EventResponse {
    fn from(m: event_entity::Model) -> Self {
        EventResponse {
            id: m.id,
            name: m.name,
            description: m.description,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// 管理端活动列表项（含人数统计）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventSummaryResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: EventStatus,
    pub participant_count: i64,
    pub winner_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventSummaryResponse {
    pub fn new(m: event_entity::Model, participant_count: i64, winner_count: i64) -> Self {
        EventSummaryResponse {
            id: m.id,
            name: m.name,
            description: m.description,
            status: m.status,
            participant_count,
            winner_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// 管理端活动详情：参与者按报名时间升序，中奖者按抽奖顺序升序
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventDetailResponse {
    pub event: EventResponse,
    pub participants: Vec<ParticipantResponse>,
    pub winners: Vec<WinnerResponse>,
    pub participant_count: i64,
    pub winner_count: i64,
}

/// 公开活动信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicEventResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: EventStatus,
    pub participant_count: i64,
    pub winner_count: i64,
}

/// 活动数据一致性检查结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventAuditResponse {
    pub event_id: i64,
    pub status: EventStatus,
    pub participant_count: i64,
    pub winner_count: i64,
    /// 标记了 is_winner 但没有中奖记录的参与者
    pub flagged_without_record: Vec<i64>,
    /// 有中奖记录但未标记 is_winner 的参与者
    pub records_without_flag: Vec<i64>,
    /// 中奖记录指向其他活动参与者的记录ID
    pub foreign_winner_records: Vec<i64>,
    /// draw_order 是否恰为 1..=winner_count
    pub draw_orders_contiguous: bool,
    pub consistent: bool,
}

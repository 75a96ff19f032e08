use crate::database::{classify_db_err, is_unique_violation};
use crate::entities::{
    EventStatus, event_entity as events, participant_entity as participants,
    winner_entity as winners,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{normalize_description, normalize_event_name};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::collections::{HashMap, HashSet};

/// 状态 CAS 更新失败（被并发修改）后的最大重试次数
const MAX_TRANSITION_ATTEMPTS: u32 = 3;

#[derive(Debug, FromQueryResult)]
struct EventCountRow {
    event_id: i64,
    count: i64,
}

pub(crate) async fn find_event<C: ConnectionTrait>(db: &C, event_id: i64) -> AppResult<events::Model> {
    events::Entity::find_by_id(event_id)
        .one(db)
        .await
        .map_err(classify_db_err)?
        .ok_or(AppError::EventNotFound)
}

/// 单个活动的 (参与者数, 中奖者数)
pub(crate) async fn event_counts<C: ConnectionTrait>(
    db: &C,
    event_id: i64,
) -> AppResult<(i64, i64)> {
    let participant_count = participants::Entity::find()
        .filter(participants::Column::EventId.eq(event_id))
        .count(db)
        .await
        .map_err(classify_db_err)? as i64;
    let winner_count = winners::Entity::find()
        .filter(winners::Column::EventId.eq(event_id))
        .count(db)
        .await
        .map_err(classify_db_err)? as i64;
    Ok((participant_count, winner_count))
}

#[derive(Clone)]
pub struct EventService {
    pool: DatabaseConnection,
}

impl EventService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 状态迁移
    ///
    /// 仅允许 `EventStatus::allowed_transitions` 中列出的边；写入使用
    /// `UPDATE ... WHERE status = <刚读取的状态>` 的比较并交换，
    /// 未命中说明被并发修改，重新读取并重新校验。
    pub async fn transition(
        &self,
        event_id: i64,
        requested: EventStatus,
    ) -> AppResult<events::Model> {
        for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
            let event = find_event(&self.pool, event_id).await?;

            if !event.status.can_transition_to(requested) {
                return Err(AppError::InvalidTransition {
                    from: event.status,
                    to: requested,
                });
            }

            let now = Utc::now();
            let result = events::Entity::update_many()
                .col_expr(events::Column::Status, Expr::value(requested.to_value()))
                .col_expr(events::Column::UpdatedAt, Expr::value(now))
                .filter(events::Column::Id.eq(event_id))
                .filter(events::Column::Status.eq(event.status))
                .exec(&self.pool)
                .await
                .map_err(classify_db_err)?;

            if result.rows_affected == 1 {
                log::info!(
                    "Event {event_id} status changed: {} -> {requested}",
                    event.status
                );
                return Ok(events::Model {
                    status: requested,
                    updated_at: now,
                    ..event
                });
            }

            log::warn!(
                "Event {event_id} was modified concurrently during transition to {requested} (attempt {attempt}/{MAX_TRANSITION_ATTEMPTS})"
            );
        }

        Err(AppError::TransientConflict)
    }

    /// 创建活动（初始状态 Init）
    pub async fn create_event(&self, request: CreateEventRequest) -> AppResult<EventResponse> {
        let name = normalize_event_name(&request.name)?;
        self.ensure_name_available(&name, None).await?;

        let now = Utc::now();
        let model = events::ActiveModel {
            name: Set(name),
            description: Set(normalize_description(request.description)),
            status: Set(EventStatus::Init),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(map_name_conflict)?;

        log::info!("Event {} created: {}", model.id, model.name);
        Ok(model.into())
    }

    /// 活动列表（按创建时间倒序，含人数统计）
    pub async fn list_events(&self) -> AppResult<Vec<EventSummaryResponse>> {
        let list = events::Entity::find()
            .order_by_desc(events::Column::CreatedAt)
            .order_by_desc(events::Column::Id)
            .all(&self.pool)
            .await
            .map_err(classify_db_err)?;

        let participant_counts: HashMap<i64, i64> = participants::Entity::find()
            .select_only()
            .column(participants::Column::EventId)
            .column_as(Expr::col(participants::Column::Id).count(), "count")
            .group_by(participants::Column::EventId)
            .into_model::<EventCountRow>()
            .all(&self.pool)
            .await
            .map_err(classify_db_err)?
            .into_iter()
            .map(|r| (r.event_id, r.count))
            .collect();

        let winner_counts: HashMap<i64, i64> = winners::Entity::find()
            .select_only()
            .column(winners::Column::EventId)
            .column_as(Expr::col(winners::Column::Id).count(), "count")
            .group_by(winners::Column::EventId)
            .into_model::<EventCountRow>()
            .all(&self.pool)
            .await
            .map_err(classify_db_err)?
            .into_iter()
            .map(|r| (r.event_id, r.count))
            .collect();

        Ok(list
            .into_iter()
            .map(|m| {
                let participants = participant_counts.get(&m.id).copied().unwrap_or(0);
                let winners = winner_counts.get(&m.id).copied().unwrap_or(0);
                EventSummaryResponse::new(m, participants, winners)
            })
            .collect())
    }

    /// 活动详情（管理端）
    pub async fn get_event_detail(&self, event_id: i64) -> AppResult<EventDetailResponse> {
        let event = find_event(&self.pool, event_id).await?;

        let participant_list = participants::Entity::find()
            .filter(participants::Column::EventId.eq(event_id))
            .order_by_asc(participants::Column::RegisteredAt)
            .order_by_asc(participants::Column::Id)
            .all(&self.pool)
            .await
            .map_err(classify_db_err)?;

        let winner_list = winners::Entity::find()
            .filter(winners::Column::EventId.eq(event_id))
            .order_by_asc(winners::Column::DrawOrder)
            .find_also_related(participants::Entity)
            .all(&self.pool)
            .await
            .map_err(classify_db_err)?
            .into_iter()
            .map(|(winner, participant)| match participant {
                Some(p) => Ok(WinnerResponse::new(winner, p)),
                None => Err(AppError::InternalError(format!(
                    "Winner {} references a missing participant",
                    winner.id
                ))),
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(EventDetailResponse {
            participant_count: participant_list.len() as i64,
            winner_count: winner_list.len() as i64,
            event: event.into(),
            participants: participant_list.into_iter().map(Into::into).collect(),
            winners: winner_list,
        })
    }

    /// 公开活动信息（无需登录）
    pub async fn get_public_event(&self, event_id: i64) -> AppResult<PublicEventResponse> {
        let event = find_event(&self.pool, event_id).await?;
        let (participant_count, winner_count) = event_counts(&self.pool, event_id).await?;

        Ok(PublicEventResponse {
            id: event.id,
            name: event.name,
            description: event.description,
            status: event.status,
            participant_count,
            winner_count,
        })
    }

    /// 编辑活动：仅 Init 状态允许
    pub async fn update_event(
        &self,
        event_id: i64,
        request: UpdateEventRequest,
    ) -> AppResult<EventResponse> {
        let name = normalize_event_name(&request.name)?;
        let description = normalize_description(request.description);

        let event = find_event(&self.pool, event_id).await?;
        if event.status != EventStatus::Init {
            return Err(AppError::InvalidState {
                status: event.status,
                expected: EventStatus::Init,
            });
        }
        self.ensure_name_available(&name, Some(event_id)).await?;

        // 条件更新，避免与并发的状态迁移交错
        let now = Utc::now();
        let result = events::Entity::update_many()
            .col_expr(events::Column::Name, Expr::value(name.clone()))
            .col_expr(events::Column::Description, Expr::value(description.clone()))
            .col_expr(events::Column::UpdatedAt, Expr::value(now))
            .filter(events::Column::Id.eq(event_id))
            .filter(events::Column::Status.eq(EventStatus::Init))
            .exec(&self.pool)
            .await
            .map_err(map_name_conflict)?;

        if result.rows_affected == 0 {
            let current = find_event(&self.pool, event_id).await?;
            return Err(AppError::InvalidState {
                status: current.status,
                expected: EventStatus::Init,
            });
        }

        Ok(events::Model {
            name,
            description,
            updated_at: now,
            ..event
        }
        .into())
    }

    /// 删除活动及其参与者、中奖记录
    pub async fn delete_event(&self, event_id: i64) -> AppResult<()> {
        let txn = self.pool.begin().await.map_err(classify_db_err)?;

        let event = find_event(&txn, event_id).await?;

        let removed_winners = winners::Entity::delete_many()
            .filter(winners::Column::EventId.eq(event_id))
            .exec(&txn)
            .await
            .map_err(classify_db_err)?
            .rows_affected;
        let removed_participants = participants::Entity::delete_many()
            .filter(participants::Column::EventId.eq(event_id))
            .exec(&txn)
            .await
            .map_err(classify_db_err)?
            .rows_affected;
        events::Entity::delete_by_id(event_id)
            .exec(&txn)
            .await
            .map_err(classify_db_err)?;

        txn.commit().await.map_err(classify_db_err)?;

        log::info!(
            "Event {event_id} ({}) deleted with {removed_participants} participant(s) and {removed_winners} winner(s)",
            event.name
        );
        Ok(())
    }

    /// 数据一致性检查
    ///
    /// 校验: 中奖数 <= 参与者数；is_winner 与中奖记录一一对应；
    /// 中奖记录只指向本活动参与者；draw_order 恰为 1..=中奖数
    pub async fn audit_event(&self, event_id: i64) -> AppResult<EventAuditResponse> {
        let event = find_event(&self.pool, event_id).await?;

        let participant_list = participants::Entity::find()
            .filter(participants::Column::EventId.eq(event_id))
            .all(&self.pool)
            .await
            .map_err(classify_db_err)?;
        let winner_list = winners::Entity::find()
            .filter(winners::Column::EventId.eq(event_id))
            .order_by_asc(winners::Column::DrawOrder)
            .all(&self.pool)
            .await
            .map_err(classify_db_err)?;

        let participant_ids: HashSet<i64> = participant_list.iter().map(|p| p.id).collect();
        let recorded: HashSet<i64> = winner_list.iter().map(|w| w.participant_id).collect();

        let flagged_without_record: Vec<i64> = participant_list
            .iter()
            .filter(|p| p.is_winner && !recorded.contains(&p.id))
            .map(|p| p.id)
            .collect();
        let records_without_flag: Vec<i64> = participant_list
            .iter()
            .filter(|p| !p.is_winner && recorded.contains(&p.id))
            .map(|p| p.id)
            .collect();
        let foreign_winner_records: Vec<i64> = winner_list
            .iter()
            .filter(|w| !participant_ids.contains(&w.participant_id))
            .map(|w| w.id)
            .collect();
        let draw_orders_contiguous = winner_list
            .iter()
            .enumerate()
            .all(|(i, w)| i64::from(w.draw_order) == i as i64 + 1);

        let participant_count = participant_list.len() as i64;
        let winner_count = winner_list.len() as i64;
        let consistent = winner_count <= participant_count
            && flagged_without_record.is_empty()
            && records_without_flag.is_empty()
            && foreign_winner_records.is_empty()
            && draw_orders_contiguous;

        if !consistent {
            log::warn!("Consistency audit failed for event {event_id}");
        }

        Ok(EventAuditResponse {
            event_id,
            status: event.status,
            participant_count,
            winner_count,
            flagged_without_record,
            records_without_flag,
            foreign_winner_records,
            draw_orders_contiguous,
            consistent,
        })
    }

    async fn ensure_name_available(&self, name: &str, exclude_id: Option<i64>) -> AppResult<()> {
        let mut query = events::Entity::find().filter(events::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            query = query.filter(events::Column::Id.ne(id));
        }
        let existing = query.one(&self.pool).await.map_err(classify_db_err)?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Event name already exists".to_string(),
            ));
        }
        Ok(())
    }
}

fn map_name_conflict(err: DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::ValidationError("Event name already exists".to_string())
    } else {
        classify_db_err(err)
    }
}

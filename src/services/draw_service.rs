use crate::config::DrawConfig;
use crate::database::{begin_serializable, classify_db_err, is_unique_violation};
use crate::entities::{
    EventStatus, event_entity as events, participant_entity as participants,
    winner_entity as winners,
};
use crate::error::{AppError, AppResult};
use crate::models::WinnerResponse;
use crate::utils::SecureRandom;
use chrono::Utc;
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
    rng: Arc<dyn SecureRandom>,
    config: DrawConfig,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection, rng: Arc<dyn SecureRandom>, config: DrawConfig) -> Self {
        Self { pool, rng, config }
    }

    /// 抽取一名中奖者
    ///
    /// 每次尝试都在一个可串行化事务内完成；遇到并发冲突时整体回滚，
    /// 按线性退避加随机抖动重试，超过 `max_attempts` 后返回 TransientConflict。
    pub async fn draw_one_winner(&self, event_id: i64) -> AppResult<WinnerResponse> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.try_draw(event_id).await {
                Err(AppError::TransientConflict) if attempt < max_attempts => {
                    let delay = self.backoff(attempt);
                    log::warn!(
                        "Draw for event {event_id} conflicted (attempt {attempt}/{max_attempts}), retrying in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(AppError::TransientConflict) => {
                    log::error!("Draw for event {event_id} gave up after {attempt} conflicting attempts");
                    return Err(AppError::TransientConflict);
                }
                other => return other,
            }
        }
    }

    /// 单次抽奖尝试
    ///
    /// 逻辑:
    /// 1. 事务内重新读取活动，状态必须为 Drawing
    /// 2. 读取本活动未中奖的参与者（按 id 排序，保证下标含义稳定）
    /// 3. 由安全随机源等概率选出一名
    /// 4. draw_order = 本活动已有中奖记录数 + 1
    /// 5. 条件更新 is_winner（仅当仍为 false），再写入中奖记录
    /// 6. 任一步失败，事务丢弃，所有表保持不变
    async fn try_draw(&self, event_id: i64) -> AppResult<WinnerResponse> {
        let txn = begin_serializable(&self.pool)
            .await
            .map_err(classify_db_err)?;

        let event = events::Entity::find_by_id(event_id)
            .one(&txn)
            .await
            .map_err(classify_db_err)?
            .ok_or(AppError::EventNotFound)?;

        if event.status != EventStatus::Drawing {
            return Err(AppError::InvalidState {
                status: event.status,
                expected: EventStatus::Drawing,
            });
        }

        let mut eligible = participants::Entity::find()
            .filter(participants::Column::EventId.eq(event_id))
            .filter(participants::Column::IsWinner.eq(false))
            .order_by_asc(participants::Column::Id)
            .all(&txn)
            .await
            .map_err(classify_db_err)?;

        if eligible.is_empty() {
            log::info!("Event {event_id} has no eligible participants left");
            return Err(AppError::NoEligibleParticipants);
        }

        let index = self.rng.random_index(eligible.len())?;
        if index >= eligible.len() {
            return Err(AppError::InternalError(format!(
                "Random index {index} out of range for {} candidates",
                eligible.len()
            )));
        }
        let selected = eligible.swap_remove(index);

        let existing = winners::Entity::find()
            .filter(winners::Column::EventId.eq(event_id))
            .count(&txn)
            .await
            .map_err(classify_db_err)?;
        let draw_order = i32::try_from(existing + 1)
            .map_err(|_| AppError::InternalError("Draw order overflow".to_string()))?;

        let marked = participants::Entity::update_many()
            .col_expr(participants::Column::IsWinner, Expr::value(true))
            .filter(participants::Column::Id.eq(selected.id))
            .filter(participants::Column::IsWinner.eq(false))
            .exec(&txn)
            .await
            .map_err(classify_db_err)?;

        if marked.rows_affected != 1 {
            return Err(AppError::TransientConflict);
        }

        let winner = winners::ActiveModel {
            event_id: Set(event_id),
            participant_id: Set(selected.id),
            draw_order: Set(draw_order),
            drawn_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            // (event_id, draw_order) 或 participant_id 唯一约束冲突：并发抽奖抢先写入
            if is_unique_violation(&e) {
                AppError::TransientConflict
            } else {
                classify_db_err(e)
            }
        })?;

        txn.commit().await.map_err(classify_db_err)?;

        log::info!(
            "Event {event_id}: participant {} ({}) drawn as winner #{draw_order}",
            selected.id,
            selected.name
        );

        Ok(WinnerResponse::new(
            winner,
            participants::Model {
                is_winner: true,
                ..selected
            },
        ))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.config.retry_backoff_ms;
        let jitter = if base > 0 {
            rand::thread_rng().gen_range(0..base)
        } else {
            0
        };
        Duration::from_millis(base * u64::from(attempt) + jitter)
    }
}

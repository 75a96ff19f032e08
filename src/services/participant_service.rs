use crate::database::{begin_serializable, classify_db_err, is_unique_violation};
use crate::entities::{EventStatus, participant_entity as participants, winner_entity as winners};
use crate::error::{AppError, AppResult};
use crate::models::{ParticipantResponse, ParticipantStatusResponse, RegisterParticipantRequest};
use crate::services::event_service::{event_counts, find_event};
use crate::utils::normalize_participant_name;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[derive(Clone)]
pub struct ParticipantService {
    pool: DatabaseConnection,
}

impl ParticipantService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 报名参加活动（仅 RegistrationOpen 状态）
    pub async fn register(
        &self,
        event_id: i64,
        request: RegisterParticipantRequest,
    ) -> AppResult<ParticipantResponse> {
        let name = normalize_participant_name(&request.name)?;

        // 与状态迁移串行化：关闭报名后不会再有新的参与者写入
        let txn = begin_serializable(&self.pool)
            .await
            .map_err(classify_db_err)?;

        let event = find_event(&txn, event_id).await?;
        if !event.status.accepts_registrations() {
            return Err(AppError::InvalidState {
                status: event.status,
                expected: EventStatus::RegistrationOpen,
            });
        }

        let existing = participants::Entity::find()
            .filter(participants::Column::EventId.eq(event_id))
            .filter(participants::Column::Name.eq(name.as_str()))
            .one(&txn)
            .await
            .map_err(classify_db_err)?;
        if existing.is_some() {
            return Err(duplicate_name());
        }

        let participant = participants::ActiveModel {
            event_id: Set(event_id),
            name: Set(name),
            is_winner: Set(false),
            registered_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_name()
            } else {
                classify_db_err(e)
            }
        })?;

        txn.commit().await.map_err(classify_db_err)?;

        log::info!(
            "Participant {} ({}) registered for event {event_id}",
            participant.id,
            participant.name
        );
        Ok(participant.into())
    }

    /// 移除参与者
    ///
    /// 仅当活动处于 RegistrationOpen 且该参与者未中奖时允许；
    /// 管理员移除与参与者自行取消共用此规则。
    pub async fn delete_participant(
        &self,
        event_id: i64,
        participant_id: i64,
    ) -> AppResult<participants::Model> {
        let txn = begin_serializable(&self.pool)
            .await
            .map_err(classify_db_err)?;

        let event = find_event(&txn, event_id).await?;
        if !event.status.accepts_registrations() {
            return Err(AppError::InvalidState {
                status: event.status,
                expected: EventStatus::RegistrationOpen,
            });
        }

        let participant = participants::Entity::find_by_id(participant_id)
            .filter(participants::Column::EventId.eq(event_id))
            .one(&txn)
            .await
            .map_err(classify_db_err)?
            .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))?;

        if participant.is_winner {
            return Err(AppError::ValidationError(
                "Cannot remove a participant who has already won".to_string(),
            ));
        }

        let result = participants::Entity::delete_many()
            .filter(participants::Column::Id.eq(participant_id))
            .filter(participants::Column::IsWinner.eq(false))
            .exec(&txn)
            .await
            .map_err(classify_db_err)?;
        if result.rows_affected != 1 {
            return Err(AppError::TransientConflict);
        }

        txn.commit().await.map_err(classify_db_err)?;

        log::info!(
            "Participant {participant_id} ({}) removed from event {event_id}",
            participant.name
        );
        Ok(participant)
    }

    /// 参与者查询自身状态及中奖信息
    pub async fn get_participant_status(
        &self,
        event_id: i64,
        participant_id: i64,
    ) -> AppResult<ParticipantStatusResponse> {
        let event = find_event(&self.pool, event_id).await?;

        let participant = participants::Entity::find_by_id(participant_id)
            .filter(participants::Column::EventId.eq(event_id))
            .one(&self.pool)
            .await
            .map_err(classify_db_err)?
            .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))?;

        let winner = winners::Entity::find()
            .filter(winners::Column::ParticipantId.eq(participant_id))
            .one(&self.pool)
            .await
            .map_err(classify_db_err)?;

        let (participant_count, winner_count) = event_counts(&self.pool, event_id).await?;

        Ok(ParticipantStatusResponse {
            participant: participant.into(),
            event_status: event.status,
            participant_count,
            winner_count,
            winner: winner.map(Into::into),
        })
    }
}

fn duplicate_name() -> AppError {
    AppError::ValidationError("Name already registered for this event".to_string())
}

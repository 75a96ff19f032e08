use crate::external::{EventNotifier, EventUpdate};
use crate::models::*;
use crate::services::{EventService, ParticipantService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "event",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    responses(
        (status = 200, description = "获取活动信息成功", body = PublicEventResponse),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn get_public_event(
    event_service: web::Data<EventService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match event_service.get_public_event(path.into_inner()).await {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": event }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/{id}/register",
    tag = "event",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    request_body = RegisterParticipantRequest,
    responses(
        (status = 201, description = "报名成功", body = ParticipantResponse),
        (status = 400, description = "报名未开放或名称已被使用"),
        (status = 404, description = "活动不存在")
    )
)]
/// 报名成功后返回的参与者ID即为后续查询、取消报名的凭据
pub async fn register(
    participant_service: web::Data<ParticipantService>,
    notifier: web::Data<dyn EventNotifier>,
    path: web::Path<i64>,
    request: web::Json<RegisterParticipantRequest>,
) -> Result<HttpResponse> {
    let event_id = path.into_inner();
    match participant_service
        .register(event_id, request.into_inner())
        .await
    {
        Ok(participant) => {
            notifier.notify(
                event_id,
                EventUpdate::ParticipantRegistered {
                    participant_id: participant.id,
                    name: participant.name.clone(),
                },
            );
            Ok(ApiResponse::created(participant))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/events/{id}/register/{participant_id}",
    tag = "event",
    params(
        ("id" = i64, Path, description = "活动ID"),
        ("participant_id" = i64, Path, description = "参与者ID")
    ),
    responses(
        (status = 200, description = "已取消报名"),
        (status = 400, description = "报名已关闭或已中奖"),
        (status = 404, description = "活动或参与者不存在")
    )
)]
pub async fn cancel_registration(
    participant_service: web::Data<ParticipantService>,
    notifier: web::Data<dyn EventNotifier>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let (event_id, participant_id) = path.into_inner();
    match participant_service
        .delete_participant(event_id, participant_id)
        .await
    {
        Ok(_) => {
            notifier.notify(event_id, EventUpdate::ParticipantRemoved { participant_id });
            Ok(ApiResponse::<()>::message("Registration cancelled"))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/events/{id}/status/{participant_id}",
    tag = "event",
    params(
        ("id" = i64, Path, description = "活动ID"),
        ("participant_id" = i64, Path, description = "参与者ID")
    ),
    responses(
        (status = 200, description = "获取参与状态成功", body = ParticipantStatusResponse),
        (status = 404, description = "活动或参与者不存在")
    )
)]
pub async fn participant_status(
    participant_service: web::Data<ParticipantService>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let (event_id, participant_id) = path.into_inner();
    match participant_service
        .get_participant_status(event_id, participant_id)
        .await
    {
        Ok(status) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": status }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn event_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("/{id}", web::get().to(get_public_event))
            .route("/{id}/register", web::post().to(register))
            .route(
                "/{id}/register/{participant_id}",
                web::delete().to(cancel_registration),
            )
            .route(
                "/{id}/status/{participant_id}",
                web::get().to(participant_status),
            ),
    );
}

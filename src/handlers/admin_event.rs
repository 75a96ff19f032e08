use crate::external::{EventNotifier, EventUpdate};
use crate::models::*;
use crate::services::{DrawService, EventService, ParticipantService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/admin/events",
    tag = "admin_event",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取活动列表成功", body = [EventSummaryResponse]),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_events(event_service: web::Data<EventService>) -> Result<HttpResponse> {
    match event_service.list_events().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/events",
    tag = "admin_event",
    request_body = CreateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建活动成功", body = EventResponse),
        (status = 400, description = "名称为空或已存在")
    )
)]
pub async fn create_event(
    event_service: web::Data<EventService>,
    request: web::Json<CreateEventRequest>,
) -> Result<HttpResponse> {
    match event_service.create_event(request.into_inner()).await {
        Ok(event) => Ok(ApiResponse::created(event)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/events/{id}",
    tag = "admin_event",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取活动详情成功", body = EventDetailResponse),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn get_event(
    event_service: web::Data<EventService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match event_service.get_event_detail(path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": detail }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/events/{id}",
    tag = "admin_event",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    request_body = UpdateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = EventResponse),
        (status = 400, description = "活动已开始报名，无法编辑"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn update_event(
    event_service: web::Data<EventService>,
    path: web::Path<i64>,
    request: web::Json<UpdateEventRequest>,
) -> Result<HttpResponse> {
    match event_service
        .update_event(path.into_inner(), request.into_inner())
        .await
    {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": event }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/events/{id}",
    tag = "admin_event",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn delete_event(
    event_service: web::Data<EventService>,
    notifier: web::Data<dyn EventNotifier>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let event_id = path.into_inner();
    match event_service.delete_event(event_id).await {
        Ok(()) => {
            notifier.notify(event_id, EventUpdate::EventDeleted);
            Ok(ApiResponse::<()>::message("Event deleted"))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/events/{id}/status",
    tag = "admin_event",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    request_body = TransitionStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = EventResponse),
        (status = 400, description = "非法的状态迁移"),
        (status = 404, description = "活动不存在"),
        (status = 409, description = "并发修改，请重试")
    )
)]
pub async fn transition_status(
    event_service: web::Data<EventService>,
    notifier: web::Data<dyn EventNotifier>,
    path: web::Path<i64>,
    request: web::Json<TransitionStatusRequest>,
) -> Result<HttpResponse> {
    let event_id = path.into_inner();
    match event_service.transition(event_id, request.status).await {
        Ok(event) => {
            notifier.notify(
                event_id,
                EventUpdate::StatusChanged {
                    status: event.status,
                },
            );
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": EventResponse::from(event)
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/events/{id}/draw",
    tag = "admin_event",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖成功", body = WinnerResponse),
        (status = 400, description = "活动不在抽奖状态或无可抽参与者"),
        (status = 404, description = "活动不存在"),
        (status = 409, description = "并发冲突，重试次数已用尽")
    )
)]
pub async fn draw_winner(
    draw_service: web::Data<DrawService>,
    notifier: web::Data<dyn EventNotifier>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let event_id = path.into_inner();
    match draw_service.draw_one_winner(event_id).await {
        Ok(winner) => {
            notifier.notify(
                event_id,
                EventUpdate::WinnerDrawn {
                    winner_id: winner.id,
                    participant_id: winner.participant_id,
                    participant_name: winner.participant.name.clone(),
                    draw_order: winner.draw_order,
                },
            );
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": winner })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/events/{id}/audit",
    tag = "admin_event",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "一致性检查结果", body = EventAuditResponse),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn audit_event(
    event_service: web::Data<EventService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match event_service.audit_event(path.into_inner()).await {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": report }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/events/{id}/participants/{participant_id}",
    tag = "admin_event",
    params(
        ("id" = i64, Path, description = "活动ID"),
        ("participant_id" = i64, Path, description = "参与者ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已移除参与者"),
        (status = 400, description = "报名未开放或参与者已中奖"),
        (status = 404, description = "活动或参与者不存在")
    )
)]
pub async fn remove_participant(
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
            Ok(ApiResponse::<()>::message("Participant removed"))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_event_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::get().to(list_events))
        .route("/events", web::post().to(create_event))
        .route("/events/{id}", web::get().to(get_event))
        .route("/events/{id}", web::put().to(update_event))
        .route("/events/{id}", web::delete().to(delete_event))
        .route("/events/{id}/status", web::post().to(transition_status))
        .route("/events/{id}/draw", web::post().to(draw_winner))
        .route("/events/{id}/audit", web::get().to(audit_event))
        .route(
            "/events/{id}/participants/{participant_id}",
            web::delete().to(remove_participant),
        );
}

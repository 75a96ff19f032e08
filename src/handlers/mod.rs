pub mod admin_account;
pub mod admin_auth;
pub mod admin_event;
pub mod event;

pub use event::event_config;

use actix_web::web;

/// 管理端路由，统一挂在 /admin 下（除登录外均需鉴权）
pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .configure(admin_auth::admin_auth_config)
            .configure(admin_account::admin_account_config)
            .configure(admin_event::admin_event_config),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminConfig, DrawConfig};
    use crate::database::test_support::setup_db;
    use crate::external::{BroadcastNotifier, EventNotifier, EventUpdate};
    use crate::middlewares::AuthMiddleware;
    use crate::services::*;
    use crate::utils::{JwtService, OsSecureRandom};
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, init_service, read_body_json};
    use actix_web::App;
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_raffle_flow_over_http() {
        let db = setup_db().await;
        let jwt = JwtService::new("handler-secret", 3600);
        let admin_service = AdminService::new(db.clone(), jwt.clone());
        admin_service
            .ensure_default_admin(&AdminConfig::default())
            .await
            .unwrap();

        let broadcast = BroadcastNotifier::default();
        let mut updates = broadcast.subscribe();
        let notifier: Arc<dyn EventNotifier> = Arc::new(broadcast);

        let app = init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .app_data(web::Data::new(admin_service))
                .app_data(web::Data::new(EventService::new(db.clone())))
                .app_data(web::Data::new(ParticipantService::new(db.clone())))
                .app_data(web::Data::new(DrawService::new(
                    db.clone(),
                    Arc::new(OsSecureRandom),
                    DrawConfig::default(),
                )))
                .app_data(web::Data::from(notifier))
                .service(
                    web::scope("/api/v1")
                        .configure(event_config)
                        .configure(admin_config),
                ),
        )
        .await;

        let req = TestRequest::post()
            .uri("/api/v1/admin/login")
            .set_json(json!({ "username": "admin", "password": "password" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        let token = body["data"]["access_token"].as_str().unwrap().to_string();
        let auth = ("Authorization", format!("Bearer {token}"));

        let req = TestRequest::post()
            .uri("/api/v1/admin/events")
            .insert_header(auth.clone())
            .set_json(json!({ "name": "Launch Party" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = read_body_json(resp).await;
        let event_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["status"], "init");

        // 非法迁移返回 400 与错误码
        let req = TestRequest::post()
            .uri(&format!("/api/v1/admin/events/{event_id}/status"))
            .insert_header(auth.clone())
            .set_json(json!({ "status": "drawing" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

        let req = TestRequest::post()
            .uri(&format!("/api/v1/admin/events/{event_id}/status"))
            .insert_header(auth.clone())
            .set_json(json!({ "status": "registration_open" }))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);
        let update = updates.recv().await.unwrap();
        assert_eq!(update.event_id, event_id);
        assert_eq!(
            update.update,
            EventUpdate::StatusChanged {
                status: crate::entities::EventStatus::RegistrationOpen
            }
        );

        let req = TestRequest::post()
            .uri(&format!("/api/v1/events/{event_id}/register"))
            .set_json(json!({ "name": "Alice" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = read_body_json(resp).await;
        let participant_id = body["data"]["id"].as_i64().unwrap();

        for status in ["registration_closed", "drawing"] {
            let req = TestRequest::post()
                .uri(&format!("/api/v1/admin/events/{event_id}/status"))
                .insert_header(auth.clone())
                .set_json(json!({ "status": status }))
                .to_request();
            assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);
        }

        // 未登录不能抽奖
        let req = TestRequest::post()
            .uri(&format!("/api/v1/admin/events/{event_id}/draw"))
            .to_request();
        let err = actix_web::test::try_call_service(&app, req)
            .await
            .unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );

        let req = TestRequest::post()
            .uri(&format!("/api/v1/admin/events/{event_id}/draw"))
            .insert_header(auth.clone())
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["draw_order"], 1);
        assert_eq!(body["data"]["participant"]["name"], "Alice");

        let req = TestRequest::post()
            .uri(&format!("/api/v1/admin/events/{event_id}/draw"))
            .insert_header(auth.clone())
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "NO_ELIGIBLE_PARTICIPANTS");

        let req = TestRequest::get()
            .uri(&format!("/api/v1/events/{event_id}/status/{participant_id}"))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["participant"]["is_winner"], true);
        assert_eq!(body["data"]["winner"]["draw_order"], 1);

        let req = TestRequest::get()
            .uri("/api/v1/events/9999")
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "EVENT_NOT_FOUND");
    }
}

use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::EventStatus;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::admin_auth::login,
        handlers::admin_auth::logout,
        handlers::admin_auth::me,
        handlers::admin_account::list_admins,
        handlers::admin_account::create_admin,
        handlers::admin_account::update_admin,
        handlers::admin_account::set_password,
        handlers::admin_account::delete_admin,
        handlers::admin_event::list_events,
        handlers::admin_event::create_event,
        handlers::admin_event::get_event,
        handlers::admin_event::update_event,
        handlers::admin_event::delete_event,
        handlers::admin_event::transition_status,
        handlers::admin_event::draw_winner,
        handlers::admin_event::audit_event,
        handlers::admin_event::remove_participant,
        handlers::event::get_public_event,
        handlers::event::register,
        handlers::event::cancel_registration,
        handlers::event::participant_status,
    ),
    components(
        schemas(
            EventStatus,
            LoginRequest,
            AuthResponse,
            AdminResponse,
            CreateAdminRequest,
            UpdateAdminRequest,
            SetPasswordRequest,
            CreateEventRequest,
            UpdateEventRequest,
            TransitionStatusRequest,
            EventResponse,
            EventSummaryResponse,
            EventDetailResponse,
            EventAuditResponse,
            PublicEventResponse,
            RegisterParticipantRequest,
            ParticipantResponse,
            ParticipantStatusResponse,
            WinRecordResponse,
            WinnerResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "admin_auth", description = "Admin authentication API"),
        (name = "admin_account", description = "Admin account management API"),
        (name = "admin_event", description = "Event lifecycle and draw API"),
        (name = "event", description = "Public registration API"),
    ),
    info(
        title = "Raffle Backend API",
        version = "1.0.0",
        description = "Supervised prize raffle REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_draw_route() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/admin/events/{id}/draw"));
        assert!(doc.paths.paths.contains_key("/events/{id}/register"));
    }
}

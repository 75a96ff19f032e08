use crate::error::AppError;
use crate::models::*;
use crate::services::AdminService;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// 从请求扩展中获取管理员ID（中间件在鉴权后注入）
pub(crate) fn get_admin_id_from_request(req: &HttpRequest) -> Result<i64, AppError> {
    req.extensions()
        .get::<i64>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "admin_auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = AuthResponse),
        (status = 401, description = "用户名或密码错误")
    )
)]
pub async fn login(
    admin_service: web::Data<AdminService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match admin_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/logout",
    tag = "admin_auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "登出成功"),
        (status = 401, description = "未授权")
    )
)]
/// 令牌无状态，客户端丢弃令牌即可
pub async fn logout(req: HttpRequest) -> Result<HttpResponse> {
    match get_admin_id_from_request(&req) {
        Ok(admin_id) => {
            log::info!("Admin {admin_id} logged out");
            Ok(ApiResponse::<()>::message("Logged out"))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/me",
    tag = "admin_auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取当前管理员成功", body = AdminResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn me(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let admin_id = match get_admin_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match admin_service.get_admin(admin_id).await {
        Ok(admin) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": admin }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_auth_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login))
        .route("/logout", web::post().to(logout))
        .route("/me", web::get().to(me));
}

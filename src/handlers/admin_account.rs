use crate::handlers::admin_auth::get_admin_id_from_request;
use crate::models::*;
use crate::services::AdminService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/admin/admins",
    tag = "admin_account",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取管理员列表成功", body = [AdminResponse]),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_admins(admin_service: web::Data<AdminService>) -> Result<HttpResponse> {
    match admin_service.list_admins().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/admins",
    tag = "admin_account",
    request_body = CreateAdminRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建管理员成功", body = AdminResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_admin(
    admin_service: web::Data<AdminService>,
    request: web::Json<CreateAdminRequest>,
) -> Result<HttpResponse> {
    match admin_service.create_admin(request.into_inner()).await {
        Ok(admin) => Ok(ApiResponse::created(admin)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/admins/{id}",
    tag = "admin_account",
    params(
        ("id" = i64, Path, description = "管理员ID")
    ),
    request_body = UpdateAdminRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = AdminResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "管理员不存在")
    )
)]
pub async fn update_admin(
    admin_service: web::Data<AdminService>,
    path: web::Path<i64>,
    request: web::Json<UpdateAdminRequest>,
) -> Result<HttpResponse> {
    match admin_service
        .update_admin(path.into_inner(), request.into_inner())
        .await
    {
        Ok(admin) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": admin }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/admins/{id}/password",
    tag = "admin_account",
    params(
        ("id" = i64, Path, description = "管理员ID")
    ),
    request_body = SetPasswordRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "密码已更新"),
        (status = 400, description = "密码不符合要求"),
        (status = 404, description = "管理员不存在")
    )
)]
pub async fn set_password(
    admin_service: web::Data<AdminService>,
    path: web::Path<i64>,
    request: web::Json<SetPasswordRequest>,
) -> Result<HttpResponse> {
    match admin_service
        .set_password(path.into_inner(), request.into_inner())
        .await
    {
        Ok(()) => Ok(ApiResponse::<()>::message("Password updated")),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/admins/{id}",
    tag = "admin_account",
    params(
        ("id" = i64, Path, description = "管理员ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "不能删除自己"),
        (status = 404, description = "管理员不存在")
    )
)]
pub async fn delete_admin(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let current_admin_id = match get_admin_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match admin_service
        .delete_admin(current_admin_id, path.into_inner())
        .await
    {
        Ok(()) => Ok(ApiResponse::<()>::message("Admin deleted")),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_account_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/admins", web::get().to(list_admins))
        .route("/admins", web::post().to(create_admin))
        .route("/admins/{id}", web::put().to(update_admin))
        .route("/admins/{id}", web::delete().to(delete_admin))
        .route("/admins/{id}/password", web::post().to(set_password));
}

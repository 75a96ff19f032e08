use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// 需要管理员身份的路径配置
struct ProtectedPaths {
    prefix_paths: Vec<&'static str>,
    // 位于受保护前缀下但无需登录的路径
    excluded_paths: Vec<&'static str>,
}

impl ProtectedPaths {
    fn new() -> Self {
        Self {
            prefix_paths: vec!["/api/v1/admin/"],
            excluded_paths: vec!["/api/v1/admin/login"],
        }
    }

    fn requires_auth(&self, path: &str) -> bool {
        if self.excluded_paths.contains(&path) {
            return false;
        }

        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix) || path == prefix.trim_end_matches('/'))
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            protected_paths: ProtectedPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    protected_paths: ProtectedPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        // 公开接口（报名、查询）直接放行
        if !self.protected_paths.requires_auth(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        let Some(token) = token else {
            let error = AppError::AuthError("Missing access token".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        match self
            .jwt_service
            .verify_token(&token)
            .and_then(|claims| claims.admin_id())
        {
            Ok(admin_id) => {
                // 将管理员ID添加到请求扩展中
                req.extensions_mut().insert(admin_id);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(_) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{
        TestRequest, call_and_read_body_json, call_service, init_service, try_call_service,
    };
    use actix_web::{App, HttpRequest, HttpResponse, http::StatusCode, web};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        let admin_id = req.extensions().get::<i64>().copied();
        HttpResponse::Ok().json(admin_id)
    }

    #[test]
    fn test_protected_paths() {
        let paths = ProtectedPaths::new();
        assert!(paths.requires_auth("/api/v1/admin/events"));
        assert!(paths.requires_auth("/api/v1/admin/events/1/draw"));
        assert!(paths.requires_auth("/api/v1/admin"));
        assert!(!paths.requires_auth("/api/v1/admin/login"));
        assert!(!paths.requires_auth("/api/v1/events/1/register"));
        assert!(!paths.requires_auth("/swagger-ui/"));
    }

    #[actix_web::test]
    async fn test_token_is_required_for_admin_routes() {
        let jwt = JwtService::new("middleware-secret", 60);
        let token = jwt.generate_token(42, "admin").unwrap();
        let app = init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .route("/api/v1/admin/me", web::get().to(whoami))
                .route("/api/v1/events/1", web::get().to(whoami)),
        )
        .await;

        let req = TestRequest::get().uri("/api/v1/events/1").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = TestRequest::get().uri("/api/v1/admin/me").to_request();
        let err = try_call_service(&app, req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );

        let req = TestRequest::get()
            .uri("/api/v1/admin/me")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let err = try_call_service(&app, req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );

        let req = TestRequest::get()
            .uri("/api/v1/admin/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let admin_id: Option<i64> = call_and_read_body_json(&app, req).await;
        assert_eq!(admin_id, Some(42));
    }
}

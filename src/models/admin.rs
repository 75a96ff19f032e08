use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::admin_entity;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "password")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminResponse {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<admin_entity::Model> for AdminResponse {
    fn from(m: admin_entity::Model) -> Self {
        AdminResponse {
            id: m.id,
            username: m.username,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub admin: AdminResponse,
    pub access_token: String,
    /// 令牌有效期（秒）
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateAdminRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateAdminRequest {
    pub username: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SetPasswordRequest {
    pub password: String,
}

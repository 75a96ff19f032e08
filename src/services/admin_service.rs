use crate::config::AdminConfig;
use crate::entities::admin_entity as admins;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{
    JwtService, hash_password, normalize_username, validate_password, verify_password,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

#[derive(Clone)]
pub struct AdminService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AdminService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// 启动时确保默认管理员存在（幂等）
    pub async fn ensure_default_admin(&self, config: &AdminConfig) -> AppResult<()> {
        let username = normalize_username(&config.default_username)?;
        if self.find_by_username(&username).await?.is_some() {
            return Ok(());
        }

        validate_password(&config.default_password)?;
        let admin = self
            .insert_admin(username, &config.default_password)
            .await?;
        log::warn!(
            "Default admin account '{}' created, change its password after first login",
            admin.username
        );
        Ok(())
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let invalid = || AppError::AuthError("Invalid credentials".to_string());

        let admin = self
            .find_by_username(request.username.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&request.password, &admin.password_hash)? {
            log::warn!("Failed login attempt for admin '{}'", admin.username);
            return Err(invalid());
        }

        let access_token = self
            .jwt_service
            .generate_token(admin.id, &admin.username)?;
        log::info!("Admin {} logged in", admin.id);

        Ok(AuthResponse {
            admin: admin.into(),
            access_token,
            expires_in: self.jwt_service.get_expires_in(),
        })
    }

    pub async fn get_admin(&self, admin_id: i64) -> AppResult<AdminResponse> {
        Ok(self.find_admin(admin_id).await?.into())
    }

    pub async fn list_admins(&self) -> AppResult<Vec<AdminResponse>> {
        let list = admins::Entity::find()
            .order_by_desc(admins::Column::CreatedAt)
            .order_by_desc(admins::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn create_admin(&self, request: CreateAdminRequest) -> AppResult<AdminResponse> {
        let username = normalize_username(&request.username)?;
        validate_password(&request.password)?;

        if self.find_by_username(&username).await?.is_some() {
            return Err(AppError::ValidationError(
                "Username already exists".to_string(),
            ));
        }

        let admin = self.insert_admin(username, &request.password).await?;
        log::info!("Admin {} ({}) created", admin.id, admin.username);
        Ok(admin.into())
    }

    pub async fn update_admin(
        &self,
        admin_id: i64,
        request: UpdateAdminRequest,
    ) -> AppResult<AdminResponse> {
        let username = normalize_username(&request.username)?;
        let admin = self.find_admin(admin_id).await?;

        if let Some(existing) = self.find_by_username(&username).await?
            && existing.id != admin_id
        {
            return Err(AppError::ValidationError(
                "Username already exists".to_string(),
            ));
        }

        let mut active = admin.into_active_model();
        active.username = Set(username);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.pool).await?;
        Ok(updated.into())
    }

    pub async fn set_password(&self, admin_id: i64, request: SetPasswordRequest) -> AppResult<()> {
        validate_password(&request.password)?;
        let admin = self.find_admin(admin_id).await?;

        let mut active = admin.into_active_model();
        active.password_hash = Set(hash_password(&request.password)?);
        active.updated_at = Set(Utc::now());
        active.update(&self.pool).await?;

        log::info!("Password changed for admin {admin_id}");
        Ok(())
    }

    /// 删除管理员（不能删除自己）
    pub async fn delete_admin(&self, current_admin_id: i64, admin_id: i64) -> AppResult<()> {
        if current_admin_id == admin_id {
            return Err(AppError::Forbidden(
                "Cannot delete your own account".to_string(),
            ));
        }

        let result = admins::Entity::delete_by_id(admin_id)
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Admin not found".to_string()));
        }

        log::info!("Admin {admin_id} deleted by admin {current_admin_id}");
        Ok(())
    }

    async fn find_admin(&self, admin_id: i64) -> AppResult<admins::Model> {
        admins::Entity::find_by_id(admin_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<admins::Model>> {
        Ok(admins::Entity::find()
            .filter(admins::Column::Username.eq(username))
            .one(&self.pool)
            .await?)
    }

    async fn insert_admin(&self, username: String, password: &str) -> AppResult<admins::Model> {
        let now = Utc::now();
        let admin = admins::ActiveModel {
            username: Set(username),
            password_hash: Set(hash_password(password)?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::setup_db;

    async fn service() -> AdminService {
        let db = setup_db().await;
        AdminService::new(db, JwtService::new("test-secret", 3600))
    }

    fn credentials(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_default_admin_is_created_once() {
        let service = service().await;
        let config = AdminConfig::default();

        service.ensure_default_admin(&config).await.unwrap();
        service.ensure_default_admin(&config).await.unwrap();

        let list = service.list_admins().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].username, "admin");
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let service = service().await;
        service
            .ensure_default_admin(&AdminConfig::default())
            .await
            .unwrap();

        let auth = service
            .login(credentials(" admin ", "password"))
            .await
            .unwrap();
        assert_eq!(auth.expires_in, 3600);
        let claims = service.jwt_service.verify_token(&auth.access_token).unwrap();
        assert_eq!(claims.admin_id().unwrap(), auth.admin.id);
        assert_eq!(claims.username, "admin");
    }

    #[tokio::test]
    async fn test_wrong_credentials_are_indistinguishable() {
        let service = service().await;
        service
            .ensure_default_admin(&AdminConfig::default())
            .await
            .unwrap();

        let wrong_password = service
            .login(credentials("admin", "nope-nope"))
            .await
            .unwrap_err();
        let wrong_user = service
            .login(credentials("ghost", "password"))
            .await
            .unwrap_err();
        assert_eq!(wrong_password.to_string(), wrong_user.to_string());
        assert!(matches!(wrong_password, AppError::AuthError(_)));
    }

    #[tokio::test]
    async fn test_account_management() {
        let service = service().await;

        let alice = service
            .create_admin(CreateAdminRequest {
                username: "alice".into(),
                password: "alice-pass".into(),
            })
            .await
            .unwrap();
        let bob = service
            .create_admin(CreateAdminRequest {
                username: "bob".into(),
                password: "bob-pass".into(),
            })
            .await
            .unwrap();

        let err = service
            .create_admin(CreateAdminRequest {
                username: "alice".into(),
                password: "another".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = service
            .create_admin(CreateAdminRequest {
                username: "carol".into(),
                password: "123".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = service
            .update_admin(
                bob.id,
                UpdateAdminRequest {
                    username: "alice".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let renamed = service
            .update_admin(
                bob.id,
                UpdateAdminRequest {
                    username: "robert".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.username, "robert");

        service
            .set_password(
                bob.id,
                SetPasswordRequest {
                    password: "new-secret".into(),
                },
            )
            .await
            .unwrap();
        service
            .login(credentials("robert", "new-secret"))
            .await
            .unwrap();
        assert!(service.login(credentials("robert", "bob-pass")).await.is_err());

        let err = service.delete_admin(alice.id, alice.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(service.get_admin(alice.id).await.is_ok());

        service.delete_admin(alice.id, bob.id).await.unwrap();
        assert!(matches!(
            service.get_admin(bob.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.delete_admin(alice.id, bob.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}

use crate::error::{AppError, AppResult};
use bcrypt::{DEFAULT_COST, hash, verify};

// 测试环境使用最低成本，避免单测过慢
const HASH_COST: u32 = if cfg!(test) { 4 } else { DEFAULT_COST };

/// 验证密码长度（bcrypt 只处理前 72 字节）
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 6 || password.len() > 72 {
        return Err(AppError::ValidationError(
            "Password must be between 6 and 72 characters".to_string(),
        ));
    }

    Ok(())
}

/// 对密码进行哈希
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, HASH_COST)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {e}")))
}

/// 验证密码
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Failed to verify password: {e}")))
}

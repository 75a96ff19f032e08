use crate::error::{AppError, AppResult};

pub const MAX_EVENT_NAME_LEN: usize = 255;
pub const MAX_PARTICIPANT_NAME_LEN: usize = 100;
pub const MAX_USERNAME_LEN: usize = 64;

/// 去除首尾空白并校验长度，返回规范化后的名称
fn normalize_name(raw: &str, field: &str, max_len: usize) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError(format!("{field} must not be empty")));
    }
    if name.chars().count() > max_len {
        return Err(AppError::ValidationError(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(name.to_string())
}

pub fn normalize_event_name(raw: &str) -> AppResult<String> {
    normalize_name(raw, "Event name", MAX_EVENT_NAME_LEN)
}

/// 参与者名称：大小写敏感，仅去除首尾空白
pub fn normalize_participant_name(raw: &str) -> AppResult<String> {
    normalize_name(raw, "Name", MAX_PARTICIPANT_NAME_LEN)
}

pub fn normalize_username(raw: &str) -> AppResult<String> {
    normalize_name(raw, "Username", MAX_USERNAME_LEN)
}

/// 空白描述视为未填写
pub fn normalize_description(raw: Option<String>) -> Option<String> {
    raw.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_trimmed_but_keep_case() {
        assert_eq!(normalize_participant_name("  Alice ").unwrap(), "Alice");
        assert_eq!(normalize_participant_name("aLiCe").unwrap(), "aLiCe");
    }

    #[test]
    fn test_blank_and_overlong_names_are_rejected() {
        assert!(normalize_participant_name("   ").is_err());
        assert!(normalize_event_name("").is_err());
        assert!(normalize_participant_name(&"n".repeat(101)).is_err());
        assert!(normalize_participant_name(&"n".repeat(100)).is_ok());
        assert!(normalize_username(&"u".repeat(65)).is_err());
    }

    #[test]
    fn test_blank_description_becomes_none() {
        assert_eq!(normalize_description(Some("  ".into())), None);
        assert_eq!(normalize_description(None), None);
        assert_eq!(
            normalize_description(Some(" Spring gala ".into())),
            Some("Spring gala".to_string())
        );
    }
}

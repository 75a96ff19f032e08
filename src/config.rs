use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub draw: DrawConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许的跨域来源，空列表表示不限制
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub default_username: String,
    pub default_password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            default_username: "admin".to_string(),
            default_password: "password".to_string(),
        }
    }
}

/// 抽奖事务冲突重试策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawConfig {
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_backoff_ms: 20,
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::from_toml_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("Missing DATABASE_URL and no config.toml found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                        allowed_origins: Vec::new(),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        expires_in: get_env_parse("JWT_EXPIRES_IN", 604_800i64),
                    },
                    admin: AdminConfig::default(),
                    draw: DrawConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            config.server.allowed_origins = split_origins(&v);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.expires_in = n;
        }
        if let Ok(v) = env::var("ADMIN_DEFAULT_USERNAME") {
            config.admin.default_username = v;
        }
        if let Ok(v) = env::var("ADMIN_DEFAULT_PASSWORD") {
            config.admin.default_password = v;
        }
        if let Ok(v) = env::var("DRAW_MAX_ATTEMPTS")
            && let Ok(n) = v.parse()
        {
            config.draw.max_attempts = n;
        }
        if let Ok(v) = env::var("DRAW_RETRY_BACKOFF_MS")
            && let Ok(n) = v.parse()
        {
            config.draw.retry_backoff_ms = n;
        }

        if config.draw.max_attempts == 0 {
            return Err("draw.max_attempts must be at least 1".into());
        }

        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_sections_fall_back_to_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [database]
            url = "postgres://localhost/raffle"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            expires_in = 3600
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert!(config.server.allowed_origins.is_empty());
        assert_eq!(config.admin.default_username, "admin");
        assert_eq!(config.draw.max_attempts, 5);
        assert_eq!(config.draw.retry_backoff_ms, 20);
    }

    #[test]
    fn test_missing_required_section_is_an_error() {
        assert!(Config::from_toml_str("[server]\nhost = \"x\"\nport = 1\n").is_err());
    }

    #[test]
    fn test_split_origins() {
        assert_eq!(
            split_origins("https://a.example, https://b.example,,"),
            vec!["https://a.example", "https://b.example"]
        );
    }
}

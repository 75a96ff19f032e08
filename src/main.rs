use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use raffle_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{EventNotifier, LogNotifier},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::{JwtService, OsSecureRandom, SecureRandom},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建JWT服务
    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.expires_in);

    // 创建服务
    let admin_service = AdminService::new(pool.clone(), jwt_service.clone());
    admin_service
        .ensure_default_admin(&config.admin)
        .await
        .expect("Failed to create default admin account");

    let rng: Arc<dyn SecureRandom> = Arc::new(OsSecureRandom);
    let event_service = EventService::new(pool.clone());
    let participant_service = ParticipantService::new(pool.clone());
    let draw_service = DrawService::new(pool.clone(), rng, config.draw.clone());

    // 活动进度写入日志
    let notifier: Arc<dyn EventNotifier> = Arc::new(LogNotifier);

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let allowed_origins = config.server.allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors(&allowed_origins))
            .app_data(web::Data::new(admin_service.clone()))
            .app_data(web::Data::new(event_service.clone()))
            .app_data(web::Data::new(participant_service.clone()))
            .app_data(web::Data::new(draw_service.clone()))
            .app_data(web::Data::from(notifier.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::event_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}

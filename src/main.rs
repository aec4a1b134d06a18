//! 活动管理服务主入口

use eventhub::{
    config::AppConfig, db, handlers::health, middleware::AppState, repository::Repositories,
    routes, telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// 命令行动作
enum Command {
    Run { config_path: Option<String> },
    Version,
    Help,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut config_path = None;
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" => return Ok(Command::Version),
            "--help" => return Ok(Command::Help),
            "--config" => match iter.next() {
                Some(path) => config_path = Some(path.clone()),
                None => return Err("--config 需要一个文件路径".to_string()),
            },
            other => return Err(format!("未知参数: {}", other)),
        }
    }

    Ok(Command::Run { config_path })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    let config_path = match parse_args(&args) {
        Ok(Command::Version) => {
            println!("eventhub {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Ok(Command::Help) => {
            print_help();
            return Ok(());
        }
        Ok(Command::Run { config_path }) => config_path,
        Err(msg) => {
            eprintln!("{}", msg);
            print_help();
            std::process::exit(1);
        }
    };

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    // 设置应用启动时间
    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::load(config_path.as_deref()).map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "eventhub starting...");

    // 3. 数据库连接池 + 迁移
    let db_pool = db::connect_and_migrate(&config.database).await?;

    tracing::info!("Database initialized");

    // 4. 构建应用状态
    let app_state = Arc::new(AppState::new(config.clone(), Repositories::postgres(db_pool))?);

    // 5. 构建路由
    let app = routes::create_router(app_state);

    // 6. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 7. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
///
/// 收到信号后开始关闭；超过超时时间仍未完成则强制退出
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    // 超时后强制关闭
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

/// 打印帮助信息
fn print_help() {
    println!("eventhub {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: eventhub [选项]");
    println!();
    println!("选项:");
    println!("  --config <路径>  YAML 配置文件（默认 config/eventhub.yaml，可选）");
    println!("  --version        打印版本信息并退出");
    println!("  --help           打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  EVENTHUB_<SECTION>__<KEY> 覆盖配置文件，例如 EVENTHUB_SECURITY__JWT_SECRET");
    println!("  可用选项请参考 .env.example");
}

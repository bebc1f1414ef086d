//! Comanda Server - 餐厅点餐后端
//!
//! # 架构概述
//!
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (sqlx, WAL)
//! - **认证** (`auth`): JWT + Argon2 认证体系，按请求解析权限
//! - **HTTP API** (`api`): RESTful API 接口，统一响应封套
//! - **金额** (`money`): rust_decimal 精确计价
//! - **传输** (`transfer`): CSV 导入/导出
//!
//! # 模块结构
//!
//! ```text
//! comanda-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、权限中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (filter / repository / seed)
//! ├── money.rs       # 金额计算
//! ├── transfer.rs    # CSV 导入导出
//! └── utils/         # 错误、日志、验证
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod money;
pub mod transfer;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

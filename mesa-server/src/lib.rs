//! Mesa Server - 多租户餐厅预订服务
//!
//! # 架构概述
//!
//! 本模块是 Mesa Server 的主入口，提供以下核心功能：
//!
//! - **预订引擎** (`booking`): 可用性快照、分配规划、事务化占座
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! mesa-server/src/
//! ├── core/          # 配置、状态、错误
//! ├── api/           # HTTP 路由和处理器
//! ├── booking/       # 预订槽位分配引擎
//! ├── db/            # 数据库层 (models + repository)
//! └── utils/         # 工具函数
//! ```
//!
//! # 正确性保证
//!
//! 双重预订的防线在存储事务内：占座写入在同一事务复查目标桌台
//! 占用，并对每张目标桌台 UPSERT 认领记录，让并发抢座者的写集
//! 相交、由引擎的提交校验拒绝后来者。应用进程不持有互斥锁，
//! 服务可水平扩展。

pub mod api;
pub mod booking;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use booking::{BookingService, CreateBookingInput};
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

/// 设置运行环境 (dotenv, 工作目录, 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_level = if config.is_production() { "info" } else { "debug" };
    init_logger_with_file(Some(log_level), Some(&config.logs_dir()));

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   __  ___
  /  |/  /__  _________ _
 / /|_/ / _ \/ ___/ __ `/
/ /  / /  __(__  ) /_/ /
/_/  /_/\___/____/\__,_/
    "#
    );
}

//! Server State
//!
//! 全局共享状态：配置、数据库句柄、预订服务。
//! 所有字段可廉价 Clone (句柄语义)，每个请求克隆一份。

use std::sync::Arc;
use std::time::Instant;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::booking::{BookingService, DisabledPaymentGateway, HttpPaymentGateway, PaymentGateway};
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;

#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 预订服务 (Arc 共享所有权)
    pub booking: Arc<BookingService>,
    /// 启动时刻 (健康检查的 uptime)
    pub started_at: Instant,
}

impl ServerState {
    /// 初始化服务器状态 (RocksDB 持久化存储)
    pub async fn initialize(config: &Config) -> Result<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| ServerError::Config(format!("Cannot create work dir: {e}")))?;

        let db_service = DbService::new(&config.database_dir())
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;

        Ok(Self::with_db(config.clone(), db_service))
    }

    /// 基于已打开的数据库构造状态 — 测试用内存库走这里
    pub fn with_db(config: Config, db_service: DbService) -> Self {
        let payment = build_payment_gateway(&config);
        let booking = BookingService::new(db_service.db.clone(), payment)
            .with_commit_retries(config.booking_commit_retries)
            .with_currency(config.currency.clone());

        Self {
            config,
            db: db_service.db,
            booking: Arc::new(booking),
            started_at: Instant::now(),
        }
    }
}

/// 按配置选择支付处理器：未配置地址时押金人工收取
fn build_payment_gateway(config: &Config) -> Arc<dyn PaymentGateway> {
    match (&config.payment_api_url, &config.payment_api_key) {
        (Some(url), Some(key)) => {
            tracing::info!(url = %url, "Payment gateway configured");
            Arc::new(HttpPaymentGateway::new(url.clone(), key.clone()))
        }
        _ => {
            tracing::info!("No payment gateway configured, deposits will be collected manually");
            Arc::new(DisabledPaymentGateway)
        }
    }
}

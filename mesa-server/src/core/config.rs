/// 服务器配置 - 预订服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/mesa | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DEFAULT_TIMEZONE | Europe/Madrid | 新建门店的默认时区 |
/// | BOOKING_COMMIT_RETRIES | 3 | 占座提交重试预算 |
/// | CURRENCY | EUR | 押金币种 |
/// | PAYMENT_API_URL | (未设置) | 支付处理器地址，未设置时押金按人工收取 |
/// | PAYMENT_API_KEY | (未设置) | 支付处理器密钥 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/mesa HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库与日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 预订引擎配置 ===
    /// 新建门店的默认时区
    pub default_timezone: String,
    /// 占座提交的重试预算
    pub booking_commit_retries: usize,
    /// 押金币种 (ISO 4217)
    pub currency: String,

    // === 支付处理器 ===
    /// 支付处理器地址 (None = 押金人工收取)
    pub payment_api_url: Option<String>,
    /// 支付处理器密钥
    pub payment_api_key: Option<String>,

    // === HTTP 服务 ===
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/mesa".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            default_timezone: std::env::var("DEFAULT_TIMEZONE")
                .unwrap_or_else(|_| "Europe/Madrid".into()),
            booking_commit_retries: std::env::var("BOOKING_COMMIT_RETRIES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "EUR".into()),

            payment_api_url: std::env::var("PAYMENT_API_URL").ok(),
            payment_api_key: std::env::var("PAYMENT_API_KEY").ok(),

            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库目录
    pub fn database_dir(&self) -> String {
        format!("{}/db", self.work_dir)
    }

    /// 日志目录
    pub fn logs_dir(&self) -> String {
        format!("{}/logs", self.work_dir)
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

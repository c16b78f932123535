use thiserror::Error;

/// 服务器启动/运行期错误
///
/// HTTP handler 的业务错误走 [`crate::utils::AppError`]；
/// 这里只覆盖进程级故障 (端口占用、数据库无法打开等)。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库初始化失败: {0}")]
    Database(String),

    #[error("网络绑定失败: {0}")]
    Bind(#[from] std::io::Error),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

/// 服务器生命周期的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;

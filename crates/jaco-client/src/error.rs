//! 客户端错误类型定义

use jaco_driver::DriverError;
use jaco_protocol::ConversionError;
use thiserror::Error;

/// 客户端层错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 服务未初始化（工作区围栏未配置）
    ///
    /// 除 `initialize` 外的所有入口在初始化前都返回此错误，
    /// 不发出任何执行器调用。
    #[error("not initialized")]
    NotInitialized,

    /// 未知的命令类型字符串
    #[error("Unsupported command type '{0}'")]
    UnsupportedCommandType(String),

    /// 载荷转换失败
    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    /// 配置非法
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// 驱动层错误
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

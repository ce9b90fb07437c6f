//! 协议层错误类型定义

use thiserror::Error;

/// 单位/载荷转换错误
///
/// 转换错误在任何执行器调用发出之前被拒绝，因此不会产生部分副作用。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// 载荷长度与期望不符
    #[error("Payload length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// 未知的单位字符串
    #[error("Unsupported unit '{unit}' for {context}")]
    UnsupportedUnit { unit: String, context: &'static str },

    /// 手指子命令既不是标量也不是 3 维向量
    #[error("Finger command must be a scalar or a 3-vector, got {actual} values")]
    InvalidFingerCommand { actual: usize },
}

//! 驱动层错误类型定义

use crate::bus::BusError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 总线错误
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// 连接建立阶段未等到首个反馈
    #[error("Connection timeout: no feedback received from {source_name}")]
    ConnectionTimeout {
        /// 缺失的反馈源名称
        source_name: &'static str,
    },

    /// 有界状态等待超时
    #[error("Timed out waiting for a state sample")]
    StateWaitTimeout,

    /// 反馈通道已关闭
    #[error("Feedback channel closed")]
    ChannelClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DriverError::ConnectionTimeout {
            source_name: "tool pose",
        };
        assert!(err.to_string().contains("tool pose"));

        let err: DriverError = BusError::Disconnected.into();
        assert!(matches!(err, DriverError::Bus(_)));
    }
}

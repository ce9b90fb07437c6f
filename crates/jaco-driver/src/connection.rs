//! 连接建立阶段的就绪门
//!
//! 在接受任何命令之前必须确认反馈流是活的：限时等待首个工具位姿
//! 和首个手指位姿。任一缺席说明驱动没有在发布，继续运行只会产生
//! 基于陈旧零值状态的命令，因此就绪失败是致命错误。

use crate::error::DriverError;
use crate::store::StateStore;
use std::time::Duration;
use tracing::{info, warn};

/// 等待首批反馈样本到齐
///
/// 工具位姿和手指位姿各自限时等待（条件变量，无轮询）。
pub fn await_bring_up(store: &StateStore, timeout: Duration) -> Result<(), DriverError> {
    if store.wait_for_tool_pose(timeout).is_none() {
        warn!(timeout_s = timeout.as_secs_f64(), "No tool pose received during bring-up");
        return Err(DriverError::ConnectionTimeout {
            source_name: "tool pose",
        });
    }
    if store.wait_for_finger_pose(timeout).is_none() {
        warn!(timeout_s = timeout.as_secs_f64(), "No finger pose received during bring-up");
        return Err(DriverError::ConnectionTimeout {
            source_name: "finger pose",
        });
    }
    info!("Feedback streams are live, bring-up complete");
    Ok(())
}

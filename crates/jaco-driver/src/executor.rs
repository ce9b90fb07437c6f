//! 动作执行器：发送 → 限时等待 → 超时取消
//!
//! 每个离散目标走同一个协议：通过总线发送拿到
//! [`GoalTicket`](crate::bus::GoalTicket)，在完成通道上限时等待；
//! 超时则向该目标所属接口发出 `cancel_all`，返回超时结果。等待
//! 基于通道的 `recv_timeout`，没有轮询。
//!
//! 执行器永远返回 [`ActionOutcome`] 而不是错误——上层即使在失败
//! 时也要组装响应消息。总线层面的失败（断连/拒绝）映射为带错误
//! 文本的失败结果。

use crate::bus::{ActuatorBus, BusError};
use crossbeam_channel::RecvTimeoutError;
use jaco_protocol::{ActionOutcome, ActuatorGoal, JointVelocityCommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// 动作执行器
#[derive(Clone)]
pub struct ActionExecutor {
    bus: Arc<dyn ActuatorBus>,
    timeout: Duration,
}

impl ActionExecutor {
    /// 创建执行器
    pub fn new(bus: Arc<dyn ActuatorBus>, timeout: Duration) -> Self {
        ActionExecutor { bus, timeout }
    }

    /// 执行一个离散目标，阻塞至完成或超时
    ///
    /// 超时后对目标接口发 `cancel_all`，保证硬件不会继续执行已被
    /// 放弃的目标。取消请求本身失败只记日志，不改变超时结果。
    pub fn execute(&self, goal: ActuatorGoal) -> ActionOutcome {
        let interface = goal.interface();

        let ticket = match self.bus.send_goal(goal) {
            Ok(ticket) => ticket,
            Err(err) => {
                warn!(interface = interface.name(), error = %err, "Failed to send goal");
                return ActionOutcome::failure(err.to_string());
            }
        };
        debug!(
            interface = interface.name(),
            goal_id = ticket.id.0,
            "Goal sent, awaiting completion"
        );

        match ticket.done.recv_timeout(self.timeout) {
            Ok(completion) => {
                debug!(goal_id = completion.goal_id.0, "Goal completed");
                ActionOutcome::finished(interface)
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    interface = interface.name(),
                    goal_id = ticket.id.0,
                    timeout_s = self.timeout.as_secs_f64(),
                    "Goal timed out, cancelling all goals on interface"
                );
                if let Err(err) = self.bus.cancel_all(interface) {
                    warn!(error = %err, "Cancel request failed");
                }
                ActionOutcome::timeout()
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(
                    interface = interface.name(),
                    "Completion channel dropped before goal finished"
                );
                ActionOutcome::failure(BusError::Disconnected.to_string())
            }
        }
    }

    /// 只发送目标，不等待完成
    ///
    /// 凭据被立即丢弃，完成通知在总线侧发送失败并被忽略。
    pub fn issue(&self, goal: ActuatorGoal) -> bool {
        let interface = goal.interface();
        match self.bus.send_goal(goal) {
            Ok(_ticket) => true,
            Err(err) => {
                warn!(interface = interface.name(), error = %err, "Failed to issue goal");
                false
            }
        }
    }

    /// 发布一条关节速度命令
    pub fn publish_velocity(&self, cmd: &JointVelocityCommand) -> Result<(), BusError> {
        self.bus.publish_velocity(cmd)
    }

    /// 发布期望关节位置（调试旁路通道）
    pub fn publish_desired_position(&self, positions_rad: &[f64]) -> Result<(), BusError> {
        self.bus.publish_desired_position(positions_rad)
    }

    /// 当前动作超时
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

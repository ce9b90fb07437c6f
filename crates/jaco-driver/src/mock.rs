//! 测试用的模拟总线
//!
//! 记录所有出站流量（速度发布、期望位置、目标、取消），并按每个
//! 接口配置的 [`GoalBehavior`] 驱动完成通道。不依赖任何硬件或
//! 中间件，供本 crate 与上层 crate 的测试共用（`mock` feature）。

use crate::bus::{ActuatorBus, BusError, GoalTicket};
use crossbeam_channel::Sender;
use jaco_protocol::{
    ActuatorGoal, GoalCompletion, GoalId, GoalInterface, JointVelocityCommand,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 目标完成行为
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalBehavior {
    /// 延迟指定时长后发送完成通知
    CompleteAfter(Duration),
    /// 永不完成（用于触发超时路径）
    Never,
}

impl Default for GoalBehavior {
    fn default() -> Self {
        GoalBehavior::CompleteAfter(Duration::from_millis(1))
    }
}

#[derive(Default)]
struct MockState {
    next_goal_id: u64,
    behaviors: HashMap<GoalInterface, GoalBehavior>,
    sent_goals: Vec<(ActuatorGoal, Instant)>,
    cancels: Vec<GoalInterface>,
    velocity_publishes: Vec<(JointVelocityCommand, Instant)>,
    desired_positions: Vec<Vec<f64>>,
    /// Never 行为的挂起发送端，保持完成通道打开以免提前断连
    pending: Vec<Sender<GoalCompletion>>,
    fail_publishes: bool,
}

/// 模拟执行器总线
///
/// `Clone` 共享内部状态，测试侧保留一份句柄用于配置和断言。
#[derive(Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<MockState>>,
}

impl MockBus {
    /// 创建模拟总线
    pub fn new() -> Self {
        Self::default()
    }

    /// 配置某接口上目标的完成行为
    pub fn set_behavior(&self, interface: GoalInterface, behavior: GoalBehavior) {
        self.state.lock().behaviors.insert(interface, behavior);
    }

    /// 让后续的流式发布失败（模拟断连）
    pub fn fail_publishes(&self, fail: bool) {
        self.state.lock().fail_publishes = fail;
    }

    /// 已记录的速度发布（命令 + 发布时刻）
    pub fn velocity_publishes(&self) -> Vec<(JointVelocityCommand, Instant)> {
        self.state.lock().velocity_publishes.clone()
    }

    /// 已记录的期望位置发布
    pub fn desired_positions(&self) -> Vec<Vec<f64>> {
        self.state.lock().desired_positions.clone()
    }

    /// 已发送的目标（目标 + 发送时刻）
    pub fn sent_goals(&self) -> Vec<(ActuatorGoal, Instant)> {
        self.state.lock().sent_goals.clone()
    }

    /// 某接口上已发送的目标数
    pub fn sent_goal_count(&self, interface: GoalInterface) -> usize {
        self.state
            .lock()
            .sent_goals
            .iter()
            .filter(|(goal, _)| goal.interface() == interface)
            .count()
    }

    /// 某接口上收到的取消请求数
    pub fn cancel_count(&self, interface: GoalInterface) -> usize {
        self.state
            .lock()
            .cancels
            .iter()
            .filter(|i| **i == interface)
            .count()
    }
}

impl ActuatorBus for MockBus {
    fn publish_velocity(&self, cmd: &JointVelocityCommand) -> Result<(), BusError> {
        let mut state = self.state.lock();
        if state.fail_publishes {
            return Err(BusError::Disconnected);
        }
        state.velocity_publishes.push((cmd.clone(), Instant::now()));
        Ok(())
    }

    fn publish_desired_position(&self, positions_rad: &[f64]) -> Result<(), BusError> {
        let mut state = self.state.lock();
        if state.fail_publishes {
            return Err(BusError::Disconnected);
        }
        state.desired_positions.push(positions_rad.to_vec());
        Ok(())
    }

    fn send_goal(&self, goal: ActuatorGoal) -> Result<GoalTicket, BusError> {
        let interface = goal.interface();
        let (tx, rx) = crossbeam_channel::bounded(1);

        let mut state = self.state.lock();
        state.next_goal_id += 1;
        let id = GoalId(state.next_goal_id);
        state.sent_goals.push((goal, Instant::now()));

        match state.behaviors.get(&interface).copied().unwrap_or_default() {
            GoalBehavior::CompleteAfter(delay) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    // 接收端可能已超时丢弃，发送失败可直接忽略
                    let _ = tx.send(GoalCompletion { goal_id: id });
                });
            }
            GoalBehavior::Never => {
                state.pending.push(tx);
            }
        }

        Ok(GoalTicket { id, done: rx })
    }

    fn cancel_all(&self, interface: GoalInterface) -> Result<(), BusError> {
        self.state.lock().cancels.push(interface);
        Ok(())
    }
}

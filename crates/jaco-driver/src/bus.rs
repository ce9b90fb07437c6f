//! 执行器总线抽象层
//!
//! 两个方向的接口边界：
//! - **出站**：[`ActuatorBus`]——速度流的 fire-and-forget 发布和
//!   离散动作目标的发送/取消；
//! - **入站**：[`FeedbackEvent`]——驱动按自己的节奏推送的三类反馈，
//!   经 crossbeam 通道进入摄取线程。
//!
//! 真实实现包装具体的中间件（ROS 话题/动作服务器）；测试使用
//! [`MockBus`](crate::mock::MockBus)。

use crossbeam_channel::{Receiver, Sender};
use jaco_protocol::{
    ActuatorGoal, FingerPose, GoalCompletion, GoalId, GoalInterface, JointStateSample,
    JointVelocityCommand, ToolPose,
};
use thiserror::Error;

/// 总线错误类型
#[derive(Error, Debug, Clone)]
pub enum BusError {
    /// 总线连接已断开
    #[error("Actuator bus disconnected")]
    Disconnected,

    /// 目标被驱动拒绝
    #[error("Goal rejected by driver: {0}")]
    Rejected(String),
}

/// 入站反馈事件
///
/// 每个事件对应 StateStore 中一个字段组的一次原子写入。
#[derive(Debug, Clone)]
pub enum FeedbackEvent {
    /// 关节状态样本（位置/速度/力矩，整体提交）
    JointState(JointStateSample),
    /// 工具位姿
    ToolPose(ToolPose),
    /// 手指位姿
    FingerPose(FingerPose),
}

/// 创建反馈通道
///
/// 发送端交给传输层的订阅回调，接收端交给
/// [`spawn_ingest`](crate::ingest::spawn_ingest)。
pub fn feedback_channel() -> (Sender<FeedbackEvent>, Receiver<FeedbackEvent>) {
    crossbeam_channel::unbounded()
}

/// 已发送目标的凭据
///
/// 持有目标 ID 和完成通道接收端。执行器在接收端上限时等待；
/// 超时后凭据被丢弃，迟到的完成通知发送失败并被总线忽略——
/// 被取消的目标不会在事后改写任何状态。
#[derive(Debug)]
pub struct GoalTicket {
    /// 目标 ID
    pub id: GoalId,
    /// 完成通知接收端
    pub done: Receiver<GoalCompletion>,
}

/// 执行器命令总线
///
/// 流式发布和离散目标是两种不同的能力，不共用一个 API：
/// `publish_*` 没有结果，`send_goal`/`cancel_all` 配合
/// [`GoalTicket`] 构成发送-等待-取消协议。
pub trait ActuatorBus: Send + Sync {
    /// 发布关节速度命令（fire-and-forget，无完成事件）
    fn publish_velocity(&self, cmd: &JointVelocityCommand) -> Result<(), BusError>;

    /// 发布期望关节位置（调试/增益整定用的旁路通道）
    fn publish_desired_position(&self, positions_rad: &[f64]) -> Result<(), BusError>;

    /// 发送离散动作目标，返回完成凭据
    fn send_goal(&self, goal: ActuatorGoal) -> Result<GoalTicket, BusError>;

    /// 取消指定接口上所有未完成的目标
    fn cancel_all(&self, interface: GoalInterface) -> Result<(), BusError>;
}

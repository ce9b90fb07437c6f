//! # Jaco Protocol Layer
//!
//! 机械臂控制的叶子层：纯数据类型和无状态的单位转换函数。
//!
//! 本 crate 不包含线程、锁或 IO，上层（`jaco-driver`、`jaco-client`）
//! 在此之上构建并发的命令分发与状态同步逻辑。

pub mod error;
pub mod goal;
pub mod state;
pub mod units;

pub use error::ConversionError;
pub use goal::{
    ActionOutcome, ActuatorGoal, FingerPositionGoal, GoalCompletion, GoalId, GoalInterface,
    JointAnglesGoal, JointVelocityCommand, ToolPoseGoal,
};
pub use state::{FingerPose, JointStateSample, RobotSnapshot, ToolPose};

/// 手指丝杠的最大行程（厂商常量，Kinova API 文档）
///
/// 手指位置目标在发送前必须被钳位到 `[0, MAX_FINGER_TURNS]`。
pub const MAX_FINGER_TURNS: f64 = 6800.0;

/// 单根手指的最大直线行程（毫米，厂商常量 18.9/2）
///
/// 与 [`MAX_FINGER_TURNS`] 对应同一个全闭位置。
pub const MAX_FINGER_MM: f64 = 9.45;

/// 速度命令的发布频率（Hz）
///
/// Kinova API 要求关节速度流必须以 100 Hz 发送。
pub const COMMAND_RATE_HZ: f64 = 100.0;

/// 离散动作目标的默认等待超时
pub const DEFAULT_ACTION_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// 速度跟踪开始前等待机械臂到达轨迹起点的默认时间
pub const DEFAULT_TRACKER_SETTLE: std::time::Duration = std::time::Duration::from_secs(10);

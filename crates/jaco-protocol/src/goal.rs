//! 执行器请求类型定义
//!
//! 两类出站命令：
//! - **流式命令**（速度）：fire-and-forget 发布，没有离散完成事件；
//! - **动作目标**（关节角 / 工具位姿 / 手指位置 / 归位）：可取消、
//!   异步完成的离散请求，通过 ActionExecutor 的发送-等待-取消协议执行。

use serde::{Deserialize, Serialize};

/// 动作目标 ID
///
/// 总线为每个已发送目标分配唯一 ID；超时取消后迟到的完成回调
/// 凭此 ID 被丢弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalId(pub u64);

/// 动作接口类别
///
/// 超时取消按接口粒度进行：取消某接口上所有未完成的目标，
/// 不影响其他接口。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalInterface {
    /// 关节角动作服务器
    JointAngles,
    /// 工具位姿动作服务器
    ToolPose,
    /// 手指位置动作服务器
    FingerPosition,
    /// 归位服务
    Home,
}

impl GoalInterface {
    /// 接口名（用于构造结果消息）
    pub fn name(&self) -> &'static str {
        match self {
            GoalInterface::JointAngles => "JOINT_ANGLES",
            GoalInterface::ToolPose => "TOOL_POSE",
            GoalInterface::FingerPosition => "FINGER_POSITION",
            GoalInterface::Home => "HOME",
        }
    }
}

/// 关节角目标
///
/// 角度使用驱动原生单位（度）。规划在机械臂基座中完成。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointAnglesGoal {
    /// 每个关节的目标角（度），长度等于关节数
    pub angles_deg: Vec<f64>,
}

/// 工具位姿目标（基座坐标系）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolPoseGoal {
    /// 平移 `[x, y, z]`（米）
    pub position: [f64; 3],
    /// 姿态四元数 `[qx, qy, qz, qw]`
    pub orientation: [f64; 4],
}

/// 手指位置目标
///
/// 行程使用原生丝杠转数，调用方负责钳位到 `[0, MAX_FINGER_TURNS]`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FingerPositionGoal {
    /// 三根手指的目标转数 `[f1, f2, f3]`
    pub turns: [f64; 3],
}

/// 离散执行器目标（发送-等待-取消协议的载荷）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActuatorGoal {
    /// 关节角目标
    JointAngles(JointAnglesGoal),
    /// 工具位姿目标
    ToolPose(ToolPoseGoal),
    /// 手指位置目标
    FingerPosition(FingerPositionGoal),
    /// 归位（无参数）
    Home,
}

impl ActuatorGoal {
    /// 目标所属的动作接口
    pub fn interface(&self) -> GoalInterface {
        match self {
            ActuatorGoal::JointAngles(_) => GoalInterface::JointAngles,
            ActuatorGoal::ToolPose(_) => GoalInterface::ToolPose,
            ActuatorGoal::FingerPosition(_) => GoalInterface::FingerPosition,
            ActuatorGoal::Home => GoalInterface::Home,
        }
    }
}

/// 关节速度流命令
///
/// fire-and-forget 发布，必须维持 100 Hz 节奏。速度使用驱动
/// 原生单位（度/秒）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointVelocityCommand {
    /// 每个关节的目标速度（度/秒）
    pub velocities_deg: Vec<f64>,
}

/// 目标完成通知
///
/// 总线在目标执行完毕后通过完成通道发送一次。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalCompletion {
    /// 完成的目标 ID
    pub goal_id: GoalId,
}

/// 动作结果
///
/// 永远是一个值而不是错误：调用方即使在失败时也要组装响应。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// 是否成功
    pub succeeded: bool,
    /// 结果消息（`"+<ACTION>_FINISHED"`、`"+TIMEOUT"` 等）
    pub message: String,
}

impl ActionOutcome {
    /// 目标在超时前完成
    pub fn finished(interface: GoalInterface) -> Self {
        ActionOutcome {
            succeeded: true,
            message: format!("+{}_FINISHED", interface.name()),
        }
    }

    /// 目标在超时内未完成，已发出取消
    pub fn timeout() -> Self {
        ActionOutcome {
            succeeded: false,
            message: "+TIMEOUT".to_string(),
        }
    }

    /// 带自定义消息的成功结果
    pub fn success(message: impl Into<String>) -> Self {
        ActionOutcome {
            succeeded: true,
            message: message.into(),
        }
    }

    /// 带自定义消息的失败结果
    pub fn failure(message: impl Into<String>) -> Self {
        ActionOutcome {
            succeeded: false,
            message: message.into(),
        }
    }

    /// 合并次级结果（例如工具位姿目标之后的手指子命令）
    ///
    /// 总体成功要求两者都成功；消息用 `"; "` 连接。
    pub fn merge(self, other: ActionOutcome) -> ActionOutcome {
        ActionOutcome {
            succeeded: self.succeeded && other.succeeded,
            message: format!("{}; {}", self.message, other.message),
        }
    }
}

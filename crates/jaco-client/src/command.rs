//! 命令解析层
//!
//! 把外部接口送来的原始字符串命令（类型 / 单位 / 相对标志 / 数值
//! 载荷）解析为带标签的 [`Command`] 枚举。解析在任何执行器调用
//! 之前完成，非法输入被整体拒绝，不产生部分副作用。
//!
//! 下游分发对 `Command` 做穷尽匹配，新增命令类型时编译器会指出
//! 所有需要更新的位置。

use crate::error::ClientError;
use jaco_protocol::units::{normalized_to_percent, percent_to_turns};
use jaco_protocol::ConversionError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 角度单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    /// 度（驱动原生单位）
    Degrees,
    /// 弧度
    Radians,
}

impl FromStr for AngleUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deg" => Ok(AngleUnit::Degrees),
            "rad" => Ok(AngleUnit::Radians),
            other => Err(ConversionError::UnsupportedUnit {
                unit: other.to_string(),
                context: "angle command",
            }),
        }
    }
}

/// 工具位姿单位
///
/// 决定位姿段的长度：欧拉角形式 6 个值，四元数形式 7 个值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoseUnit {
    /// 米 + 四元数 `[x, y, z, qx, qy, qz, qw]`
    MetersQuaternion,
    /// 米 + 欧拉角（度）`[x, y, z, roll, pitch, yaw]`
    MetersDegrees,
    /// 米 + 欧拉角（弧度）`[x, y, z, roll, pitch, yaw]`
    MetersRadians,
}

impl PoseUnit {
    /// 该单位下位姿段的长度
    pub fn pose_len(&self) -> usize {
        match self {
            PoseUnit::MetersQuaternion => 7,
            PoseUnit::MetersDegrees | PoseUnit::MetersRadians => 6,
        }
    }
}

impl FromStr for PoseUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mq" => Ok(PoseUnit::MetersQuaternion),
            "mdeg" => Ok(PoseUnit::MetersDegrees),
            // 裸 "m" 是米 + 弧度欧拉角的简写
            "m" | "mrad" => Ok(PoseUnit::MetersRadians),
            other => Err(ConversionError::UnsupportedUnit {
                unit: other.to_string(),
                context: "tool pose command",
            }),
        }
    }
}

/// 原始命令请求
///
/// 外部接口的直接映射：类型和单位还是字符串，载荷是扁平数组。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    /// 命令类型（`"VEL"` / `"ANGLE"` / `"TOOL"`）
    pub command_type: String,
    /// 单位字符串
    pub unit: String,
    /// 相对/绝对语义
    #[serde(default)]
    pub relative: bool,
    /// 速度命令的重复发布次数
    #[serde(default)]
    pub repeat: usize,
    /// 数值载荷
    pub data: Vec<f64>,
}

/// 已解析的命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 关节速度流命令
    Velocity {
        /// 角速度单位
        unit: AngleUnit,
        /// 按 10 ms 节拍重复发布的次数
        repeat: usize,
        /// 每个关节的目标速度
        data: Vec<f64>,
    },
    /// 关节角目标（可带手指尾段）
    JointAngle {
        /// 角度单位
        unit: AngleUnit,
        /// 相对当前关节角
        relative: bool,
        /// 关节角 + 可选手指段
        data: Vec<f64>,
    },
    /// 工具位姿目标（可带手指尾段）
    ToolPose {
        /// 位姿单位
        unit: PoseUnit,
        /// 相对当前位姿
        relative: bool,
        /// 位姿 + 可选手指段
        data: Vec<f64>,
    },
}

impl CommandRequest {
    /// 解析为带标签的命令
    ///
    /// 未知命令类型返回 [`ClientError::UnsupportedCommandType`]，
    /// 与执行超时是不同的失败类别。
    pub fn parse(&self) -> Result<Command, ClientError> {
        match self.command_type.as_str() {
            "VEL" => Ok(Command::Velocity {
                unit: self.unit.parse().map_err(ClientError::Conversion)?,
                repeat: self.repeat.max(1),
                data: self.data.clone(),
            }),
            "ANGLE" => Ok(Command::JointAngle {
                unit: self.unit.parse().map_err(ClientError::Conversion)?,
                relative: self.relative,
                data: self.data.clone(),
            }),
            "TOOL" => Ok(Command::ToolPose {
                unit: self.unit.parse().map_err(ClientError::Conversion)?,
                relative: self.relative,
                data: self.data.clone(),
            }),
            other => Err(ClientError::UnsupportedCommandType(other.to_string())),
        }
    }
}

/// 归一化手指尾段 → 丝杠转数
///
/// 尾段要么是 1 个标量（广播到三根手指），要么是 3 维向量。
/// 取值约定 `[-1, 1]`：-1 全开，+1 全闭；超限先钳位。
/// 输出已钳位到 `[0, MAX_FINGER_TURNS]`。
pub fn normalize_finger_command(values: &[f64]) -> Result<[f64; 3], ConversionError> {
    let normalized: [f64; 3] = match values {
        [single] => [*single; 3],
        [f1, f2, f3] => [*f1, *f2, *f3],
        other => {
            return Err(ConversionError::InvalidFingerCommand {
                actual: other.len(),
            });
        }
    };
    let mut turns = [0.0; 3];
    for (out, value) in turns.iter_mut().zip(normalized.iter()) {
        *out = percent_to_turns(normalized_to_percent(*value));
    }
    Ok(turns)
}

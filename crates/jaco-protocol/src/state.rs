//! 反馈状态数据结构定义
//!
//! 三类反馈（关节状态 / 工具位姿 / 手指位姿）各自独立更新，
//! 对应 StateStore 中三把独立的锁。

use serde::{Deserialize, Serialize};

/// 单次关节状态反馈样本
///
/// 一次反馈事件携带的所有关节字段作为一个整体写入，
/// 读者不会观察到撕裂的部分更新。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointStateSample {
    /// 相对驱动时钟的时间偏移（秒）
    pub time_offset_s: f64,
    /// 关节位置（弧度）
    pub positions: Vec<f64>,
    /// 关节速度（弧度/秒）
    pub velocities: Vec<f64>,
    /// 关节力矩（N·m）
    pub efforts: Vec<f64>,
}

/// 工具位姿：`[x, y, z, qx, qy, qz, qw]`，基座坐标系
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolPose(pub [f64; 7]);

impl Default for ToolPose {
    fn default() -> Self {
        // 单位四元数，避免零四元数的退化姿态
        ToolPose([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0])
    }
}

impl ToolPose {
    /// 平移分量 `[x, y, z]`
    pub fn translation(&self) -> [f64; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// 姿态四元数 `[qx, qy, qz, qw]`
    pub fn orientation(&self) -> [f64; 4] {
        [self.0[3], self.0[4], self.0[5], self.0[6]]
    }
}

/// 手指位姿：三根手指的丝杠转数 `[f1, f2, f3]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FingerPose(pub [f64; 3]);

/// 机器人状态快照
///
/// StateStore 深拷贝返回的一致性快照。三个字段组（关节/工具/手指）
/// 各自原子，但彼此之间不保证全局顺序——读者可能看到比工具位姿
/// 更新的关节样本。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotSnapshot {
    /// 自上次 reset 以来的关节反馈事件计数，严格递增
    pub sample_count: u64,
    /// 最新关节样本的时间偏移（秒）
    pub time_offset_s: f64,
    /// 关节位置（弧度）
    pub joint_positions: Vec<f64>,
    /// 关节速度（弧度/秒）
    pub joint_velocities: Vec<f64>,
    /// 关节力矩（N·m）
    pub joint_efforts: Vec<f64>,
    /// 工具位姿
    pub tool_pose: ToolPose,
    /// 手指位姿
    pub finger_pose: FingerPose,
}

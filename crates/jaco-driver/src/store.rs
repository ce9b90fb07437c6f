//! StateStore - 线程安全的最新状态持有者
//!
//! 三个反馈字段组（关节状态 / 工具位姿 / 手指位姿）各自持有独立的
//! `parking_lot::Mutex` + `Condvar`，写路径拷入、读路径拷出，锁内
//! 不做任何阻塞调用。细粒度锁保证工具/手指更新不会阻塞高频的
//! 关节状态写入者。
//!
//! # 顺序保证
//!
//! - 同一字段组的写入由该字段的锁串行化，读者看到的永远是某次
//!   完整写入的结果（无撕裂读）。
//! - `reset()` 先行发生于下一条命令的第一次写入，reset 之后的读
//!   不会观察到之前命令的样本。
//! - 三个字段组之间不提供全局顺序。
//!
//! # 阻塞等待
//!
//! 启动就绪门（首个工具/手指位姿）和 `get_state` 的"等第一个关节
//! 样本"都用条件变量 + 有界超时实现，不做忙等轮询。

use crate::bus::FeedbackEvent;
use jaco_protocol::{FingerPose, JointStateSample, RobotSnapshot, ToolPose};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::Duration;

/// 关节状态槽：最新样本 + 有界的时间偏移轨迹
#[derive(Debug, Default)]
struct JointSlot {
    /// 自上次 reset 以来的反馈事件计数，严格递增
    sample_count: u64,
    /// 最新样本
    latest: JointStateSample,
    /// 最近样本的时间偏移轨迹（有界）
    trace: VecDeque<f64>,
}

/// 位姿槽：值 + 新鲜度标志
///
/// `received` 只在连接建立阶段作为就绪门使用，稳态热路径不碰它。
#[derive(Debug, Default)]
struct PoseSlot<T> {
    received: bool,
    value: T,
}

/// 默认的轨迹容量
pub const DEFAULT_TRACE_CAPACITY: usize = 4096;

/// 线程安全的状态存储
pub struct StateStore {
    joint: Mutex<JointSlot>,
    joint_cond: Condvar,
    tool: Mutex<PoseSlot<ToolPose>>,
    tool_cond: Condvar,
    finger: Mutex<PoseSlot<FingerPose>>,
    finger_cond: Condvar,
    trace_capacity: usize,
}

impl StateStore {
    /// 创建空的状态存储
    pub fn new(trace_capacity: usize) -> Self {
        StateStore {
            joint: Mutex::new(JointSlot::default()),
            joint_cond: Condvar::new(),
            tool: Mutex::new(PoseSlot::default()),
            tool_cond: Condvar::new(),
            finger: Mutex::new(PoseSlot::default()),
            finger_cond: Condvar::new(),
            trace_capacity,
        }
    }

    /// 写入一个关节状态样本
    ///
    /// 只由反馈摄取路径调用。整个样本在一把锁内提交，计数递增，
    /// 然后唤醒所有等待首个样本的读者。
    pub fn write_joint_state(&self, sample: JointStateSample) {
        {
            let mut slot = self.joint.lock();
            slot.sample_count += 1;
            if slot.trace.len() == self.trace_capacity {
                slot.trace.pop_front();
            }
            slot.trace.push_back(sample.time_offset_s);
            slot.latest = sample;
        }
        self.joint_cond.notify_all();
    }

    /// 写入工具位姿
    pub fn write_tool_pose(&self, pose: ToolPose) {
        {
            let mut slot = self.tool.lock();
            slot.received = true;
            slot.value = pose;
        }
        self.tool_cond.notify_all();
    }

    /// 写入手指位姿
    pub fn write_finger_pose(&self, pose: FingerPose) {
        {
            let mut slot = self.finger.lock();
            slot.received = true;
            slot.value = pose;
        }
        self.finger_cond.notify_all();
    }

    /// 应用一个反馈事件
    pub fn apply(&self, event: FeedbackEvent) {
        match event {
            FeedbackEvent::JointState(sample) => self.write_joint_state(sample),
            FeedbackEvent::ToolPose(pose) => self.write_tool_pose(pose),
            FeedbackEvent::FingerPose(pose) => self.write_finger_pose(pose),
        }
    }

    /// 读取一致性快照（逐字段加锁、深拷贝、释放）
    ///
    /// 每个字段组内部原子；字段组之间可能来自不同的反馈周期。
    pub fn snapshot(&self) -> RobotSnapshot {
        let (sample_count, latest) = {
            let slot = self.joint.lock();
            (slot.sample_count, slot.latest.clone())
        };
        let tool_pose = self.tool.lock().value;
        let finger_pose = self.finger.lock().value;

        RobotSnapshot {
            sample_count,
            time_offset_s: latest.time_offset_s,
            joint_positions: latest.positions,
            joint_velocities: latest.velocities,
            joint_efforts: latest.efforts,
            tool_pose,
            finger_pose,
        }
    }

    /// 读取当前工具位姿（拷贝）
    pub fn read_tool_pose(&self) -> ToolPose {
        self.tool.lock().value
    }

    /// 读取当前手指位姿（拷贝）
    pub fn read_finger_pose(&self) -> FingerPose {
        self.finger.lock().value
    }

    /// 自上次 reset 以来的样本计数
    pub fn sample_count(&self) -> u64 {
        self.joint.lock().sample_count
    }

    /// 当前轨迹中的时间偏移序列（拷贝）
    pub fn trace(&self) -> Vec<f64> {
        self.joint.lock().trace.iter().copied().collect()
    }

    /// 原子地清零样本计数并清空轨迹
    ///
    /// 必须在分发新命令之前调用，使命令之后的 `get_state` 只反映
    /// 该命令执行期间产生的反馈。
    pub fn reset(&self) {
        let mut slot = self.joint.lock();
        slot.sample_count = 0;
        slot.trace.clear();
    }

    /// 阻塞等待 reset 之后的第一个关节样本
    ///
    /// 条件变量等待，有界超时。成功时返回快照。
    pub fn wait_for_sample(&self, timeout: Duration) -> Option<RobotSnapshot> {
        {
            let mut slot = self.joint.lock();
            let result =
                self.joint_cond
                    .wait_while_for(&mut slot, |s| s.sample_count == 0, timeout);
            if result.timed_out() && slot.sample_count == 0 {
                return None;
            }
        }
        Some(self.snapshot())
    }

    /// 启动就绪门：等待第一个工具位姿
    pub fn wait_for_tool_pose(&self, timeout: Duration) -> Option<ToolPose> {
        let mut slot = self.tool.lock();
        let result = self
            .tool_cond
            .wait_while_for(&mut slot, |s| !s.received, timeout);
        if result.timed_out() && !slot.received {
            return None;
        }
        Some(slot.value)
    }

    /// 启动就绪门：等待第一个手指位姿
    pub fn wait_for_finger_pose(&self, timeout: Duration) -> Option<FingerPose> {
        let mut slot = self.finger.lock();
        let result = self
            .finger_cond
            .wait_while_for(&mut slot, |s| !s.received, timeout);
        if result.timed_out() && !slot.received {
            return None;
        }
        Some(slot.value)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_CAPACITY)
    }
}

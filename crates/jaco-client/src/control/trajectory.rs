//! 关节轨迹
//!
//! 速度跟踪循环消费的只读轨迹：起点关节角 + 等间隔采样的路点序列。
//! 路点在 `[0, total_t]` 上均匀分布，按流逝时间查找目标路点。

/// 只读的关节轨迹（弧度）
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// 起点关节角（跟踪开始前先把机械臂移到这里）
    pub start_pos: Vec<f64>,
    /// 等间隔路点，每个路点是一组关节角
    pub waypoints: Vec<Vec<f64>>,
    /// 轨迹总时长（秒）
    pub total_t: f64,
}

impl Trajectory {
    /// 创建轨迹
    pub fn new(start_pos: Vec<f64>, waypoints: Vec<Vec<f64>>, total_t: f64) -> Self {
        Trajectory {
            start_pos,
            waypoints,
            total_t,
        }
    }

    /// 流逝时间对应的路点下标
    ///
    /// 对 `elapsed` 单调不减：时间前进时下标只会前进。超出轨迹
    /// 末尾返回 `None`，跟踪循环以此终止。
    pub fn waypoint_index(&self, elapsed: f64) -> Option<usize> {
        if self.waypoints.is_empty() || self.total_t <= 0.0 || elapsed >= self.total_t {
            return None;
        }
        let progress = (elapsed.max(0.0) / self.total_t) * self.waypoints.len() as f64;
        let index = progress as usize;
        Some(index.min(self.waypoints.len() - 1))
    }

    /// 流逝时间对应的目标关节角
    pub fn target_at(&self, elapsed: f64) -> Option<&[f64]> {
        self.waypoint_index(elapsed)
            .map(|i| self.waypoints[i].as_slice())
    }
}

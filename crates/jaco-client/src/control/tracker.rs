//! 速度跟踪循环
//!
//! 以固定 100 Hz 节拍把关节轨迹转换为速度流：每个节拍读取当前
//! 关节角，对目标路点做环绕安全的误差计算，经 PID 调节器产生
//! 速度修正并 fire-and-forget 发布。Kinova 驱动要求速度流必须
//! 维持 100 Hz，节拍锚定在绝对时刻上，单拍超时不会累积漂移。
//!
//! 跟踪前先用关节角动作把机械臂移到轨迹起点并等待就位，避免
//! 起始误差过大导致速度命令饱和。

use crate::control::pid::PidRegulator;
use crate::control::trajectory::Trajectory;
use jaco_driver::executor::ActionExecutor;
use jaco_driver::store::StateStore;
use jaco_protocol::units::{vec_rad_to_deg, wrap_angle_error};
use jaco_protocol::{ActionOutcome, ActuatorGoal, JointAnglesGoal, JointVelocityCommand, COMMAND_RATE_HZ};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 速度跟踪器
pub struct VelocityTracker {
    executor: ActionExecutor,
    store: Arc<StateStore>,
    regulator: PidRegulator,
    settle: Duration,
}

impl VelocityTracker {
    /// 创建跟踪器
    pub fn new(
        executor: ActionExecutor,
        store: Arc<StateStore>,
        regulator: PidRegulator,
        settle: Duration,
    ) -> Self {
        VelocityTracker {
            executor,
            store,
            regulator,
            settle,
        }
    }

    /// 跟踪一条关节轨迹，阻塞至轨迹结束
    ///
    /// 步骤：移动到起点 → 就位等待 → 100 Hz 跟踪循环 → 停止。
    /// 起点移动失败时直接返回该结果，不进入跟踪循环。
    pub fn track(&mut self, trajectory: &Trajectory) -> ActionOutcome {
        let n = self.regulator.n_joints();

        // 先把机械臂移到轨迹起点
        let start_outcome = self.executor.execute(ActuatorGoal::JointAngles(JointAnglesGoal {
            angles_deg: vec_rad_to_deg(&pad_to(&trajectory.start_pos, n)),
        }));
        if !start_outcome.succeeded {
            warn!(message = %start_outcome.message, "Failed to reach trajectory start");
            return start_outcome;
        }
        if !self.settle.is_zero() {
            debug!(settle_s = self.settle.as_secs_f64(), "Settling at trajectory start");
            spin_sleep::sleep(self.settle);
        }

        self.regulator.reset();
        let period = Duration::from_secs_f64(1.0 / COMMAND_RATE_HZ);
        let start = Instant::now();
        let mut next_tick = start + period;
        let mut ticks: u64 = 0;

        info!(
            total_t = trajectory.total_t,
            waypoints = trajectory.waypoints.len(),
            "Velocity tracking started"
        );

        loop {
            let elapsed = start.elapsed().as_secs_f64();
            let Some(target) = trajectory.target_at(elapsed) else {
                break;
            };
            let target = pad_to(target, n);

            let snapshot = self.store.snapshot();
            let current = pad_to(&snapshot.joint_positions, n);

            // 环绕安全的逐关节误差
            let error: Vec<f64> = current
                .iter()
                .zip(target.iter())
                .map(|(c, t)| wrap_angle_error(*c, *t))
                .collect();

            let correction = self.regulator.update(&error, period);
            // 修正矩阵的对角线取负号即为速度命令
            let velocities_rad: Vec<f64> = (0..n).map(|i| -correction[(i, i)]).collect();

            let cmd = JointVelocityCommand {
                velocities_deg: vec_rad_to_deg(&velocities_rad),
            };
            if let Err(err) = self.executor.publish_velocity(&cmd) {
                warn!(error = %err, "Velocity publish failed, aborting tracking");
                return ActionOutcome::failure(err.to_string());
            }
            // 调试旁路：当前节拍的期望关节位置
            if let Err(err) = self.executor.publish_desired_position(&target) {
                warn!(error = %err, "Desired position publish failed");
            }

            ticks += 1;
            let now = Instant::now();
            if next_tick > now {
                spin_sleep::sleep(next_tick - now);
            }
            next_tick += period;
        }

        // 轨迹结束后停住速度流
        let stop = JointVelocityCommand {
            velocities_deg: vec![0.0; n],
        };
        if let Err(err) = self.executor.publish_velocity(&stop) {
            warn!(error = %err, "Failed to publish stop command");
        }

        info!(ticks, "Velocity tracking finished");
        ActionOutcome::success("+VEL_FINISHED")
    }
}

/// 补齐到 n 个分量，缺失按 0；多余分量截断
///
/// 6 自由度型号的命令向第 7 个槽位发 0。
fn pad_to(values: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![0.0; n];
    for (slot, value) in out.iter_mut().zip(values.iter()) {
        *slot = *value;
    }
    out
}

//! 命令分发器
//!
//! 把已解析的 [`Command`] 翻译为执行器调用。三条路径：
//!
//! - **VEL**: 把速度载荷换算到度/秒，按 100 Hz 节拍重复发布
//!   `repeat` 次。流式发布没有完成事件，结果无条件成功。
//! - **ANGLE**: 前 `n_joints` 个值是关节角，读取当前关节角完成
//!   相对/绝对组合后发一个关节角目标；溢出的尾段走手指路径。
//! - **TOOL**: 位姿段长度由单位决定（四元数 7，欧拉角 6），其余
//!   是手指尾段。位姿目标执行后无论成败，手指尾段都会被转发，
//!   两个结果合并返回。
//!
//! 所有转换和长度校验在第一个执行器调用之前完成，非法载荷被
//! 整体拒绝，不产生部分副作用。分发器在 `initialize` 之前拒绝
//! 一切命令。

use crate::command::{normalize_finger_command, AngleUnit, Command, PoseUnit};
use crate::error::ClientError;
use jaco_driver::executor::ActionExecutor;
use jaco_driver::store::StateStore;
use jaco_protocol::units::{
    apply_relative, deg_to_rad, quaternion_from_euler, quaternion_multiply, normalize_quaternion,
    vec_deg_to_rad, vec_rad_to_deg,
};
use jaco_protocol::{
    ActionOutcome, ActuatorGoal, ConversionError, FingerPositionGoal, JointAnglesGoal,
    ToolPoseGoal, COMMAND_RATE_HZ,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 工作区围栏（基座坐标系下的轴对齐包围盒）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkspaceFence {
    /// 下界 `[x, y, z]`（米）
    pub min: [f64; 3],
    /// 上界 `[x, y, z]`（米）
    pub max: [f64; 3],
}

/// 命令分发器
pub struct CommandDispatcher {
    executor: ActionExecutor,
    store: Arc<StateStore>,
    n_joints: usize,
    fence: Option<WorkspaceFence>,
}

impl CommandDispatcher {
    /// 创建分发器（未初始化状态）
    pub fn new(executor: ActionExecutor, store: Arc<StateStore>, n_joints: usize) -> Self {
        CommandDispatcher {
            executor,
            store,
            n_joints,
            fence: None,
        }
    }

    /// 配置工作区围栏并解锁分发
    pub fn initialize(&mut self, fence: WorkspaceFence) {
        info!(min = ?fence.min, max = ?fence.max, "Dispatcher initialized with workspace fence");
        self.fence = Some(fence);
    }

    /// 是否已初始化
    pub fn is_initialized(&self) -> bool {
        self.fence.is_some()
    }

    /// 分发一条命令，阻塞至执行结束
    ///
    /// 每次分发前清零状态轨迹，使后续的状态查询只反映本条命令
    /// 执行期间的反馈。
    pub fn dispatch(&mut self, command: Command) -> Result<ActionOutcome, ClientError> {
        if self.fence.is_none() {
            return Err(ClientError::NotInitialized);
        }
        self.store.reset();

        match command {
            Command::Velocity { unit, repeat, data } => self.dispatch_velocity(unit, repeat, &data),
            Command::JointAngle {
                unit,
                relative,
                data,
            } => self.dispatch_joint_angle(unit, relative, &data),
            Command::ToolPose {
                unit,
                relative,
                data,
            } => self.dispatch_tool_pose(unit, relative, &data),
        }
    }

    fn dispatch_velocity(
        &self,
        unit: AngleUnit,
        repeat: usize,
        data: &[f64],
    ) -> Result<ActionOutcome, ClientError> {
        if data.len() > self.n_joints {
            return Err(ConversionError::LengthMismatch {
                expected: self.n_joints,
                actual: data.len(),
            }
            .into());
        }
        let velocities_deg = match unit {
            AngleUnit::Degrees => pad_to(data, self.n_joints),
            AngleUnit::Radians => pad_to(&vec_rad_to_deg(data), self.n_joints),
        };
        let cmd = jaco_protocol::JointVelocityCommand { velocities_deg };

        debug!(repeat, "Streaming velocity command");
        let period = Duration::from_secs_f64(1.0 / COMMAND_RATE_HZ);
        let mut next_tick = Instant::now() + period;
        for _ in 0..repeat {
            if let Err(err) = self.executor.publish_velocity(&cmd) {
                // 流式发布尽力而为，发布失败不改变结果
                warn!(error = %err, "Velocity publish failed");
            }
            let now = Instant::now();
            if next_tick > now {
                spin_sleep::sleep(next_tick - now);
            }
            next_tick += period;
        }
        Ok(ActionOutcome::success("+VEL_FINISHED"))
    }

    fn dispatch_joint_angle(
        &self,
        unit: AngleUnit,
        relative: bool,
        data: &[f64],
    ) -> Result<ActionOutcome, ClientError> {
        if data.len() < self.n_joints {
            return Err(ConversionError::LengthMismatch {
                expected: self.n_joints,
                actual: data.len(),
            }
            .into());
        }
        let (angle_part, finger_part) = data.split_at(self.n_joints);
        // 手指尾段先校验，避免关节目标发出后才发现尾段非法
        let finger_goal = self.convert_finger_segment(finger_part)?;

        let target_rad = match unit {
            AngleUnit::Degrees => vec_deg_to_rad(angle_part),
            AngleUnit::Radians => angle_part.to_vec(),
        };
        let current = self.store.snapshot().joint_positions;
        let resolved = apply_relative(&current, &target_rad, relative);

        let outcome = self.executor.execute(ActuatorGoal::JointAngles(JointAnglesGoal {
            angles_deg: vec_rad_to_deg(&resolved),
        }));

        match finger_goal {
            Some(goal) => {
                let finger_outcome = self.executor.execute(ActuatorGoal::FingerPosition(goal));
                Ok(outcome.merge(finger_outcome))
            }
            None => Ok(outcome),
        }
    }

    fn dispatch_tool_pose(
        &self,
        unit: PoseUnit,
        relative: bool,
        data: &[f64],
    ) -> Result<ActionOutcome, ClientError> {
        let pose_len = unit.pose_len();
        if data.len() < pose_len {
            return Err(ConversionError::LengthMismatch {
                expected: pose_len,
                actual: data.len(),
            }
            .into());
        }
        let (pose_part, finger_part) = data.split_at(pose_len);
        let finger_goal = self.convert_finger_segment(finger_part)?;

        let mut position = [pose_part[0], pose_part[1], pose_part[2]];
        let mut orientation = match unit {
            PoseUnit::MetersQuaternion => {
                [pose_part[3], pose_part[4], pose_part[5], pose_part[6]]
            }
            PoseUnit::MetersDegrees => quaternion_from_euler(
                deg_to_rad(pose_part[3]),
                deg_to_rad(pose_part[4]),
                deg_to_rad(pose_part[5]),
            ),
            PoseUnit::MetersRadians => {
                quaternion_from_euler(pose_part[3], pose_part[4], pose_part[5])
            }
        };

        if relative {
            let current = self.store.read_tool_pose();
            let translation = current.translation();
            for (p, t) in position.iter_mut().zip(translation.iter()) {
                *p += t;
            }
            orientation = quaternion_multiply(orientation, current.orientation());
        }
        let orientation = normalize_quaternion(orientation);

        let outcome = self.executor.execute(ActuatorGoal::ToolPose(ToolPoseGoal {
            position,
            orientation,
        }));

        // 手指尾段无论位姿结果如何都转发
        match finger_goal {
            Some(goal) => {
                let finger_outcome = self.executor.execute(ActuatorGoal::FingerPosition(goal));
                Ok(outcome.merge(finger_outcome))
            }
            None => Ok(outcome),
        }
    }

    /// 手指尾段 → 手指目标；空尾段返回 `None`
    fn convert_finger_segment(
        &self,
        segment: &[f64],
    ) -> Result<Option<FingerPositionGoal>, ClientError> {
        if segment.is_empty() {
            return Ok(None);
        }
        let turns = normalize_finger_command(segment)?;
        Ok(Some(FingerPositionGoal { turns }))
    }

    /// 把平移钳位到工作区围栏内
    ///
    /// 围栏目前只记录不生效，保持与实机控制器一致的行为。
    #[allow(dead_code)]
    fn clip_to_fence(&self, position: [f64; 3]) -> [f64; 3] {
        match self.fence {
            Some(fence) => [
                position[0].clamp(fence.min[0], fence.max[0]),
                position[1].clamp(fence.min[1], fence.max[1]),
                position[2].clamp(fence.min[2], fence.max[2]),
            ],
            None => position,
        }
    }
}

/// 补齐到 n 个分量，缺失按 0
fn pad_to(values: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![0.0; n];
    for (slot, value) in out.iter_mut().zip(values.iter()) {
        *slot = *value;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use jaco_driver::mock::{GoalBehavior, MockBus};
    use jaco_protocol::{GoalInterface, JointStateSample, ToolPose, MAX_FINGER_TURNS};
    use std::f64::consts::PI;

    fn fence() -> WorkspaceFence {
        WorkspaceFence {
            min: [-0.5, -0.5, 0.0],
            max: [0.5, 0.5, 0.8],
        }
    }

    fn dispatcher_with(bus: &MockBus) -> (CommandDispatcher, Arc<StateStore>) {
        let store = Arc::new(StateStore::default());
        let executor = ActionExecutor::new(Arc::new(bus.clone()), Duration::from_millis(200));
        let mut dispatcher = CommandDispatcher::new(executor, store.clone(), 7);
        dispatcher.initialize(fence());
        (dispatcher, store)
    }

    #[test]
    fn test_rejects_before_initialize() {
        let bus = MockBus::new();
        let store = Arc::new(StateStore::default());
        let executor = ActionExecutor::new(Arc::new(bus.clone()), Duration::from_millis(100));
        let mut dispatcher = CommandDispatcher::new(executor, store, 7);

        let err = dispatcher.dispatch(Command::Velocity {
            unit: AngleUnit::Degrees,
            repeat: 1,
            data: vec![0.0; 7],
        });
        assert!(matches!(err, Err(ClientError::NotInitialized)));
        // 初始化前不允许任何执行器流量
        assert!(bus.velocity_publishes().is_empty());
        assert!(bus.sent_goals().is_empty());
    }

    #[test]
    fn test_velocity_streams_repeat_times() {
        let bus = MockBus::new();
        let (mut dispatcher, _store) = dispatcher_with(&bus);

        let outcome = dispatcher
            .dispatch(Command::Velocity {
                unit: AngleUnit::Radians,
                repeat: 5,
                data: vec![PI; 7],
            })
            .unwrap();
        assert!(outcome.succeeded);
        assert_eq!(outcome.message, "+VEL_FINISHED");

        let publishes = bus.velocity_publishes();
        assert_eq!(publishes.len(), 5);
        // 弧度载荷换算到度
        assert!((publishes[0].0.velocities_deg[0] - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_velocity_dispatch_resets_trace() {
        let bus = MockBus::new();
        let (mut dispatcher, store) = dispatcher_with(&bus);
        store.write_joint_state(JointStateSample {
            time_offset_s: 0.01,
            positions: vec![0.0; 7],
            velocities: vec![0.0; 7],
            efforts: vec![0.0; 7],
        });
        assert_eq!(store.sample_count(), 1);

        dispatcher
            .dispatch(Command::Velocity {
                unit: AngleUnit::Degrees,
                repeat: 1,
                data: vec![0.0; 7],
            })
            .unwrap();
        // 分发前清零，之后的状态查询只反映新反馈
        assert_eq!(store.sample_count(), 0);
    }

    #[test]
    fn test_angle_relative_composes_with_current() {
        let bus = MockBus::new();
        let (mut dispatcher, store) = dispatcher_with(&bus);
        store.write_joint_state(JointStateSample {
            time_offset_s: 0.01,
            positions: vec![PI / 2.0; 7],
            velocities: vec![0.0; 7],
            efforts: vec![0.0; 7],
        });

        let outcome = dispatcher
            .dispatch(Command::JointAngle {
                unit: AngleUnit::Degrees,
                relative: true,
                data: vec![10.0; 7],
            })
            .unwrap();
        assert!(outcome.succeeded);

        let goals = bus.sent_goals();
        assert_eq!(goals.len(), 1);
        match &goals[0].0 {
            ActuatorGoal::JointAngles(goal) => {
                // 90° 当前值 + 10° 增量
                assert!((goal.angles_deg[0] - 100.0).abs() < 1e-9);
            }
            other => panic!("unexpected goal: {other:?}"),
        }
    }

    #[test]
    fn test_angle_overflow_goes_to_fingers() {
        let bus = MockBus::new();
        let (mut dispatcher, _store) = dispatcher_with(&bus);

        let mut data = vec![0.0; 7];
        data.push(1.0); // 标量手指尾段：全闭
        let outcome = dispatcher
            .dispatch(Command::JointAngle {
                unit: AngleUnit::Degrees,
                relative: false,
                data,
            })
            .unwrap();
        assert!(outcome.succeeded);
        assert!(outcome.message.contains("+JOINT_ANGLES_FINISHED"));
        assert!(outcome.message.contains("+FINGER_POSITION_FINISHED"));

        assert_eq!(bus.sent_goal_count(GoalInterface::FingerPosition), 1);
        let goals = bus.sent_goals();
        match &goals[1].0 {
            ActuatorGoal::FingerPosition(goal) => {
                assert_eq!(goal.turns, [MAX_FINGER_TURNS; 3]);
            }
            other => panic!("unexpected goal: {other:?}"),
        }
    }

    #[test]
    fn test_angle_rejects_short_payload() {
        let bus = MockBus::new();
        let (mut dispatcher, _store) = dispatcher_with(&bus);

        let err = dispatcher.dispatch(Command::JointAngle {
            unit: AngleUnit::Degrees,
            relative: false,
            data: vec![0.0; 4],
        });
        assert!(matches!(err, Err(ClientError::Conversion(_))));
        // 整体拒绝，没有部分副作用
        assert!(bus.sent_goals().is_empty());
    }

    #[test]
    fn test_angle_invalid_finger_tail_rejected_before_send() {
        let bus = MockBus::new();
        let (mut dispatcher, _store) = dispatcher_with(&bus);

        let mut data = vec![0.0; 7];
        data.extend_from_slice(&[0.5, 0.5]); // 2 维尾段非法
        let err = dispatcher.dispatch(Command::JointAngle {
            unit: AngleUnit::Degrees,
            relative: false,
            data,
        });
        assert!(matches!(err, Err(ClientError::Conversion(_))));
        assert!(bus.sent_goals().is_empty());
    }

    #[test]
    fn test_tool_pose_quaternion_absolute() {
        let bus = MockBus::new();
        let (mut dispatcher, _store) = dispatcher_with(&bus);

        let outcome = dispatcher
            .dispatch(Command::ToolPose {
                unit: PoseUnit::MetersQuaternion,
                relative: false,
                data: vec![0.3, 0.0, 0.5, 0.0, 0.0, 0.0, 1.0],
            })
            .unwrap();
        assert!(outcome.succeeded);
        assert_eq!(outcome.message, "+TOOL_POSE_FINISHED");

        match &bus.sent_goals()[0].0 {
            ActuatorGoal::ToolPose(goal) => {
                assert_eq!(goal.position, [0.3, 0.0, 0.5]);
                assert_eq!(goal.orientation, [0.0, 0.0, 0.0, 1.0]);
            }
            other => panic!("unexpected goal: {other:?}"),
        }
    }

    #[test]
    fn test_tool_pose_relative_composes() {
        let bus = MockBus::new();
        let (mut dispatcher, store) = dispatcher_with(&bus);
        store.write_tool_pose(ToolPose([0.1, 0.2, 0.3, 0.0, 0.0, 0.0, 1.0]));

        dispatcher
            .dispatch(Command::ToolPose {
                unit: PoseUnit::MetersRadians,
                relative: true,
                data: vec![0.05, 0.0, 0.0, 0.0, 0.0, PI / 2.0],
            })
            .unwrap();

        match &bus.sent_goals()[0].0 {
            ActuatorGoal::ToolPose(goal) => {
                assert!((goal.position[0] - 0.15).abs() < 1e-9);
                assert!((goal.position[1] - 0.2).abs() < 1e-9);
                // 单位姿态上叠加 90° 偏航
                assert!((goal.orientation[2] - (PI / 4.0).sin()).abs() < 1e-9);
                assert!((goal.orientation[3] - (PI / 4.0).cos()).abs() < 1e-9);
            }
            other => panic!("unexpected goal: {other:?}"),
        }
    }

    #[test]
    fn test_tool_finger_forwarded_after_pose_timeout() {
        let bus = MockBus::new();
        bus.set_behavior(GoalInterface::ToolPose, GoalBehavior::Never);
        let (mut dispatcher, _store) = dispatcher_with(&bus);

        let outcome = dispatcher
            .dispatch(Command::ToolPose {
                unit: PoseUnit::MetersQuaternion,
                relative: false,
                data: vec![0.3, 0.0, 0.5, 0.0, 0.0, 0.0, 1.0, -1.0, 0.0, 1.0],
            })
            .unwrap();

        // 位姿超时不拦截手指尾段
        assert!(!outcome.succeeded);
        assert!(outcome.message.contains("+TIMEOUT"));
        assert!(outcome.message.contains("+FINGER_POSITION_FINISHED"));
        assert_eq!(bus.sent_goal_count(GoalInterface::FingerPosition), 1);
        assert_eq!(bus.cancel_count(GoalInterface::ToolPose), 1);
    }

    #[test]
    fn test_fence_clip_helper() {
        let bus = MockBus::new();
        let (dispatcher, _store) = dispatcher_with(&bus);

        let clipped = dispatcher.clip_to_fence([1.0, -1.0, 0.4]);
        assert_eq!(clipped, [0.5, -0.5, 0.4]);
    }
}

//! 服务门面
//!
//! 外部接口的单一入口：初始化、归位、命令分发和状态查询。除
//! `connect` 和配置错误外，门面内部的失败不作为错误穿出——每个
//! 入口都返回 [`StateResponse`]，失败体现在 `success` / `message`
//! 字段上，调用方永远拿到一个完整的响应。
//!
//! 初始化之前，除 `initialize` 以外的入口一律返回
//! `success = false, message = "not initialized"`，不发出任何
//! 执行器调用。

use crate::command::CommandRequest;
use crate::config::JacoConfig;
use crate::control::{PidRegulator, Trajectory, VelocityTracker};
use crate::dispatcher::{CommandDispatcher, WorkspaceFence};
use crate::error::ClientError;
use crossbeam_channel::Receiver;
use jaco_driver::bus::{ActuatorBus, FeedbackEvent};
use jaco_driver::connection::await_bring_up;
use jaco_driver::executor::ActionExecutor;
use jaco_driver::ingest::{spawn_ingest, IngestHandle};
use jaco_driver::store::StateStore;
use jaco_protocol::{ActionOutcome, ActuatorGoal, RobotSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// 状态响应
///
/// 所有门面入口的统一返回载荷。失败时状态字段为空，`message`
/// 携带失败原因。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateResponse {
    /// 操作是否成功
    pub success: bool,
    /// 结果消息
    pub message: String,
    /// 预留字段（接口兼容，当前恒为空）
    pub reserved: Vec<f64>,
    /// 自上次 reset 以来的样本计数
    pub sample_count: u64,
    /// 最近样本的时间偏移轨迹（秒）
    pub time_offsets: Vec<f64>,
    /// 关节位置（弧度）
    pub joint_pos: Vec<f64>,
    /// 关节速度（弧度/秒）
    pub joint_vel: Vec<f64>,
    /// 关节力矩（N·m）
    pub joint_effort: Vec<f64>,
    /// 工具位姿 `[x, y, z, qx, qy, qz, qw]`
    pub tool_pose: Vec<f64>,
    /// 手指位姿 `[f1, f2, f3]`（丝杠转数）
    pub finger_pose: Vec<f64>,
}

impl StateResponse {
    /// 从动作结果和快照组装响应
    fn from_snapshot(outcome: ActionOutcome, snapshot: RobotSnapshot, time_offsets: Vec<f64>) -> Self {
        StateResponse {
            success: outcome.succeeded,
            message: outcome.message,
            reserved: Vec::new(),
            sample_count: snapshot.sample_count,
            time_offsets,
            joint_pos: snapshot.joint_positions,
            joint_vel: snapshot.joint_velocities,
            joint_effort: snapshot.joint_efforts,
            tool_pose: snapshot.tool_pose.0.to_vec(),
            finger_pose: snapshot.finger_pose.0.to_vec(),
        }
    }

    /// 不带状态字段的失败响应
    fn failure(message: impl Into<String>) -> Self {
        StateResponse {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }
}

/// 机械臂控制服务
pub struct JacoService {
    executor: ActionExecutor,
    store: Arc<StateStore>,
    dispatcher: CommandDispatcher,
    config: JacoConfig,
    // 摄取线程随服务一起退出
    _ingest: IngestHandle,
}

impl JacoService {
    /// 连接到执行器总线并等待反馈流就绪
    ///
    /// 启动摄取线程后限时等待首个工具/手指位姿；任一缺席说明驱动
    /// 没有在发布，连接失败是致命错误。
    pub fn connect(
        bus: Arc<dyn ActuatorBus>,
        feedback_rx: Receiver<FeedbackEvent>,
        config: JacoConfig,
    ) -> Result<Self, ClientError> {
        config.verify()?;

        let store = Arc::new(StateStore::new(config.trace_capacity));
        let ingest = spawn_ingest(feedback_rx, store.clone());
        await_bring_up(&store, config.connect_timeout())?;

        let executor = ActionExecutor::new(bus, config.action_timeout());
        let dispatcher = CommandDispatcher::new(executor.clone(), store.clone(), config.n_joints);
        info!(n_joints = config.n_joints, "Jaco service connected");

        Ok(JacoService {
            executor,
            store,
            dispatcher,
            config,
            _ingest: ingest,
        })
    }

    /// 配置工作区围栏，解锁其余入口
    pub fn initialize(&mut self, fence: WorkspaceFence) -> StateResponse {
        self.dispatcher.initialize(fence);
        StateResponse {
            success: true,
            message: "initialized".to_string(),
            ..Default::default()
        }
    }

    /// 是否已初始化
    pub fn is_initialized(&self) -> bool {
        self.dispatcher.is_initialized()
    }

    /// 归位并返回归位后的状态（阻塞）
    pub fn reset(&mut self) -> StateResponse {
        if !self.dispatcher.is_initialized() {
            return StateResponse::failure(ClientError::NotInitialized.to_string());
        }
        self.store.reset();
        let outcome = self.executor.execute(ActuatorGoal::Home);
        self.respond(outcome)
    }

    /// 只发出归位请求，不等待完成
    pub fn home(&mut self) -> bool {
        if !self.dispatcher.is_initialized() {
            warn!("Home requested before initialization");
            return false;
        }
        self.executor.issue(ActuatorGoal::Home)
    }

    /// 解析并执行一条命令，返回执行后的状态
    pub fn step(&mut self, request: &CommandRequest) -> StateResponse {
        let command = match request.parse() {
            Ok(command) => command,
            Err(err) => return StateResponse::failure(err.to_string()),
        };
        match self.dispatcher.dispatch(command) {
            Ok(outcome) => self.respond(outcome),
            Err(err) => StateResponse::failure(err.to_string()),
        }
    }

    /// 接受线级别的原始命令元组
    pub fn step_raw(
        &mut self,
        command_type: &str,
        unit: &str,
        relative: bool,
        repeat: usize,
        data: Vec<f64>,
    ) -> StateResponse {
        self.step(&CommandRequest {
            command_type: command_type.to_string(),
            unit: unit.to_string(),
            relative,
            repeat,
            data,
        })
    }

    /// 跟踪一条关节轨迹（阻塞至轨迹结束）
    pub fn track(&mut self, trajectory: &Trajectory) -> StateResponse {
        if !self.dispatcher.is_initialized() {
            return StateResponse::failure(ClientError::NotInitialized.to_string());
        }
        self.store.reset();
        let regulator = PidRegulator::new(
            self.config.n_joints,
            self.config.pid.kp,
            self.config.pid.ki,
            self.config.pid.kd,
            self.config.pid.integral_limit,
        );
        let mut tracker = VelocityTracker::new(
            self.executor.clone(),
            self.store.clone(),
            regulator,
            self.config.settle_time(),
        );
        let outcome = tracker.track(trajectory);
        self.respond(outcome)
    }

    /// 查询当前状态（限时等待 reset 之后的第一个样本）
    pub fn get_state(&self) -> StateResponse {
        if !self.dispatcher.is_initialized() {
            return StateResponse::failure(ClientError::NotInitialized.to_string());
        }
        match self.store.wait_for_sample(self.config.state_wait_timeout()) {
            Some(snapshot) => StateResponse::from_snapshot(
                ActionOutcome::success("+STATE"),
                snapshot,
                self.store.trace(),
            ),
            None => StateResponse::failure("Timed out waiting for a state sample"),
        }
    }

    /// 把动作结果和命令后的首个样本组装成响应
    ///
    /// 等不到样本时保留动作结果消息，状态字段为空。
    fn respond(&self, outcome: ActionOutcome) -> StateResponse {
        match self.store.wait_for_sample(self.config.state_wait_timeout()) {
            Some(snapshot) => {
                StateResponse::from_snapshot(outcome, snapshot, self.store.trace())
            }
            None => StateResponse {
                success: false,
                message: format!("{}; no state sample received", outcome.message),
                ..Default::default()
            },
        }
    }
}

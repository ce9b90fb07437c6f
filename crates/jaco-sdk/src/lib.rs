//! # Jaco SDK
//!
//! Kinova Jaco 机械臂命令/状态同步核心的统一入口。
//!
//! 分层：
//! - [`protocol`]: 纯数据类型和单位转换（无线程、无 IO）
//! - [`driver`]: 状态存储、反馈摄取和发送-等待-取消执行协议
//! - [`client`]: 命令解析、分发、速度跟踪和服务门面
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use jaco_sdk::{JacoConfig, JacoService, WorkspaceFence};
//! use jaco_sdk::driver::feedback_channel;
//! # fn bus() -> Arc<dyn jaco_sdk::driver::ActuatorBus> { unimplemented!() }
//!
//! jaco_sdk::init_logging();
//!
//! let (feedback_tx, feedback_rx) = feedback_channel();
//! // feedback_tx 交给传输层的订阅回调
//! let mut service = JacoService::connect(bus(), feedback_rx, JacoConfig::default()).unwrap();
//!
//! service.initialize(WorkspaceFence {
//!     min: [-0.5, -0.5, 0.0],
//!     max: [0.5, 0.5, 0.8],
//! });
//! let response = service.step_raw("ANGLE", "deg", false, 0, vec![0.0; 7]);
//! println!("{}: {}", response.success, response.message);
//! ```

pub use jaco_client as client;
pub use jaco_driver as driver;
pub use jaco_protocol as protocol;

pub use jaco_client::{
    CommandRequest, JacoConfig, JacoService, StateResponse, Trajectory, WorkspaceFence,
};
pub use jaco_protocol::{ActionOutcome, RobotSnapshot};

/// 初始化日志
///
/// `tracing-subscriber` 读取 `RUST_LOG`，并通过 `tracing-log` 桥接
/// 使用 `log` 宏的依赖。重复调用安全（后续调用为空操作）。
pub fn init_logging() {
    let _ = tracing_log::LogTracer::init();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

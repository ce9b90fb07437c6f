//! # Jaco Client Layer
//!
//! 命令翻译与控制层：
//! - 字符串命令解析（VEL / ANGLE / TOOL）和单位换算
//! - 命令分发（相对/绝对组合、手指尾段拆分、发送-等待-取消）
//! - 100 Hz 速度跟踪循环（PID 调节、环绕安全的角度误差）
//! - 服务门面（初始化门、归位、状态查询）
//!
//! 并发原语和状态存储在 `jaco-driver`，纯类型和转换在
//! `jaco-protocol`。

pub mod command;
pub mod config;
pub mod control;
pub mod dispatcher;
pub mod error;
pub mod service;

pub use command::{AngleUnit, Command, CommandRequest, PoseUnit};
pub use config::{ConfigError, JacoConfig, PidConfig};
pub use control::{PidRegulator, Trajectory, VelocityTracker};
pub use dispatcher::{CommandDispatcher, WorkspaceFence};
pub use error::ClientError;
pub use service::{JacoService, StateResponse};

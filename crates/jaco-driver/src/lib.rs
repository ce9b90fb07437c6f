//! # Jaco Driver Layer
//!
//! 命令/状态同步核心的并发部分：
//! - 线程安全的状态存储（每字段一把锁 + 条件变量，拷贝读取）
//! - 反馈摄取线程（异步反馈事件 → StateStore）
//! - 有界等待的动作执行协议（发送 → 限时等待 → 超时取消）
//!
//! 传输中间件和物理驱动在 [`ActuatorBus`] 边界之外，本 crate 只
//! 消费它们的接口。测试使用 `mock` feature 提供的 [`MockBus`]。

pub mod bus;
pub mod connection;
pub mod error;
pub mod executor;
pub mod ingest;
pub mod store;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use bus::{ActuatorBus, BusError, FeedbackEvent, GoalTicket, feedback_channel};
pub use connection::await_bring_up;
pub use error::DriverError;
pub use executor::ActionExecutor;
pub use ingest::IngestHandle;
pub use store::StateStore;

#[cfg(any(test, feature = "mock"))]
pub use mock::{GoalBehavior, MockBus};

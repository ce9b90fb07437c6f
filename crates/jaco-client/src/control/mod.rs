//! 速度跟踪控制
//!
//! - [`PidRegulator`]: 对角增益矩阵形式的 PID 调节器
//! - [`Trajectory`]: 只读的关节轨迹
//! - [`VelocityTracker`]: 100 Hz 固定节拍的轨迹跟踪循环

pub mod pid;
pub mod tracker;
pub mod trajectory;

pub use pid::PidRegulator;
pub use tracker::VelocityTracker;
pub use trajectory::Trajectory;

//! 客户端配置
//!
//! TOML 反序列化，所有字段带默认值；增益默认值来自实机整定。

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

fn default_n_joints() -> usize {
    7
}

fn default_kp() -> f64 {
    5.0
}

fn default_ki() -> f64 {
    0.0
}

fn default_kd() -> f64 {
    1.0
}

fn default_integral_limit() -> f64 {
    10.0
}

fn default_action_timeout_s() -> f64 {
    jaco_protocol::DEFAULT_ACTION_TIMEOUT.as_secs_f64()
}

fn default_settle_time_s() -> f64 {
    jaco_protocol::DEFAULT_TRACKER_SETTLE.as_secs_f64()
}

fn default_connect_timeout_s() -> f64 {
    30.0
}

fn default_state_wait_timeout_s() -> f64 {
    5.0
}

fn default_trace_capacity() -> usize {
    4096
}

/// 速度跟踪的 PID 增益配置
///
/// 标量增益应用到所有关节。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidConfig {
    /// 比例增益
    #[serde(default = "default_kp")]
    pub kp: f64,
    /// 积分增益
    #[serde(default = "default_ki")]
    pub ki: f64,
    /// 微分增益
    #[serde(default = "default_kd")]
    pub kd: f64,
    /// 积分限幅（防饱和）
    #[serde(default = "default_integral_limit")]
    pub integral_limit: f64,
}

impl Default for PidConfig {
    fn default() -> Self {
        PidConfig {
            kp: default_kp(),
            ki: default_ki(),
            kd: default_kd(),
            integral_limit: default_integral_limit(),
        }
    }
}

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JacoConfig {
    /// 关节数（6 自由度或 7 自由度型号）
    #[serde(default = "default_n_joints")]
    pub n_joints: usize,

    /// 速度跟踪 PID 增益
    #[serde(default)]
    pub pid: PidConfig,

    /// 离散动作目标的等待超时（秒）
    #[serde(default = "default_action_timeout_s")]
    pub action_timeout_s: f64,

    /// 速度跟踪前等待机械臂就位的时间（秒）
    #[serde(default = "default_settle_time_s")]
    pub settle_time_s: f64,

    /// 连接建立阶段等待首个反馈的超时（秒）
    #[serde(default = "default_connect_timeout_s")]
    pub connect_timeout_s: f64,

    /// `get_state` 等待首个样本的超时（秒）
    #[serde(default = "default_state_wait_timeout_s")]
    pub state_wait_timeout_s: f64,

    /// 状态轨迹的容量（保留最近 N 个样本的时间偏移）
    #[serde(default = "default_trace_capacity")]
    pub trace_capacity: usize,
}

impl Default for JacoConfig {
    fn default() -> Self {
        JacoConfig {
            n_joints: default_n_joints(),
            pid: PidConfig::default(),
            action_timeout_s: default_action_timeout_s(),
            settle_time_s: default_settle_time_s(),
            connect_timeout_s: default_connect_timeout_s(),
            state_wait_timeout_s: default_state_wait_timeout_s(),
            trace_capacity: default_trace_capacity(),
        }
    }
}

impl JacoConfig {
    /// 从 TOML 文件加载配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// 从 TOML 字符串解析配置
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: JacoConfig = toml::from_str(content)?;
        config.verify()?;
        Ok(config)
    }

    /// 校验配置参数
    pub fn verify(&self) -> Result<(), ConfigError> {
        if self.n_joints != 6 && self.n_joints != 7 {
            return Err(ConfigError::Invalid(format!(
                "n_joints must be 6 or 7, got {}",
                self.n_joints
            )));
        }
        if self.action_timeout_s <= 0.0 {
            return Err(ConfigError::Invalid(
                "action_timeout_s must be positive".to_string(),
            ));
        }
        if self.trace_capacity == 0 {
            return Err(ConfigError::Invalid(
                "trace_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// 动作超时
    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.action_timeout_s)
    }

    /// 就位等待时间
    pub fn settle_time(&self) -> Duration {
        Duration::from_secs_f64(self.settle_time_s)
    }

    /// 连接超时
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.connect_timeout_s)
    }

    /// 状态等待超时
    pub fn state_wait_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.state_wait_timeout_s)
    }
}

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 文件读取失败
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// 参数非法
    #[error("Invalid config: {0}")]
    Invalid(String),
}

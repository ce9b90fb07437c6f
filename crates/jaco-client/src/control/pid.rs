//! PID Regulator - 比例-积分-微分调节器
//!
//! 速度跟踪循环每个节拍调用一次，把关节角误差映射为速度修正。
//!
//! # 算法
//!
//! ```text
//! M = Kp · E + Ki · diag(∫e dt) + Kd · diag(de/dt)
//! ```
//!
//! 误差以对角矩阵 `E = diag(e)` 进入，三个增益都是对角矩阵，
//! 因此输出矩阵 `M` 的对角线就是逐关节的修正量——关节之间
//! 没有耦合，增益矩阵保留非对角零元只是为了和标定工具的
//! 矩阵形式保持一致。
//!
//! # 特性
//!
//! - **积分饱和保护**: 积分项逐分量钳位，防止积分饱和
//! - **dt 异常处理**: `dt <= 0` 时返回零修正，不污染微分项

use nalgebra::{DMatrix, DVector};
use std::time::Duration;
use tracing::warn;

/// 对角增益矩阵形式的 PID 调节器
#[derive(Debug, Clone)]
pub struct PidRegulator {
    /// 比例增益矩阵（对角）
    kp: DMatrix<f64>,
    /// 积分增益矩阵（对角）
    ki: DMatrix<f64>,
    /// 微分增益矩阵（对角）
    kd: DMatrix<f64>,
    /// 积分项累积值
    integral: DVector<f64>,
    /// 上一次的误差（用于计算微分）
    last_error: DVector<f64>,
    /// 积分项逐分量限幅
    integral_limit: f64,
    /// 关节数
    n: usize,
}

impl PidRegulator {
    /// 创建调节器，标量增益广播到所有关节
    pub fn new(n_joints: usize, kp: f64, ki: f64, kd: f64, integral_limit: f64) -> Self {
        PidRegulator {
            kp: DMatrix::from_diagonal(&DVector::from_element(n_joints, kp)),
            ki: DMatrix::from_diagonal(&DVector::from_element(n_joints, ki)),
            kd: DMatrix::from_diagonal(&DVector::from_element(n_joints, kd)),
            integral: DVector::zeros(n_joints),
            last_error: DVector::zeros(n_joints),
            integral_limit,
            n: n_joints,
        }
    }

    /// 关节数
    pub fn n_joints(&self) -> usize {
        self.n
    }

    /// 当前积分项（调试用）
    pub fn integral(&self) -> &DVector<f64> {
        &self.integral
    }

    /// 更新一个节拍，返回修正矩阵
    ///
    /// 对角线是逐关节的修正量。`error` 长度必须等于关节数。
    pub fn update(&mut self, error: &[f64], dt: Duration) -> DMatrix<f64> {
        debug_assert_eq!(error.len(), self.n);
        let dt_sec = dt.as_secs_f64();
        if dt_sec <= 0.0 {
            warn!(dt = ?dt, "Regulator received non-positive dt, returning zero correction");
            return DMatrix::zeros(self.n, self.n);
        }

        let e = DVector::from_column_slice(error);

        // 积分 + 逐分量饱和保护
        self.integral = (&self.integral + &e * dt_sec)
            .map(|i| i.clamp(-self.integral_limit, self.integral_limit));

        let derivative = (&e - &self.last_error) / dt_sec;
        self.last_error = e.clone();

        &self.kp * DMatrix::from_diagonal(&e)
            + &self.ki * DMatrix::from_diagonal(&self.integral)
            + &self.kd * DMatrix::from_diagonal(&derivative)
    }

    /// 清零积分项和上次误差
    pub fn reset(&mut self) {
        self.integral = DVector::zeros(self.n);
        self.last_error = DVector::zeros(self.n);
    }
}

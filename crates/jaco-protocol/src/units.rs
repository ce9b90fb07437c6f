//! 单位转换函数 - UnitConverter
//!
//! 角度、手指行程和相对/绝对语义之间的纯转换函数。全部为无状态函数，
//! 便于在分发线程和控制循环中直接调用。
//!
//! # 约定
//!
//! - 内部计算一律使用弧度；Kinova 驱动的原生单位是度，
//!   只在命令构造的最后一步调用 [`rad_to_deg`]。
//! - 手指行程的原生单位是丝杠转数，`[0, MAX_FINGER_TURNS]`。
//! - 角度环绕统一折叠到 `(-π, π]`，误差计算永远不会跨 ±π 边界
//!   报出大于 π 的虚假跳变。

use crate::{MAX_FINGER_MM, MAX_FINGER_TURNS};
use std::f64::consts::PI;

/// 度 → 弧度
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

/// 弧度 → 度
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

/// 批量弧度 → 度
pub fn vec_rad_to_deg(rad: &[f64]) -> Vec<f64> {
    rad.iter().map(|r| r.to_degrees()).collect()
}

/// 批量度 → 弧度
pub fn vec_deg_to_rad(deg: &[f64]) -> Vec<f64> {
    deg.iter().map(|d| d.to_radians()).collect()
}

/// 手指行程：百分比 → 丝杠转数
///
/// 全开为 0%，全闭为 100%。转换后无论相对/绝对模式，
/// 结果都被钳位到 `[0, MAX_FINGER_TURNS]`。
#[inline]
pub fn percent_to_turns(percent: f64) -> f64 {
    (percent / 100.0 * MAX_FINGER_TURNS).clamp(0.0, MAX_FINGER_TURNS)
}

/// 手指行程：丝杠转数 → 百分比
#[inline]
pub fn turns_to_percent(turns: f64) -> f64 {
    turns.clamp(0.0, MAX_FINGER_TURNS) / MAX_FINGER_TURNS * 100.0
}

/// 手指行程：丝杠转数 → 毫米
///
/// 转数与直线行程按满行程线性对应。
#[inline]
pub fn turns_to_mm(turns: f64) -> f64 {
    turns.clamp(0.0, MAX_FINGER_TURNS) / MAX_FINGER_TURNS * MAX_FINGER_MM
}

/// 手指行程：毫米 → 丝杠转数
#[inline]
pub fn mm_to_turns(mm: f64) -> f64 {
    (mm / MAX_FINGER_MM * MAX_FINGER_TURNS).clamp(0.0, MAX_FINGER_TURNS)
}

/// 归一化手指命令 `[-1, 1]` → 百分比 `[0, 100]`
///
/// 超出 `[-1, 1]` 的输入先被钳位，再做仿射映射。
#[inline]
pub fn normalized_to_percent(value: f64) -> f64 {
    (value.clamp(-1.0, 1.0) + 1.0) / 2.0 * 100.0
}

/// 相对/绝对命令语义组合
///
/// `relative = true` 时把 `data` 作为相对当前值的增量逐分量叠加，
/// 否则原样返回绝对目标。`current` 不足的分量按 0 处理。
pub fn apply_relative(current: &[f64], data: &[f64], relative: bool) -> Vec<f64> {
    if !relative {
        return data.to_vec();
    }
    data.iter()
        .enumerate()
        .map(|(i, delta)| current.get(i).copied().unwrap_or(0.0) + delta)
        .collect()
}

/// 把角度折叠到 `(-π, π]`
#[inline]
pub fn wrap_to_pi(angle: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let mut wrapped = (angle + PI).rem_euclid(two_pi);
    // rem_euclid 把 π 的奇数倍折到 0，这里归入上边界 π
    if wrapped == 0.0 {
        wrapped = two_pi;
    }
    wrapped - PI
}

/// 环绕安全的角度误差：`wrap(wrap(current) - wrap(target))`
///
/// 结果的绝对值永远不超过 π。例如 current=3.0、target=-3.0 时
/// 返回 ≈ -(2π - 6.0) 而不是朴素差值 6.0。
#[inline]
pub fn wrap_angle_error(current: f64, target: f64) -> f64 {
    wrap_to_pi(wrap_to_pi(current) - wrap_to_pi(target))
}

/// 欧拉角（roll, pitch, yaw，弧度）→ 四元数 `[x, y, z, w]`
///
/// 与 ROS tf 的 `quaternion_from_euler`（sxyz 顺序）一致。
pub fn quaternion_from_euler(roll: f64, pitch: f64, yaw: f64) -> [f64; 4] {
    let (sr, cr) = (roll * 0.5).sin_cos();
    let (sp, cp) = (pitch * 0.5).sin_cos();
    let (sy, cy) = (yaw * 0.5).sin_cos();

    [
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy,
    ]
}

/// 四元数乘法 `a ⊗ b`（`[x, y, z, w]` 约定）
///
/// 相对工具位姿命令用它把增量旋转合成到当前姿态上。
pub fn quaternion_multiply(a: [f64; 4], b: [f64; 4]) -> [f64; 4] {
    let [ax, ay, az, aw] = a;
    let [bx, by, bz, bw] = b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

/// 四元数归一化
///
/// 范数退化（接近 0）时返回单位四元数而不是 NaN。
pub fn normalize_quaternion(q: [f64; 4]) -> [f64; 4] {
    let norm = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    if norm < 1e-12 {
        return [0.0, 0.0, 0.0, 1.0];
    }
    [q[0] / norm, q[1] / norm, q[2] / norm, q[3] / norm]
}

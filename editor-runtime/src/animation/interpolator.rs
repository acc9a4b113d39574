//! # Interpolator 模块
//!
//! 插值曲线，把驱动器给出的原始进度映射为插值后的进度。

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// 插值曲线
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolator {
    /// 线性（匀速）
    Linear,
    /// 加速（先慢后快）
    Accelerate,
    /// 减速（先快后慢）
    Decelerate,
    /// 两头慢中间快（余弦）
    AccelerateDecelerate,
    /// 快出慢入，等价于 `cubic-bezier(0.4, 0.0, 0.2, 1.0)`
    #[default]
    FastOutSlowIn,
    /// 自定义三次贝塞尔曲线
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl Interpolator {
    /// 创建自定义贝塞尔曲线
    ///
    /// 控制点的 x 坐标会被限制在 [0, 1]，保证曲线在 x 方向单调。
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::CubicBezier {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    /// 计算插值后的进度
    ///
    /// # 参数
    /// - `fraction`: 原始进度 (0.0 - 1.0)，超出范围会被限制
    ///
    /// # 返回
    /// - 插值后的进度，端点固定为 0.0 和 1.0
    pub fn apply(&self, fraction: f32) -> f32 {
        let t = fraction.clamp(0.0, 1.0);

        match self {
            Interpolator::Linear => t,
            Interpolator::Accelerate => t * t,
            Interpolator::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
            Interpolator::AccelerateDecelerate => ((t + 1.0) * PI).cos() / 2.0 + 0.5,
            Interpolator::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, t),
            Interpolator::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
        }
    }
}

/// 在 x = `progress` 处求贝塞尔曲线的 y 值
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let t = solve_bezier_x(x1, x2, progress);
    bezier_axis(y1, y2, t)
}

/// Newton-Raphson 求解 x(t) = target_x
fn solve_bezier_x(x1: f32, x2: f32, target_x: f32) -> f32 {
    let mut t = target_x;

    for _ in 0..8 {
        let x = bezier_axis(x1, x2, t) - target_x;
        if x.abs() < 1e-6 {
            break;
        }

        let dx = bezier_axis_derivative(x1, x2, t);
        if dx.abs() < 1e-6 {
            break;
        }

        t = (t - x / dx).clamp(0.0, 1.0);
    }

    t
}

/// 单轴贝塞尔：3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_axis(p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

#[inline]
fn bezier_axis_derivative(p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

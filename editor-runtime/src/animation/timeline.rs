//! # Timeline 模块
//!
//! 兜底驱动器：平台没有接管动画时，由引擎自己推进的线性时间轴。

use std::time::Duration;

/// 兜底时间轴
///
/// 只负责把逐帧的时间增量换算为原始进度，插值由记录完成。
#[derive(Debug, Clone)]
pub struct FallbackTimeline {
    /// 总时长
    duration: Duration,
    /// 已经过的时间
    elapsed: Duration,
}

impl FallbackTimeline {
    /// 创建时间轴
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// 总时长
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// 推进时间轴
    ///
    /// # 返回
    /// 推进后的原始进度（0.0 - 1.0）
    pub fn advance(&mut self, dt: Duration) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.fraction()
    }

    /// 当前原始进度
    pub fn fraction(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// 剩余时长
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }

    /// 是否已走完
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

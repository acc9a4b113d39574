//! # Offset 模块
//!
//! 过渡的偏移与进度值类型。
//!
//! - 偏移：面板区域占据的高度，与 Host 报告的坐标一致，总是 ≥ 0
//! - 进度：原始进度（驱动器给出）与插值进度（经过插值曲线）

/// 判定两个偏移"视觉上相同"的容差（半个像素）
pub const OFFSET_EPSILON: f32 = 0.5;

/// 两个偏移是否视觉上相同
pub fn offsets_equal(a: f32, b: f32) -> bool {
    (a - b).abs() < OFFSET_EPSILON
}

/// 一次过渡的三个偏移
///
/// 三个值总是同时存在：记录里以 `Option<TransitionOffsets>` 保存，
/// 不会出现只设置了一部分的情况。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionOffsets {
    start: f32,
    end: f32,
    current: f32,
}

impl TransitionOffsets {
    /// 创建偏移，`current` 从 `start` 开始
    pub fn new(start: f32, end: f32) -> Self {
        let start = start.max(0.0);
        let end = end.max(0.0);
        Self {
            start,
            end,
            current: start,
        }
    }

    /// 起始偏移
    pub fn start(&self) -> f32 {
        self.start
    }

    /// 结束偏移
    pub fn end(&self) -> f32 {
        self.end
    }

    /// 当前偏移
    pub fn current(&self) -> f32 {
        self.current
    }

    /// 偏移范围下界
    pub fn min(&self) -> f32 {
        self.start.min(self.end)
    }

    /// 偏移范围上界
    pub fn max(&self) -> f32 {
        self.start.max(self.end)
    }

    /// 把任意值限制在 `[min(start, end), max(start, end)]`
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min(), self.max())
    }

    /// 起止是否视觉上相同
    pub fn is_unchanged(&self) -> bool {
        offsets_equal(self.start, self.end)
    }

    /// 按插值进度计算并设置当前偏移
    pub fn set_by_fraction(&mut self, interpolated: f32) -> f32 {
        let value = self.start + (self.end - self.start) * interpolated;
        self.current = self.clamp(value);
        self.current
    }

    /// 设置当前偏移（会被限制在范围内）
    pub fn set_current(&mut self, value: f32) {
        self.current = self.clamp(value);
    }

    /// 当前偏移移到终点
    pub fn snap_to_end(&mut self) {
        self.current = self.end;
    }

    /// 终点收缩到当前偏移（强制结束时使用）
    pub fn collapse_to_current(&mut self) {
        self.end = self.current;
    }
}

/// 过渡进度
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Fraction {
    /// 原始进度（0.0 - 1.0）
    pub animated: f32,
    /// 插值后的进度
    pub interpolated: f32,
}

impl Fraction {
    /// 完成状态
    pub const COMPLETE: Fraction = Fraction {
        animated: 1.0,
        interpolated: 1.0,
    };
}

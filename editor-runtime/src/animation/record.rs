//! # Record 模块
//!
//! 单次过渡的完整状态。
//!
//! ## 状态机
//!
//! ```text
//! Unstarted → Prepared → Started → Updating* → Ended
//!                 └──────────────────────────────┘ (未开始即被结束)
//! ```
//!
//! 驱动器一旦确定就不再改变，换驱动器只能结束当前记录再创建新记录。

use std::cell::Cell;
use std::time::Duration;

use crate::editor::Editor;
use crate::host::{FrameActionHandle, ViewId};

use super::{AnimationState, FallbackTimeline, Fraction, Interpolator, TransitionOffsets};

/// 记录 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(pub u64);

/// 记录阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordPhase {
    /// 刚创建
    #[default]
    Unstarted,
    /// 已通知 prepare，等待驱动器
    Prepared,
    /// 已通知 start
    Started,
    /// 正在逐帧更新
    Updating,
    /// 已结束
    Ended,
}

impl RecordPhase {
    /// 是否已开始且未结束
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Started | Self::Updating)
    }
}

/// 动画驱动器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Driver {
    /// 尚未确定
    #[default]
    None,
    /// 平台软键盘动画
    Platform,
    /// 引擎自己的兜底时间轴
    Fallback,
}

/// 动画记录
#[derive(Debug)]
pub struct AnimationRecord {
    id: RecordId,
    previous: Option<Editor>,
    current: Option<Editor>,
    start_view: Option<ViewId>,
    end_view: Option<ViewId>,
    offsets: Option<TransitionOffsets>,
    fraction: Fraction,
    duration_millis: u64,
    interpolator: Interpolator,
    driver: Driver,
    phase: RecordPhase,
    timeline: Option<FallbackTimeline>,
    /// 本阶段开始时平台动画已走过的进度
    platform_origin: f32,
    /// 最近一次收到的平台原始进度
    platform_raw: f32,
    /// 兜底驱动器竞争用的绘制前回调
    armed_action: Option<FrameActionHandle>,
}

impl AnimationRecord {
    /// 创建记录
    pub fn new(
        id: RecordId,
        previous: Option<Editor>,
        current: Option<Editor>,
        duration_millis: u64,
        interpolator: Interpolator,
    ) -> Self {
        Self {
            id,
            previous,
            current,
            start_view: None,
            end_view: None,
            offsets: None,
            fraction: Fraction::default(),
            duration_millis,
            interpolator,
            driver: Driver::None,
            phase: RecordPhase::Unstarted,
            timeline: None,
            platform_origin: 0.0,
            platform_raw: 0.0,
            armed_action: None,
        }
    }

    /// 设置参与过渡的视图
    pub fn with_views(mut self, start_view: Option<ViewId>, end_view: Option<ViewId>) -> Self {
        self.start_view = start_view;
        self.end_view = end_view;
        self
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn previous(&self) -> Option<&Editor> {
        self.previous.as_ref()
    }

    pub fn current(&self) -> Option<&Editor> {
        self.current.as_ref()
    }

    pub fn start_view(&self) -> Option<ViewId> {
        self.start_view
    }

    pub fn end_view(&self) -> Option<ViewId> {
        self.end_view
    }

    pub fn offsets(&self) -> Option<&TransitionOffsets> {
        self.offsets.as_ref()
    }

    pub fn fraction(&self) -> Fraction {
        self.fraction
    }

    pub fn duration_millis(&self) -> u64 {
        self.duration_millis
    }

    pub fn interpolator(&self) -> Interpolator {
        self.interpolator
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }

    pub fn phase(&self) -> RecordPhase {
        self.phase
    }

    /// 过渡的任一侧是否为 `editor`
    pub fn involves(&self, editor: &Editor) -> bool {
        self.previous.as_ref() == Some(editor) || self.current.as_ref() == Some(editor)
    }

    /// 三个偏移是否都已设置
    pub fn check_animation_offset(&self) -> bool {
        self.offsets.is_some()
    }

    /// 覆盖时长与插值（拦截器使用）
    pub fn set_timing(&mut self, duration_millis: u64, interpolator: Interpolator) {
        self.duration_millis = duration_millis;
        self.interpolator = interpolator;
    }

    /// Unstarted → Prepared
    pub fn prepare(&mut self) -> bool {
        if self.phase != RecordPhase::Unstarted {
            return false;
        }
        self.phase = RecordPhase::Prepared;
        true
    }

    // ========== 兜底竞争 ==========

    /// 记录已注册的绘制前回调
    pub fn arm(&mut self, handle: FrameActionHandle) {
        self.armed_action = Some(handle);
    }

    /// 取出绘制前回调（用于取消）
    pub fn take_armed_action(&mut self) -> Option<FrameActionHandle> {
        self.armed_action.take()
    }

    /// 是否由 `handle` 武装
    pub fn is_armed_with(&self, handle: FrameActionHandle) -> bool {
        self.armed_action == Some(handle)
    }

    /// 确定驱动器
    ///
    /// # 返回
    /// - `true`: 本次确定了驱动器
    /// - `false`: 已有驱动器，保持不变
    pub fn attach_driver(&mut self, driver: Driver) -> bool {
        if self.driver != Driver::None || driver == Driver::None {
            return false;
        }
        self.driver = driver;
        if driver == Driver::Fallback {
            self.timeline = Some(FallbackTimeline::new(Duration::from_millis(
                self.duration_millis,
            )));
        }
        true
    }

    // ========== 开始与更新 ==========

    /// Prepared → Started
    pub fn start(&mut self, offsets: TransitionOffsets) -> bool {
        if self.phase != RecordPhase::Prepared {
            return false;
        }
        self.offsets = Some(offsets);
        self.fraction = Fraction::default();
        self.phase = RecordPhase::Started;
        true
    }

    /// 起止相同或动画被禁用时直接把进度定在 1
    pub fn finish_immediately(&mut self) {
        self.fraction = Fraction::COMPLETE;
        if let Some(offsets) = self.offsets.as_mut() {
            offsets.snap_to_end();
        }
    }

    /// 用原始进度更新
    ///
    /// # 返回
    /// 更新后的当前偏移；偏移未设置时返回 `None`
    pub fn update(&mut self, raw: f32) -> Option<f32> {
        let offsets = self.offsets.as_mut()?;
        let animated = raw.clamp(0.0, 1.0);
        let interpolated = self.interpolator.apply(animated);
        self.fraction = Fraction {
            animated,
            interpolated,
        };
        if self.phase == RecordPhase::Started {
            self.phase = RecordPhase::Updating;
        }
        Some(offsets.set_by_fraction(interpolated))
    }

    /// 推进兜底时间轴
    pub fn advance_fallback(&mut self, dt: Duration) -> Option<f32> {
        if self.driver != Driver::Fallback || !self.phase.is_running() {
            return None;
        }
        self.timeline.as_mut().map(|timeline| timeline.advance(dt))
    }

    /// 兜底时间轴剩余时长
    pub fn fallback_remaining(&self) -> Option<Duration> {
        self.timeline.as_ref().map(FallbackTimeline::remaining)
    }

    /// 本阶段剩余时长（毫秒）
    ///
    /// 兜底驱动取时间轴的剩余时长，平台驱动按已走过的进度折算。
    pub fn remaining_millis(&self) -> u64 {
        if let Some(remaining) = self.fallback_remaining() {
            return remaining.as_millis() as u64;
        }
        let left = 1.0 - self.fraction.animated;
        (self.duration_millis as f32 * left).round().max(0.0) as u64
    }

    /// 设置本阶段的平台进度起点
    pub fn set_platform_origin(&mut self, origin: f32) {
        self.platform_origin = origin.clamp(0.0, 1.0);
        self.platform_raw = self.platform_origin;
    }

    /// 最近一次收到的平台原始进度
    pub fn platform_raw(&self) -> f32 {
        self.platform_raw
    }

    /// 把平台进度映射到本阶段
    pub fn map_platform_fraction(&mut self, fraction: f32) -> f32 {
        self.platform_raw = fraction.clamp(0.0, 1.0);
        let span = 1.0 - self.platform_origin;
        if span <= f32::EPSILON {
            return 1.0;
        }
        ((self.platform_raw - self.platform_origin) / span).clamp(0.0, 1.0)
    }

    // ========== 结束 ==========

    /// 是否已经停在终点（原始进度为 1）
    pub fn is_at_end(&self) -> bool {
        self.fraction.animated >= 1.0
    }

    /// 正常完成：进度 1，当前偏移到终点
    pub fn complete(&mut self) {
        self.finish_immediately();
    }

    /// 强制结束：终点收缩到已到达的偏移
    ///
    /// 未开始的记录三个偏移都取 `applied_offset`。
    pub fn interrupt(&mut self, applied_offset: f32) {
        match self.offsets.as_mut() {
            Some(offsets) => offsets.collapse_to_current(),
            None => self.offsets = Some(TransitionOffsets::new(applied_offset, applied_offset)),
        }
        self.fraction = Fraction::COMPLETE;
    }

    /// → Ended
    pub fn mark_ended(&mut self) {
        self.phase = RecordPhase::Ended;
    }

    /// 生成回调用的状态快照
    pub fn state(&self) -> Option<AnimationState> {
        let offsets = self.offsets?;
        Some(AnimationState {
            previous: self.previous.clone(),
            current: self.current.clone(),
            offsets,
            fraction: self.fraction,
            duration_millis: self.duration_millis,
            interpolator: self.interpolator,
            start_view: self.start_view,
            end_view: self.end_view,
            offset_request: Cell::new(None),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AnimationRecord {
        AnimationRecord::new(
            RecordId(1),
            None,
            Some(Editor::new("voice")),
            200,
            Interpolator::Linear,
        )
    }

    #[test]
    fn test_phase_order() {
        let mut record = record();
        assert_eq!(record.phase(), RecordPhase::Unstarted);
        assert!(!record.start(TransitionOffsets::new(0.0, 100.0)));

        assert!(record.prepare());
        assert!(!record.prepare());
        assert!(record.start(TransitionOffsets::new(0.0, 100.0)));
        assert_eq!(record.phase(), RecordPhase::Started);

        record.update(0.5);
        assert_eq!(record.phase(), RecordPhase::Updating);
    }

    #[test]
    fn test_driver_is_fixed_once_attached() {
        let mut record = record();
        assert!(record.attach_driver(Driver::Platform));
        assert!(!record.attach_driver(Driver::Fallback));
        assert_eq!(record.driver(), Driver::Platform);
        assert!(record.fallback_remaining().is_none());
    }

    #[test]
    fn test_update_without_offsets() {
        let mut record = record();
        record.prepare();
        assert_eq!(record.update(0.5), None);
        assert!(!record.check_animation_offset());
    }

    #[test]
    fn test_fallback_advance() {
        let mut record = record();
        record.prepare();
        record.attach_driver(Driver::Fallback);
        record.start(TransitionOffsets::new(0.0, 100.0));

        let raw = record.advance_fallback(Duration::from_millis(50)).unwrap();
        assert_eq!(raw, 0.25);
        assert_eq!(record.update(raw), Some(25.0));
        assert_eq!(record.fallback_remaining(), Some(Duration::from_millis(150)));
    }

    #[test]
    fn test_remaining_millis() {
        let mut record = record();
        record.prepare();
        record.attach_driver(Driver::Platform);
        record.start(TransitionOffsets::new(0.0, 100.0));
        record.update(0.25);
        assert_eq!(record.remaining_millis(), 150);
        assert!(!record.is_at_end());

        record.update(1.0);
        assert_eq!(record.remaining_millis(), 0);
        assert!(record.is_at_end());
    }

    #[test]
    fn test_interrupt_collapses_end() {
        let mut record = record();
        record.prepare();
        record.start(TransitionOffsets::new(0.0, 200.0));
        record.update(0.5);

        record.interrupt(999.0);
        let offsets = record.offsets().unwrap();
        assert_eq!(offsets.end(), 100.0);
        assert_eq!(offsets.current(), 100.0);
        assert_eq!(record.fraction(), Fraction::COMPLETE);
    }

    #[test]
    fn test_interrupt_before_start_uses_applied_offset() {
        let mut record = record();
        record.prepare();
        record.interrupt(80.0);

        let offsets = record.offsets().unwrap();
        assert_eq!(offsets.start(), 80.0);
        assert_eq!(offsets.end(), 80.0);
        assert_eq!(offsets.current(), 80.0);
    }

    #[test]
    fn test_platform_fraction_remap() {
        let mut record = record();
        assert_eq!(record.map_platform_fraction(0.5), 0.5);

        record.set_platform_origin(0.5);
        assert_eq!(record.map_platform_fraction(0.75), 0.5);
        assert_eq!(record.map_platform_fraction(1.0), 1.0);
        assert_eq!(record.platform_raw(), 1.0);
    }

    #[test]
    fn test_state_snapshot() {
        let mut record = record().with_views(None, Some(ViewId(7)));
        assert!(record.state().is_none());

        record.prepare();
        record.start(TransitionOffsets::new(0.0, 100.0));
        record.complete();

        let state = record.state().unwrap();
        assert_eq!(state.current_offset(), 100.0);
        assert_eq!(state.animated_fraction(), 1.0);
        assert_eq!(state.end_view(), Some(ViewId(7)));
    }
}

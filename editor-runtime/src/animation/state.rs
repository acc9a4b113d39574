//! # State 模块
//!
//! 回调里看到的动画状态。

use std::cell::Cell;

use crate::editor::Editor;
use crate::host::ViewId;

use super::{Fraction, Interpolator, TransitionOffsets};

/// 动画状态（活跃记录的只读快照）
///
/// 唯一的写操作是 [`AnimationState::update_editor_offset`]，
/// 只能在回调内使用，回调返回后由引擎应用到 Host。
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub(crate) previous: Option<Editor>,
    pub(crate) current: Option<Editor>,
    pub(crate) offsets: TransitionOffsets,
    pub(crate) fraction: Fraction,
    pub(crate) duration_millis: u64,
    pub(crate) interpolator: Interpolator,
    pub(crate) start_view: Option<ViewId>,
    pub(crate) end_view: Option<ViewId>,
    pub(crate) offset_request: Cell<Option<f32>>,
}

impl AnimationState {
    /// 上一个面板
    pub fn previous(&self) -> Option<&Editor> {
        self.previous.as_ref()
    }

    /// 当前面板
    pub fn current(&self) -> Option<&Editor> {
        self.current.as_ref()
    }

    pub fn start_offset(&self) -> f32 {
        self.offsets.start()
    }

    pub fn end_offset(&self) -> f32 {
        self.offsets.end()
    }

    pub fn current_offset(&self) -> f32 {
        self.offsets.current()
    }

    /// 原始进度
    pub fn animated_fraction(&self) -> f32 {
        self.fraction.animated
    }

    /// 插值后的进度
    pub fn interpolated_fraction(&self) -> f32 {
        self.fraction.interpolated
    }

    pub fn duration_millis(&self) -> u64 {
        self.duration_millis
    }

    pub fn interpolator(&self) -> Interpolator {
        self.interpolator
    }

    /// 离场面板的视图
    pub fn start_view(&self) -> Option<ViewId> {
        self.start_view
    }

    /// 入场面板的视图
    pub fn end_view(&self) -> Option<ViewId> {
        self.end_view
    }

    /// 过渡的目标面板是否为 `editor`
    pub fn is_editor(&self, editor: &Editor) -> bool {
        self.current.as_ref() == Some(editor)
    }

    /// 在回调内修改 Host 的偏移
    ///
    /// 值会被限制在本次过渡的偏移范围内，多次调用以最后一次为准。
    pub fn update_editor_offset(&self, offset: f32) {
        self.offset_request.set(Some(self.offsets.clamp(offset)));
    }

    pub(crate) fn take_offset_request(&self) -> Option<f32> {
        self.offset_request.take()
    }
}

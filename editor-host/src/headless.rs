//! # Headless 模块
//!
//! 不依赖任何界面框架的面板容器，实现 [`Host`] 契约。
//!
//! 容器只记录引擎发来的请求（布局、绘制前回调、软键盘可见性），
//! 由 [`HeadlessRunner`](crate::HeadlessRunner) 在每一帧按 UI 线程的顺序送回引擎。

use std::collections::HashMap;

use editor_runtime::{Editor, FrameActionHandle, Host, PlatformTiming, ViewId};
use tracing::trace;

use crate::config::HostConfig;

/// 无界面面板容器
#[derive(Debug)]
pub struct HeadlessHost {
    ime: Editor,
    heights: HashMap<Editor, f32>,
    navigation_bar: f32,

    current: Option<Editor>,
    views: Vec<(Editor, ViewId)>,
    next_view: u64,
    removed_views: Vec<ViewId>,

    /// 已提交的面板偏移
    offset: f32,
    /// 平台当前报告的软键盘高度
    ime_extent: f32,
    ime_visible: bool,

    layout_requested: bool,
    ime_request: Option<bool>,
    actions: Vec<FrameActionHandle>,
    next_action: u64,

    offset_listener: bool,
    platform_listener: Option<PlatformTiming>,
}

impl HeadlessHost {
    /// 按配置创建空容器
    pub fn new(config: &HostConfig) -> Self {
        let heights = config
            .panels
            .iter()
            .map(|panel| (Editor::new(panel.name.clone()), panel.height))
            .collect();
        Self {
            ime: Editor::new(config.ime_name.clone()),
            heights,
            navigation_bar: config.navigation_bar_height,
            current: None,
            views: Vec::new(),
            next_view: 1,
            removed_views: Vec::new(),
            offset: 0.0,
            ime_extent: 0.0,
            ime_visible: false,
            layout_requested: false,
            ime_request: None,
            actions: Vec::new(),
            next_action: 1,
            offset_listener: false,
            platform_listener: None,
        }
    }

    // ========== 查询 ==========

    /// 已提交的偏移
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_ime_visible(&self) -> bool {
        self.ime_visible
    }

    /// 当前挂载的视图
    pub fn views(&self) -> impl Iterator<Item = (&Editor, ViewId)> {
        self.views.iter().map(|(editor, view)| (editor, *view))
    }

    /// 已移除的视图（按移除顺序）
    pub fn removed_views(&self) -> &[ViewId] {
        &self.removed_views
    }

    /// 是否已注册偏移提交监听
    pub fn has_offset_listener(&self) -> bool {
        self.offset_listener
    }

    /// 平台动画监听的时长/插值提示
    pub fn platform_listener(&self) -> Option<PlatformTiming> {
        self.platform_listener
    }

    /// 是否是已知面板
    pub fn knows(&self, editor: &Editor) -> bool {
        editor == &self.ime || self.heights.contains_key(editor)
    }

    /// 面板重新测量后的高度
    ///
    /// 只改变测量值，引擎在下一次偏移提交时发现差异并修正。
    pub fn set_editor_extent(&mut self, editor: Editor, height: f32) {
        self.heights.insert(editor, height.max(0.0));
    }

    // ========== 运行器使用 ==========

    /// 取出布局请求
    pub(crate) fn take_layout_request(&mut self) -> bool {
        std::mem::take(&mut self.layout_requested)
    }

    /// 取出软键盘可见性请求
    pub(crate) fn take_ime_request(&mut self) -> Option<bool> {
        self.ime_request.take()
    }

    /// 取出本帧要执行的绘制前回调
    pub(crate) fn take_actions(&mut self) -> Vec<FrameActionHandle> {
        std::mem::take(&mut self.actions)
    }

    pub(crate) fn has_queued_work(&self) -> bool {
        self.layout_requested || self.ime_request.is_some() || !self.actions.is_empty()
    }

    /// 平台报告软键盘高度
    pub(crate) fn set_ime_extent(&mut self, extent: f32) {
        trace!(extent, "软键盘高度变化");
        self.ime_extent = extent;
    }

    pub(crate) fn set_ime_visible(&mut self, visible: bool) {
        self.ime_visible = visible;
    }

    fn ensure_view(&mut self, editor: &Editor) -> ViewId {
        if let Some(view) = self.view_of(editor) {
            return view;
        }
        let view = ViewId(self.next_view);
        self.next_view += 1;
        self.views.push((editor.clone(), view));
        view
    }
}

impl Host for HeadlessHost {
    fn ime(&self) -> &Editor {
        &self.ime
    }

    fn current_editor(&self) -> Option<&Editor> {
        self.current.as_ref()
    }

    fn view_of(&self, editor: &Editor) -> Option<ViewId> {
        self.views
            .iter()
            .find(|(candidate, _)| candidate == editor)
            .map(|(_, view)| *view)
    }

    fn current_offset(&self) -> f32 {
        self.offset
    }

    fn navigation_bar_offset(&self) -> f32 {
        self.navigation_bar
    }

    fn ime_extent(&self) -> f32 {
        self.ime_extent
    }

    fn editor_extent(&self, editor: &Editor) -> f32 {
        self.heights.get(editor).copied().unwrap_or(0.0)
    }

    fn update_editor_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    fn remove_view(&mut self, view: ViewId) {
        self.views.retain(|(_, candidate)| *candidate != view);
        self.removed_views.push(view);
    }

    fn realize_change(&mut self, previous: Option<&Editor>, current: Option<&Editor>) {
        if let Some(editor) = current {
            let view = self.ensure_view(editor);
            trace!(
                previous = previous.map(Editor::name),
                editor = editor.name(),
                view = view.0,
                "挂载面板视图"
            );
        }
        self.current = current.cloned();
    }

    fn request_layout(&mut self) {
        self.layout_requested = true;
    }

    fn request_ime_visibility(&mut self, visible: bool) {
        self.ime_request = Some(visible);
    }

    fn has_pending_change(&self) -> bool {
        self.layout_requested
    }

    fn add_before_frame_action(&mut self) -> FrameActionHandle {
        let handle = FrameActionHandle(self.next_action);
        self.next_action += 1;
        self.actions.push(handle);
        handle
    }

    fn cancel_before_frame_action(&mut self, handle: FrameActionHandle) {
        self.actions.retain(|candidate| *candidate != handle);
    }

    fn set_offset_applied_listener(&mut self, enabled: bool) {
        self.offset_listener = enabled;
    }

    fn set_platform_animation_listener(&mut self, timing: Option<PlatformTiming>) {
        self.platform_listener = timing;
    }
}

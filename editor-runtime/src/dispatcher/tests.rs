//! EditorAnimator 单元测试
//!
//! 使用最小的内存 Host，逐步送入布局、绘制前回调、平台动画与逐帧事件。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use super::*;
use crate::capability::TimingOverride;
use crate::host::{PlatformTiming, ViewId};

const FRAME: Duration = Duration::from_millis(25);

fn ime() -> Editor {
    Editor::new("ime")
}

fn voice() -> Editor {
    Editor::new("voice")
}

fn emoji() -> Editor {
    Editor::new("emoji")
}

/// 内存 Host
struct TestHost {
    ime: Editor,
    current: Option<Editor>,
    views: Vec<(Editor, ViewId)>,
    next_view: u64,
    extents: HashMap<Editor, f32>,
    ime_extent: f32,
    navigation_bar: f32,
    offset: f32,
    next_action: u64,
    actions: Vec<FrameActionHandle>,
    cancelled: Vec<FrameActionHandle>,
    removed: Vec<ViewId>,
    layout_requests: u32,
    ime_requests: Vec<bool>,
    realized: Vec<(Option<Editor>, Option<Editor>)>,
    offset_listener: bool,
    platform_listener: Option<PlatformTiming>,
}

impl TestHost {
    fn new() -> Self {
        let mut extents = HashMap::new();
        extents.insert(voice(), 300.0);
        extents.insert(emoji(), 400.0);
        Self {
            ime: ime(),
            current: None,
            views: Vec::new(),
            next_view: 1,
            extents,
            ime_extent: 0.0,
            navigation_bar: 0.0,
            offset: 0.0,
            next_action: 1,
            actions: Vec::new(),
            cancelled: Vec::new(),
            removed: Vec::new(),
            layout_requests: 0,
            ime_requests: Vec::new(),
            realized: Vec::new(),
            offset_listener: false,
            platform_listener: None,
        }
    }

    /// 已显示某个面板的 Host
    fn showing(editor: Editor, offset: f32) -> Self {
        let mut host = Self::new();
        host.ensure_view(&editor);
        if editor == ime() {
            host.ime_extent = offset;
        }
        host.current = Some(editor);
        host.offset = offset;
        host
    }

    fn ensure_view(&mut self, editor: &Editor) {
        if self.view_of(editor).is_none() {
            self.views.push((editor.clone(), ViewId(self.next_view)));
            self.next_view += 1;
        }
    }

    fn last_action(&self) -> FrameActionHandle {
        *self.actions.last().unwrap()
    }
}

impl Host for TestHost {
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
        self.extents.get(editor).copied().unwrap_or(0.0)
    }

    fn update_editor_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    fn remove_view(&mut self, view: ViewId) {
        self.views.retain(|(_, candidate)| *candidate != view);
        self.removed.push(view);
    }

    fn realize_change(&mut self, previous: Option<&Editor>, current: Option<&Editor>) {
        self.realized.push((previous.cloned(), current.cloned()));
        if let Some(editor) = current {
            self.ensure_view(editor);
        }
        self.current = current.cloned();
    }

    fn request_layout(&mut self) {
        self.layout_requests += 1;
    }

    fn request_ime_visibility(&mut self, visible: bool) {
        self.ime_requests.push(visible);
    }

    fn add_before_frame_action(&mut self) -> FrameActionHandle {
        let handle = FrameActionHandle(self.next_action);
        self.next_action += 1;
        self.actions.push(handle);
        handle
    }

    fn cancel_before_frame_action(&mut self, handle: FrameActionHandle) {
        self.cancelled.push(handle);
    }

    fn set_offset_applied_listener(&mut self, enabled: bool) {
        self.offset_listener = enabled;
    }

    fn set_platform_animation_listener(&mut self, timing: Option<PlatformTiming>) {
        self.platform_listener = timing;
    }
}

type Log = Rc<RefCell<Vec<String>>>;

/// 记录通知并检查 end 的约束
struct Recorder {
    log: Log,
}

fn name(editor: Option<&Editor>) -> String {
    editor.map_or_else(|| "none".to_string(), |editor| editor.name().to_string())
}

impl AnimationCallback for Recorder {
    fn on_prepare(
        &mut self,
        previous: Option<&Editor>,
        current: Option<&Editor>,
        _cx: &mut CallbackContext<'_>,
    ) {
        self.log
            .borrow_mut()
            .push(format!("prepare {} -> {}", name(previous), name(current)));
    }

    fn on_start(&mut self, state: &AnimationState, _cx: &mut CallbackContext<'_>) {
        self.log.borrow_mut().push(format!(
            "start {:.0} -> {:.0}",
            state.start_offset(),
            state.end_offset()
        ));
    }

    fn on_update(&mut self, state: &AnimationState, _cx: &mut CallbackContext<'_>) {
        let (low, high) = (
            state.start_offset().min(state.end_offset()),
            state.start_offset().max(state.end_offset()),
        );
        assert!(state.current_offset() >= low && state.current_offset() <= high);
        self.log
            .borrow_mut()
            .push(format!("update {:.0}", state.current_offset()));
    }

    fn on_end(&mut self, state: &AnimationState, _cx: &mut CallbackContext<'_>) {
        assert_eq!(state.animated_fraction(), 1.0);
        assert_eq!(state.current_offset(), state.end_offset());
        self.log
            .borrow_mut()
            .push(format!("end {:.0}", state.current_offset()));
    }
}

fn linear_config() -> EngineConfig {
    EngineConfig {
        duration_millis: 100,
        interpolator: Interpolator::Linear,
        ..EngineConfig::default()
    }
}

fn animator_with(host: TestHost) -> (EditorAnimator<TestHost>, Log) {
    let mut animator = EditorAnimator::new(linear_config());
    animator.attach(host);
    let log = Log::default();
    animator.add_animation_callback(Recorder { log: log.clone() });
    (animator, log)
}

fn host(animator: &EditorAnimator<TestHost>) -> &TestHost {
    animator.host().unwrap()
}

/// 布局后让兜底驱动器赢得竞争
fn layout_with_fallback(animator: &mut EditorAnimator<TestHost>) {
    animator.on_layout();
    let handle = host(animator).last_action();
    animator.on_before_frame(handle);
}

fn frames(animator: &mut EditorAnimator<TestHost>, count: usize) {
    for _ in 0..count {
        animator.on_animation_frame(FRAME);
    }
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

// ========== 基本流程 ==========

#[test]
fn test_without_host_everything_is_noop() {
    let mut animator: EditorAnimator<TestHost> = EditorAnimator::new(linear_config());
    assert!(!animator.request_show(voice()));
    animator.on_layout();
    animator.on_host_offset_applied();
    animator.on_animation_frame(FRAME);
    assert!(!animator.is_running());
    assert!(animator.detach().is_none());
}

#[test]
fn test_attach_registers_listeners() {
    let mut animator = EditorAnimator::new(linear_config());
    assert!(animator.attach(TestHost::new()).is_none());
    assert!(host(&animator).offset_listener);
    assert!(host(&animator).platform_listener.is_some());

    let detached = animator.detach().unwrap();
    assert!(!detached.offset_listener);
    assert!(detached.platform_listener.is_none());
}

#[test]
fn test_show_panel_with_fallback() {
    let (mut animator, log) = animator_with(TestHost::new());

    assert!(animator.request_show(voice()));
    assert_eq!(host(&animator).layout_requests, 1);
    assert!(host(&animator).ime_requests.is_empty());

    layout_with_fallback(&mut animator);
    assert_eq!(animator.active_record().unwrap().driver(), Driver::Fallback);

    frames(&mut animator, 4);
    assert!(!animator.is_running());
    assert_eq!(host(&animator).offset, 300.0);
    assert_eq!(
        take(&log),
        [
            "prepare none -> voice",
            "start 0 -> 300",
            "update 75",
            "update 150",
            "update 225",
            "update 300",
            "end 300",
        ]
    );
}

#[test]
fn test_same_destination_is_suppressed() {
    let (mut animator, log) = animator_with(TestHost::showing(voice(), 300.0));

    assert!(!animator.request_show(voice()));
    animator.on_layout();
    assert!(!animator.is_running());
    assert!(take(&log).is_empty());
}

#[test]
fn test_coalesce_to_final_destination() {
    let (mut animator, log) = animator_with(TestHost::new());

    assert!(animator.request_show(voice()));
    assert!(animator.request_show(emoji()));
    layout_with_fallback(&mut animator);

    assert_eq!(host(&animator).realized, vec![(None, Some(emoji()))]);
    assert!(host(&animator).view_of(&voice()).is_none());
    assert_eq!(take(&log), ["prepare none -> emoji", "start 0 -> 400"]);
}

#[test]
fn test_coalesce_back_to_origin_creates_nothing() {
    let (mut animator, log) = animator_with(TestHost::showing(voice(), 300.0));

    assert!(animator.request_show(emoji()));
    assert!(animator.request_show(voice()));
    animator.on_layout();

    assert!(!animator.is_running());
    assert!(host(&animator).realized.is_empty());
    assert!(take(&log).is_empty());
}

// ========== 中断 ==========

#[test]
fn test_interrupt_ends_old_record_before_prepare() {
    let (mut animator, log) = animator_with(TestHost::new());

    animator.request_show(voice());
    layout_with_fallback(&mut animator);
    frames(&mut animator, 2);
    take(&log);

    assert!(animator.request_show(ime()));
    assert_eq!(host(&animator).ime_requests, vec![true]);
    animator.host_mut().unwrap().ime_extent = 300.0;
    animator.on_layout();

    assert_eq!(take(&log), ["end 150", "prepare voice -> ime"]);

    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Start {
        duration_millis: 100,
    }));
    assert_eq!(take(&log), ["start 150 -> 300"]);
}

#[test]
fn test_end_animation_before_start() {
    let (mut animator, log) = animator_with(TestHost::new());

    animator.request_show(voice());
    animator.on_layout();
    animator.end_animation();

    assert!(!animator.is_running());
    assert_eq!(take(&log), ["prepare none -> voice", "end 0"]);
    // 武装的绘制前回调被取消
    let handle = host(&animator).last_action();
    assert!(host(&animator).cancelled.contains(&handle));
}

// ========== 驱动器竞争 ==========

#[test]
fn test_platform_wins_race() {
    let (mut animator, log) = animator_with(TestHost::new());

    animator.request_show(ime());
    animator.host_mut().unwrap().ime_extent = 300.0;
    animator.on_layout();
    let handle = host(&animator).last_action();

    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Prepare));
    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Start {
        duration_millis: 160,
    }));
    assert!(host(&animator).cancelled.contains(&handle));
    assert_eq!(animator.active_record().unwrap().driver(), Driver::Platform);
    assert_eq!(animator.active_state().unwrap().duration_millis(), 160);

    // 过期的绘制前回调不会再启动兜底
    animator.on_before_frame(handle);
    frames(&mut animator, 2);

    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Progress {
        fraction: 0.5,
    }));
    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::End));

    assert_eq!(
        take(&log),
        [
            "prepare none -> ime",
            "start 0 -> 300",
            "update 150",
            "update 300",
            "end 300",
        ]
    );
}

#[test]
fn test_platform_start_after_fallback_is_ignored() {
    let (mut animator, log) = animator_with(TestHost::new());

    animator.request_show(ime());
    animator.host_mut().unwrap().ime_extent = 300.0;
    layout_with_fallback(&mut animator);
    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Start {
        duration_millis: 160,
    }));
    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Progress {
        fraction: 0.9,
    }));

    assert_eq!(animator.active_record().unwrap().driver(), Driver::Fallback);
    assert_eq!(take(&log), ["prepare none -> ime", "start 0 -> 300"]);

    frames(&mut animator, 4);
    assert_eq!(take(&log).last().map(String::as_str), Some("end 300"));
}

#[test]
fn test_platform_events_for_other_insets_are_ignored() {
    let (mut animator, _log) = animator_with(TestHost::new());

    animator.request_show(ime());
    animator.on_layout();
    animator.on_platform_animation(PlatformAnimationEvent {
        kind: InsetsKind::SystemBars,
        phase: PlatformPhase::Start { duration_millis: 100 },
    });
    assert_eq!(animator.active_record().unwrap().driver(), Driver::None);
}

#[test]
fn test_platform_start_for_panel_switch_is_ignored() {
    let (mut animator, _log) = animator_with(TestHost::new());

    animator.request_show(voice());
    animator.on_layout();
    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Start {
        duration_millis: 100,
    }));
    assert_eq!(animator.active_record().unwrap().driver(), Driver::None);
}

#[test]
fn test_timing_override_keeps_record_duration() {
    struct Accept(Rc<Cell<u64>>);

    impl TimingOverride for Accept {
        fn try_override_timing(&mut self, duration_millis: u64, _: Interpolator) -> bool {
            self.0.set(duration_millis);
            true
        }
    }

    let seen = Rc::new(Cell::new(0));
    let (mut animator, _log) = animator_with(TestHost::new());
    let probe = {
        let seen = seen.clone();
        TimingOverrideProbe::new(move || {
            Some(Box::new(Accept(seen.clone())) as Box<dyn TimingOverride>)
        })
    };
    animator.set_timing_override(Rc::new(probe));

    animator.request_show(ime());
    animator.host_mut().unwrap().ime_extent = 300.0;
    animator.on_layout();
    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Start {
        duration_millis: 160,
    }));

    assert_eq!(seen.get(), 100);
    assert_eq!(animator.active_state().unwrap().duration_millis(), 100);
}

// ========== 立即完成 ==========

#[test]
fn test_disabled_animation_is_immediate() {
    let mut animator = EditorAnimator::new(EngineConfig {
        animation_enabled: false,
        ..linear_config()
    });
    animator.attach(TestHost::new());
    let log = Log::default();
    animator.add_animation_callback(Recorder { log: log.clone() });

    animator.request_show(voice());
    layout_with_fallback(&mut animator);

    assert!(!animator.is_running());
    assert_eq!(host(&animator).offset, 300.0);
    assert_eq!(
        take(&log),
        ["prepare none -> voice", "start 0 -> 300", "end 300"]
    );
}

#[test]
fn test_unchanged_offset_is_immediate() {
    let mut fixture = TestHost::showing(voice(), 300.0);
    fixture.extents.insert(emoji(), 300.0);
    let (mut animator, log) = animator_with(fixture);

    animator.request_show(emoji());
    layout_with_fallback(&mut animator);

    assert!(!animator.is_running());
    assert_eq!(
        take(&log),
        ["prepare voice -> emoji", "start 300 -> 300", "end 300"]
    );
    // 离场视图在结束时移除
    assert_eq!(host(&animator).removed, vec![ViewId(1)]);
}

// ========== 修正 ==========

#[test]
fn test_platform_correction_splits_timeline() {
    let (mut animator, log) = animator_with(TestHost::new());

    animator.request_show(ime());
    animator.host_mut().unwrap().ime_extent = 200.0;
    animator.on_layout();
    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Start {
        duration_millis: 100,
    }));
    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Progress {
        fraction: 0.5,
    }));

    animator.host_mut().unwrap().ime_extent = 300.0;
    animator.on_host_offset_applied();
    // 屏幕上的偏移停在已到达的位置，新阶段从这里继续
    assert_eq!(host(&animator).offset, 100.0);
    let state = animator.active_state().unwrap();
    assert_eq!(animator.active_record().unwrap().driver(), Driver::Platform);
    assert_eq!(state.start_offset(), 100.0);
    assert_eq!(state.duration_millis(), 50);

    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Progress {
        fraction: 0.75,
    }));
    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::End));

    assert_eq!(
        take(&log),
        [
            "prepare none -> ime",
            "start 0 -> 200",
            "update 100",
            "end 200",
            "prepare none -> ime",
            "start 100 -> 300",
            "update 200",
            "update 300",
            "end 300",
        ]
    );
    assert_eq!(host(&animator).offset, 300.0);
}

#[test]
fn test_lower_correction_never_moves_backward() {
    let (mut animator, log) = animator_with(TestHost::new());

    animator.request_show(ime());
    animator.host_mut().unwrap().ime_extent = 400.0;
    animator.on_layout();
    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Start {
        duration_millis: 100,
    }));

    let mut offsets = Vec::new();
    for (index, fraction) in [0.5, 0.75, 1.0].into_iter().enumerate() {
        animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Progress {
            fraction,
        }));
        if index == 0 {
            animator.host_mut().unwrap().ime_extent = 300.0;
            animator.on_host_offset_applied();
        }
        offsets.push(host(&animator).offset);
    }
    animator.on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::End));

    assert_eq!(offsets, [200.0, 250.0, 300.0]);
    // 平台已报告进度 1，End 不再补发 update
    assert_eq!(
        take(&log),
        [
            "prepare none -> ime",
            "start 0 -> 400",
            "update 200",
            "end 400",
            "prepare none -> ime",
            "start 200 -> 300",
            "update 250",
            "update 300",
            "end 300",
        ]
    );
}

#[test]
fn test_fallback_correction_uses_remaining_duration() {
    let (mut animator, log) = animator_with(TestHost::new());

    animator.request_show(voice());
    layout_with_fallback(&mut animator);
    frames(&mut animator, 2);
    assert_eq!(host(&animator).offset, 150.0);

    animator.host_mut().unwrap().extents.insert(voice(), 360.0);
    animator.on_host_offset_applied();
    assert_eq!(host(&animator).offset, 150.0);
    assert_eq!(animator.active_record().unwrap().driver(), Driver::Fallback);
    assert_eq!(animator.active_state().unwrap().duration_millis(), 50);

    frames(&mut animator, 2);
    assert!(!animator.is_running());
    assert_eq!(host(&animator).offset, 360.0);
    assert!(host(&animator).removed.is_empty());
    assert_eq!(
        take(&log),
        [
            "prepare none -> voice",
            "start 0 -> 300",
            "update 75",
            "update 150",
            "end 300",
            "prepare none -> voice",
            "start 150 -> 360",
            "update 255",
            "update 360",
            "end 360",
        ]
    );
}

#[test]
fn test_navigation_bar_is_excluded_from_ime_target() {
    let mut fixture = TestHost::new();
    fixture.navigation_bar = 40.0;
    let (mut animator, log) = animator_with(fixture);

    animator.request_show(ime());
    animator.host_mut().unwrap().ime_extent = 340.0;
    layout_with_fallback(&mut animator);
    assert_eq!(take(&log), ["prepare none -> ime", "start 0 -> 300"]);
}

#[test]
fn test_idle_correction_record() {
    let (mut animator, log) = animator_with(TestHost::showing(voice(), 300.0));

    animator.on_host_offset_applied();
    assert!(!animator.is_running());

    animator.host_mut().unwrap().extents.insert(voice(), 360.0);
    animator.on_host_offset_applied();
    let handle = host(&animator).last_action();
    animator.on_before_frame(handle);

    assert_eq!(take(&log), ["prepare voice -> voice", "start 300 -> 360"]);
    frames(&mut animator, 4);
    assert_eq!(host(&animator).offset, 360.0);
    // 同一个视图不移除
    assert!(host(&animator).removed.is_empty());
}

#[test]
fn test_no_correction_while_change_is_pending() {
    let (mut animator, log) = animator_with(TestHost::showing(voice(), 300.0));

    animator.request_show(emoji());
    animator.host_mut().unwrap().extents.insert(voice(), 360.0);
    animator.on_host_offset_applied();
    assert!(!animator.is_running());
    assert!(animator.has_pending_change());
    assert!(take(&log).is_empty());
}

// ========== 软键盘可见性 ==========

#[test]
fn test_leaving_ime_waits_for_confirmation() {
    let (mut animator, log) = animator_with(TestHost::showing(ime(), 300.0));

    assert!(animator.request_show(voice()));
    assert_eq!(host(&animator).ime_requests, vec![false]);

    animator.on_layout();
    assert!(!animator.is_running());

    // 与目标不符的确认不解除等待
    animator.on_ime_visibility_changed(true);
    animator.on_layout();
    assert!(!animator.is_running());

    animator.host_mut().unwrap().ime_extent = 0.0;
    animator.on_ime_visibility_changed(false);
    layout_with_fallback(&mut animator);
    assert_eq!(take(&log), ["prepare ime -> voice", "start 300 -> 300", "end 300"]);
}

// ========== 拦截器 ==========

struct DenyEmoji;

impl AnimationInterceptor for DenyEmoji {
    fn on_intercept_change(&self, _: Option<&Editor>, current: Option<&Editor>) -> bool {
        current == Some(&emoji())
    }

    fn duration_millis(&self, _: Option<&Editor>, current: Option<&Editor>, duration: u64) -> u64 {
        if current == Some(&voice()) { 200 } else { duration }
    }
}

#[test]
fn test_interceptor_veto_and_duration() {
    let mut animator = EditorAnimator::new(linear_config()).with_interceptor(DenyEmoji);
    animator.attach(TestHost::new());

    assert!(!animator.request_show(emoji()));
    assert!(!animator.has_pending_change());
    assert_eq!(host(&animator).layout_requests, 0);

    assert!(animator.request_show(voice()));
    layout_with_fallback(&mut animator);
    assert_eq!(animator.active_state().unwrap().duration_millis(), 200);

    frames(&mut animator, 4);
    assert!(animator.is_running());
    frames(&mut animator, 4);
    assert!(!animator.is_running());
}

// ========== 通知顺序与重入 ==========

struct Tag {
    tag: &'static str,
    log: Log,
}

impl AnimationCallback for Tag {
    fn on_prepare(&mut self, _: Option<&Editor>, _: Option<&Editor>, _: &mut CallbackContext<'_>) {
        self.log.borrow_mut().push(format!("{} prepare", self.tag));
    }

    fn on_start(&mut self, _: &AnimationState, _: &mut CallbackContext<'_>) {
        self.log.borrow_mut().push(format!("{} start", self.tag));
    }
}

#[test]
fn test_reverse_registration_order() {
    let mut animator = EditorAnimator::new(linear_config());
    animator.attach(TestHost::new());
    let log = Log::default();
    animator.add_animation_callback(Tag { tag: "first", log: log.clone() });
    animator.add_animation_callback(Tag { tag: "second", log: log.clone() });

    animator.request_show(voice());
    layout_with_fallback(&mut animator);

    assert_eq!(
        take(&log),
        ["second prepare", "first prepare", "second start", "first start"]
    );
}

/// prepare 时注销自己并注册一个新回调
struct Handoff {
    id: Rc<Cell<Option<CallbackId>>>,
    log: Log,
}

impl AnimationCallback for Handoff {
    fn on_prepare(&mut self, _: Option<&Editor>, _: Option<&Editor>, cx: &mut CallbackContext<'_>) {
        self.log.borrow_mut().push("handoff prepare".to_string());
        if let Some(id) = self.id.get() {
            cx.remove_callback(id);
        }
        cx.add_callback(Tag {
            tag: "late",
            log: self.log.clone(),
        });
    }

    fn on_start(&mut self, _: &AnimationState, _: &mut CallbackContext<'_>) {
        self.log.borrow_mut().push("handoff start".to_string());
    }
}

#[test]
fn test_callbacks_can_change_registry_while_notified() {
    let mut animator = EditorAnimator::new(linear_config());
    animator.attach(TestHost::new());
    let log = Log::default();
    animator.add_animation_callback(Tag { tag: "first", log: log.clone() });
    let id = Rc::new(Cell::new(None));
    let handoff = animator.add_animation_callback(Handoff {
        id: id.clone(),
        log: log.clone(),
    });
    id.set(Some(handoff));

    animator.request_show(voice());
    layout_with_fallback(&mut animator);

    assert_eq!(
        take(&log),
        [
            "handoff prepare",
            "first prepare",
            "late start",
            "first start",
        ]
    );
    assert!(!animator.remove_animation_callback(handoff));
}

/// 结束时请求下一个面板
struct Chain;

impl AnimationCallback for Chain {
    fn on_end(&mut self, state: &AnimationState, cx: &mut CallbackContext<'_>) {
        if state.is_editor(&voice()) {
            cx.request_show(emoji());
        }
    }
}

#[test]
fn test_request_from_callback() {
    let (mut animator, log) = animator_with(TestHost::new());
    animator.add_animation_callback(Chain);

    animator.request_show(voice());
    layout_with_fallback(&mut animator);
    frames(&mut animator, 4);
    assert!(animator.has_pending_change());

    layout_with_fallback(&mut animator);
    let log = take(&log);
    assert_eq!(log.last().map(String::as_str), Some("start 300 -> 400"));
    assert!(log.contains(&"prepare voice -> emoji".to_string()));
}

/// 把偏移推到最大值
struct Overshoot;

impl AnimationCallback for Overshoot {
    fn on_update(&mut self, state: &AnimationState, _: &mut CallbackContext<'_>) {
        state.update_editor_offset(10_000.0);
    }
}

#[test]
fn test_offset_escape_hatch_is_clamped() {
    let (mut animator, _log) = animator_with(TestHost::new());
    animator.add_animation_callback(Overshoot);

    animator.request_show(voice());
    layout_with_fallback(&mut animator);
    frames(&mut animator, 1);
    assert_eq!(host(&animator).offset, 300.0);
    // 记录自己的偏移不受影响
    assert_eq!(animator.active_state().unwrap().current_offset(), 75.0);
}

// ========== 解除关联 ==========

#[test]
fn test_detach_ends_record() {
    let (mut animator, log) = animator_with(TestHost::new());

    animator.request_show(voice());
    layout_with_fallback(&mut animator);
    frames(&mut animator, 1);
    take(&log);

    let detached = animator.detach().unwrap();
    assert_eq!(take(&log), ["end 75"]);
    assert!(!animator.is_running());
    assert!(!detached.offset_listener);
    assert!(!animator.request_show(emoji()));
}

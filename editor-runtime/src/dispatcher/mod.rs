//! # Dispatcher 模块
//!
//! 面板切换动画引擎的协调点。
//!
//! ## 执行模型
//!
//! ```text
//! request_show/hide ──► PendingChangeBuffer
//!                              │ on_layout()
//!                              ▼
//!                       AnimationRecord ── prepare
//!                              │
//!          ┌───────────────────┴───────────────────┐
//!   平台先开始动画                          绘制前回调先触发
//!   on_platform_animation(Start)            on_before_frame(handle)
//!   驱动器 = Platform                        驱动器 = Fallback
//!          └───────────────────┬───────────────────┘
//!                              ▼
//!                    start → update* → end
//! ```
//!
//! 任意时刻最多只有一条记录：创建新记录前，旧记录会先同步走完 end 通知。

use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::animation::{
    AnimationRecord, AnimationState, Driver, Interpolator, RecordId, TransitionOffsets,
    offsets_equal,
};
use crate::callback::{
    AnimationCallback, CallbackContext, CallbackId, CallbackRegistry, ContextRequest,
};
use crate::capability::TimingOverrideProbe;
use crate::config::EngineConfig;
use crate::editor::{Editor, display_editor};
use crate::host::{FrameActionHandle, Host, InsetsKind, PlatformAnimationEvent, PlatformPhase};
use crate::interceptor::AnimationInterceptor;
use crate::pending::PendingChangeBuffer;

/// 记录的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finish {
    /// 驱动器走完：偏移到终点，尚未到终点时补发一次 update
    Complete,
    /// 强制结束：停在已到达的偏移
    Interrupt,
    /// 起止相同或禁用动画：start 之后直接 end
    Immediate,
    /// 目标偏移中途变化：记录推到旧终点，Host 偏移保持不变
    Split,
}

/// 一次通知
#[derive(Clone, Copy)]
enum Notification<'a> {
    Prepare(Option<&'a Editor>, Option<&'a Editor>),
    Start(&'a AnimationState),
    Update(&'a AnimationState),
    End(&'a AnimationState),
}

impl<'a> Notification<'a> {
    fn state(&self) -> Option<&'a AnimationState> {
        match *self {
            Notification::Prepare(..) => None,
            Notification::Start(state)
            | Notification::Update(state)
            | Notification::End(state) => Some(state),
        }
    }
}

/// 面板切换动画引擎
///
/// 持有 Host，接收 Host 送回的布局、绘制前回调、平台动画、偏移提交与逐帧事件，
/// 维护唯一的动画记录并按"后注册先通知"的顺序通知回调。
///
/// 没有 Host 时所有入口方法都不做任何事。
///
/// # 使用示例
///
/// ```ignore
/// let mut animator = EditorAnimator::new(EngineConfig::default());
/// animator.attach(host);
/// animator.add_animation_callback(MyCallback);
///
/// animator.request_show(Editor::new("voice"));
///
/// // UI 循环
/// animator.on_layout();
/// animator.on_before_frame(handle);
/// animator.on_animation_frame(Duration::from_millis(16));
/// ```
pub struct EditorAnimator<H: Host> {
    host: Option<H>,
    config: EngineConfig,
    pending: PendingChangeBuffer,
    record: Option<AnimationRecord>,
    callbacks: CallbackRegistry,
    interceptor: Option<Box<dyn AnimationInterceptor>>,
    timing_override: Option<Rc<TimingOverrideProbe>>,
    next_record_id: u64,
}

impl<H: Host> std::fmt::Debug for EditorAnimator<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorAnimator")
            .field("attached", &self.host.is_some())
            .field("config", &self.config)
            .field("pending", &self.pending)
            .field("record", &self.record)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl<H: Host> EditorAnimator<H> {
    /// 创建引擎（尚未关联 Host）
    pub fn new(config: EngineConfig) -> Self {
        Self {
            host: None,
            config,
            pending: PendingChangeBuffer::new(),
            record: None,
            callbacks: CallbackRegistry::default(),
            interceptor: None,
            timing_override: None,
            next_record_id: 1,
        }
    }

    /// 设置拦截器
    pub fn with_interceptor(mut self, interceptor: impl AnimationInterceptor + 'static) -> Self {
        self.interceptor = Some(Box::new(interceptor));
        self
    }

    /// 替换拦截器
    pub fn set_interceptor(&mut self, interceptor: Option<Box<dyn AnimationInterceptor>>) {
        self.interceptor = interceptor;
    }

    /// 注入平台动画覆盖能力
    pub fn set_timing_override(&mut self, probe: Rc<TimingOverrideProbe>) {
        self.timing_override = Some(probe);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.host.as_mut()
    }

    // ========== Host 关联 ==========

    /// 关联 Host，并注册偏移提交与平台动画监听
    ///
    /// # 返回
    /// 之前关联的 Host（已先解除关联）
    pub fn attach(&mut self, mut host: H) -> Option<H> {
        let previous = self.detach();
        host.set_offset_applied_listener(true);
        host.set_platform_animation_listener(Some(self.config.platform_timing()));
        debug!("关联 Host");
        self.host = Some(host);
        previous
    }

    /// 解除关联
    ///
    /// 进行中的记录会被强制结束，未消费的意图被丢弃。
    pub fn detach(&mut self) -> Option<H> {
        self.host.as_ref()?;
        self.finish_record(Finish::Interrupt, true);
        self.pending.clear();
        let mut host = self.host.take()?;
        host.set_offset_applied_listener(false);
        host.set_platform_animation_listener(None);
        debug!("解除 Host 关联");
        Some(host)
    }

    // ========== 回调 ==========

    /// 注册动画回调
    pub fn add_animation_callback(
        &mut self,
        callback: impl AnimationCallback + 'static,
    ) -> CallbackId {
        self.callbacks.add(Box::new(callback))
    }

    /// 注销动画回调
    pub fn remove_animation_callback(&mut self, id: CallbackId) -> bool {
        self.callbacks.remove(id)
    }

    // ========== 查询 ==========

    /// 是否有进行中的记录
    pub fn is_running(&self) -> bool {
        self.record.is_some()
    }

    /// 活跃记录的状态快照（偏移未设置时为 `None`）
    pub fn active_state(&self) -> Option<AnimationState> {
        self.record.as_ref().and_then(AnimationRecord::state)
    }

    /// 活跃记录
    pub fn active_record(&self) -> Option<&AnimationRecord> {
        self.record.as_ref()
    }

    /// 是否有尚未在布局中完成的变更
    pub fn has_pending_change(&self) -> bool {
        self.pending.is_pending() || self.host.as_ref().is_some_and(Host::has_pending_change)
    }

    // ========== 切换请求 ==========

    /// 请求显示面板
    ///
    /// # 返回
    /// - `true`: 意图已写入缓冲
    /// - `false`: 没有 Host、目标与当前相同、或被拦截器拒绝
    pub fn request_show(&mut self, editor: Editor) -> bool {
        self.request_change(Some(editor))
    }

    /// 请求隐藏当前面板
    pub fn request_hide(&mut self) -> bool {
        self.request_change(None)
    }

    fn request_change(&mut self, current: Option<Editor>) -> bool {
        let Some(host) = self.host.as_mut() else {
            return false;
        };
        let ime = host.ime().clone();
        let destination = match self.pending.intent() {
            Some(intent) => intent.current.clone(),
            None => host.current_editor().cloned(),
        };
        if destination == current {
            trace!(current = display_editor(current.as_ref()), "目标与当前相同，忽略");
            return false;
        }
        if let Some(interceptor) = self.interceptor.as_ref() {
            if interceptor.on_intercept_change(destination.as_ref(), current.as_ref()) {
                debug!(
                    previous = display_editor(destination.as_ref()),
                    current = display_editor(current.as_ref()),
                    "切换被拦截"
                );
                return false;
            }
        }

        let previous = host.current_editor().cloned();
        self.pending.request_change(previous, current.clone(), &ime);

        if current.as_ref() == Some(&ime) {
            host.request_ime_visibility(true);
        } else if destination.as_ref() == Some(&ime) {
            host.request_ime_visibility(false);
        }
        host.request_layout();
        true
    }

    /// 平台确认软键盘可见性
    pub fn on_ime_visibility_changed(&mut self, shown: bool) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        let ime = host.ime().clone();
        if self.pending.confirm_ime_visibility(shown, &ime) {
            host.request_layout();
        }
    }

    // ========== Host 事件 ==========

    /// 布局：消费待处理变更，完成视图切换并创建记录
    pub fn on_layout(&mut self) {
        if self.host.is_none() {
            return;
        }
        let Some(change) = self.pending.consume() else {
            return;
        };
        if change.is_noop() {
            debug!(
                editor = display_editor(change.current.as_ref()),
                "合并后首尾相同，不切换"
            );
            return;
        }

        self.finish_record(Finish::Interrupt, true);

        if let Some(host) = self.host.as_mut() {
            host.realize_change(change.previous.as_ref(), change.current.as_ref());
        }
        self.begin_record(change.previous, change.current);
    }

    /// 绘制前回调：平台没有抢先接管时启动兜底驱动器
    pub fn on_before_frame(&mut self, handle: FrameActionHandle) {
        let Some(record) = self.record.as_mut() else {
            trace!(handle = handle.0, "没有活跃记录，忽略绘制前回调");
            return;
        };
        if !record.is_armed_with(handle) {
            trace!(handle = handle.0, "过期的绘制前回调");
            return;
        }
        record.take_armed_action();
        if !record.attach_driver(Driver::Fallback) {
            return;
        }
        debug!(record = record.id().0, "平台未接管，启动兜底驱动器");
        self.start_record();
    }

    /// 兜底驱动器逐帧推进
    pub fn on_animation_frame(&mut self, dt: Duration) {
        let Some(record) = self.record.as_mut() else {
            return;
        };
        let Some(raw) = record.advance_fallback(dt) else {
            return;
        };
        if raw >= 1.0 {
            self.finish_record(Finish::Complete, true);
        } else {
            self.apply_fraction(raw);
        }
    }

    /// 平台动画生命周期（只处理软键盘）
    pub fn on_platform_animation(&mut self, event: PlatformAnimationEvent) {
        if event.kind != InsetsKind::Ime {
            return;
        }
        let (Some(host), Some(record)) = (self.host.as_mut(), self.record.as_mut()) else {
            return;
        };

        match event.phase {
            PlatformPhase::Prepare => {
                trace!(record = record.id().0, "平台准备软键盘动画");
            }
            PlatformPhase::Start { duration_millis } => {
                if !record.involves(host.ime()) {
                    return;
                }
                if !record.attach_driver(Driver::Platform) {
                    debug!(
                        record = record.id().0,
                        driver = ?record.driver(),
                        "已有驱动器，忽略平台动画开始"
                    );
                    return;
                }
                if let Some(handle) = record.take_armed_action() {
                    host.cancel_before_frame_action(handle);
                }
                record.set_platform_origin(0.0);

                let overridden = self.timing_override.as_ref().is_some_and(|probe| {
                    probe.try_override_timing(record.duration_millis(), record.interpolator())
                });
                if !overridden {
                    record.set_timing(duration_millis, record.interpolator());
                }
                debug!(
                    record = record.id().0,
                    duration_millis = record.duration_millis(),
                    overridden,
                    "平台接管动画"
                );
                self.start_record();
            }
            PlatformPhase::Progress { fraction } => {
                if record.driver() != Driver::Platform || !record.phase().is_running() {
                    return;
                }
                let raw = record.map_platform_fraction(fraction);
                self.apply_fraction(raw);
            }
            PlatformPhase::End => {
                if record.driver() != Driver::Platform || !record.phase().is_running() {
                    return;
                }
                self.finish_record(Finish::Complete, true);
            }
        }
    }

    /// Host 提交了偏移测量
    ///
    /// 目标偏移在过渡中途发生变化（例如软键盘高度被修正）时拆分过渡；
    /// 空闲时偏移与目标不一致则创建修正记录。
    pub fn on_host_offset_applied(&mut self) {
        let Some(host) = self.host.as_ref() else {
            return;
        };
        if self.pending.is_pending() || host.has_pending_change() {
            return;
        }

        match self.record.as_ref() {
            Some(record) => {
                if !record.phase().is_running() {
                    return;
                }
                let Some(offsets) = record.offsets() else {
                    return;
                };
                let target = host.target_offset(record.current());
                if !offsets_equal(target, offsets.end()) {
                    debug!(
                        record = record.id().0,
                        end = offsets.end(),
                        target,
                        "目标偏移变化，拆分过渡"
                    );
                    self.split_record();
                }
            }
            None => {
                let current = host.current_editor().cloned();
                let target = host.target_offset(current.as_ref());
                let applied = host.current_offset();
                if !offsets_equal(target, applied) {
                    debug!(
                        editor = display_editor(current.as_ref()),
                        applied, target, "偏移与目标不一致，创建修正记录"
                    );
                    self.begin_record(current.clone(), current);
                }
            }
        }
    }

    /// 强制结束进行中的记录
    pub fn end_animation(&mut self) {
        self.finish_record(Finish::Interrupt, true);
    }

    // ========== 记录生命周期 ==========

    fn next_record_id(&mut self) -> RecordId {
        let id = RecordId(self.next_record_id);
        self.next_record_id += 1;
        id
    }

    fn resolve_timing(
        &self,
        previous: Option<&Editor>,
        current: Option<&Editor>,
    ) -> (u64, Interpolator) {
        let duration_millis = self.config.duration_millis;
        let interpolator = self.config.interpolator;
        match self.interceptor.as_ref() {
            Some(interceptor) => (
                interceptor.duration_millis(previous, current, duration_millis),
                interceptor.interpolator(previous, current, interpolator),
            ),
            None => (duration_millis, interpolator),
        }
    }

    /// 创建记录、武装兜底竞争并通知 prepare
    fn begin_record(&mut self, previous: Option<Editor>, current: Option<Editor>) {
        let (duration_millis, interpolator) =
            self.resolve_timing(previous.as_ref(), current.as_ref());
        let id = self.next_record_id();
        let Some(host) = self.host.as_mut() else {
            return;
        };

        let start_view = previous.as_ref().and_then(|editor| host.view_of(editor));
        let end_view = current.as_ref().and_then(|editor| host.view_of(editor));
        let mut record = AnimationRecord::new(
            id,
            previous.clone(),
            current.clone(),
            duration_millis,
            interpolator,
        )
        .with_views(start_view, end_view);
        record.prepare();
        record.arm(host.add_before_frame_action());

        debug!(
            record = id.0,
            previous = display_editor(previous.as_ref()),
            current = display_editor(current.as_ref()),
            duration_millis,
            "创建动画记录"
        );
        self.record = Some(record);
        self.notify(Notification::Prepare(previous.as_ref(), current.as_ref()));
    }

    /// Prepared → Started，起止相同或禁用动画时直接结束
    fn start_record(&mut self) {
        let animation_enabled = self.config.animation_enabled;
        let (Some(host), Some(record)) = (self.host.as_mut(), self.record.as_mut()) else {
            return;
        };

        let offsets = TransitionOffsets::new(
            host.current_offset(),
            host.target_offset(record.current()),
        );
        if !record.start(offsets) {
            return;
        }
        let immediate = offsets.is_unchanged() || !animation_enabled;
        if immediate {
            record.finish_immediately();
            host.update_editor_offset(offsets.end());
        }
        debug!(
            record = record.id().0,
            driver = ?record.driver(),
            start = offsets.start(),
            end = offsets.end(),
            immediate,
            "开始过渡"
        );

        let Some(state) = record.state() else {
            return;
        };
        let id = record.id();
        self.notify(Notification::Start(&state));

        if immediate && self.is_active(id) {
            self.finish_record(Finish::Immediate, true);
        }
    }

    /// 用原始进度更新记录并通知
    fn apply_fraction(&mut self, raw: f32) {
        let (Some(host), Some(record)) = (self.host.as_mut(), self.record.as_mut()) else {
            return;
        };
        let Some(offset) = record.update(raw) else {
            return;
        };
        host.update_editor_offset(offset);
        trace!(
            record = record.id().0,
            fraction = raw,
            offset,
            "更新过渡"
        );

        if let Some(state) = record.state() {
            self.notify(Notification::Update(&state));
        }
    }

    /// 结束活跃记录：通知 end，释放离场视图，清空槽位
    fn finish_record(&mut self, finish: Finish, release_views: bool) {
        let Some(record) = self.record.as_mut() else {
            return;
        };
        let applied = self.host.as_ref().map_or(0.0, Host::current_offset);

        let mut final_update = None;
        match finish {
            Finish::Complete => {
                let catch_up = record.phase().is_running() && !record.is_at_end();
                record.complete();
                if let (Some(host), Some(offsets)) = (self.host.as_mut(), record.offsets()) {
                    host.update_editor_offset(offsets.end());
                }
                if catch_up {
                    final_update = record.state();
                }
            }
            // 立即完成时 start_record 已经把 Host 偏移写到终点
            Finish::Immediate | Finish::Split => record.complete(),
            Finish::Interrupt => record.interrupt(applied),
        }
        if let Some(handle) = record.take_armed_action() {
            if let Some(host) = self.host.as_mut() {
                host.cancel_before_frame_action(handle);
            }
        }
        record.mark_ended();
        let id = record.id();
        let end_state = record.state();

        if let Some(state) = final_update {
            self.notify(Notification::Update(&state));
        }
        if let Some(state) = end_state {
            debug!(
                record = id.0,
                ?finish,
                end = state.end_offset(),
                "结束过渡"
            );
            self.notify(Notification::End(&state));
        }

        if !self.is_active(id) {
            return;
        }
        let Some(record) = self.record.take() else {
            return;
        };
        if release_views {
            if let (Some(host), Some(view)) = (self.host.as_mut(), record.start_view()) {
                if record.end_view() != Some(view) {
                    host.remove_view(view);
                }
            }
        }
    }

    /// 目标偏移中途变化：拆成两段
    ///
    /// 旧记录在旧终点通知 end，但不改动 Host 偏移；新记录从屏幕上已到达的偏移
    /// 开始，沿用同一个驱动器走完剩余时长，所以屏幕上的偏移不会跳变。
    fn split_record(&mut self) {
        let Some(record) = self.record.as_ref() else {
            return;
        };
        let previous = record.previous().cloned();
        let current = record.current().cloned();
        let views = (record.start_view(), record.end_view());
        let driver = record.driver();
        let interpolator = record.interpolator();
        let platform_raw = record.platform_raw();
        let duration_millis = record.remaining_millis();

        self.finish_record(Finish::Split, false);
        if self.record.is_some() {
            return;
        }

        let id = self.next_record_id();
        let mut record = AnimationRecord::new(
            id,
            previous.clone(),
            current.clone(),
            duration_millis,
            interpolator,
        )
        .with_views(views.0, views.1);
        record.prepare();
        record.attach_driver(driver);
        if driver == Driver::Platform {
            record.set_platform_origin(platform_raw);
        }
        debug!(record = id.0, ?driver, duration_millis, "修正阶段");
        self.record = Some(record);

        self.notify(Notification::Prepare(previous.as_ref(), current.as_ref()));
        if self.is_active(id) {
            self.start_record();
        }
    }

    fn is_active(&self, id: RecordId) -> bool {
        self.record.as_ref().is_some_and(|record| record.id() == id)
    }

    // ========== 通知 ==========

    /// 按"后注册先通知"的顺序通知回调
    ///
    /// 每个回调返回后立即应用它的偏移修改与上下文请求。
    fn notify(&mut self, notification: Notification<'_>) {
        for id in self.callbacks.snapshot() {
            let Some(mut callback) = self.callbacks.take(id) else {
                continue;
            };
            let mut cx = CallbackContext::new(self.callbacks.id_counter());
            match notification {
                Notification::Prepare(previous, current) => {
                    callback.on_prepare(previous, current, &mut cx)
                }
                Notification::Start(state) => callback.on_start(state, &mut cx),
                Notification::Update(state) => callback.on_update(state, &mut cx),
                Notification::End(state) => callback.on_end(state, &mut cx),
            }
            let requests = cx.into_requests();
            self.callbacks.restore(id, callback);

            if let Some(offset) = notification.state().and_then(AnimationState::take_offset_request)
            {
                if let Some(host) = self.host.as_mut() {
                    host.update_editor_offset(offset);
                }
            }
            self.apply_requests(requests);
        }
    }

    fn apply_requests(&mut self, requests: Vec<ContextRequest>) {
        for request in requests {
            match request {
                ContextRequest::Show(editor) => {
                    self.request_show(editor);
                }
                ContextRequest::Hide => {
                    self.request_hide();
                }
                ContextRequest::AddCallback(id, callback) => self.callbacks.insert(id, callback),
                ContextRequest::RemoveCallback(id) => {
                    self.callbacks.remove(id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;

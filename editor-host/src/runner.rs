//! # Runner 模块
//!
//! 扮演 UI 线程：每一帧按固定顺序把宿主积累的事件送回引擎。
//!
//! ## 单帧顺序
//!
//! ```text
//! 1. 软键盘可见性确认（平台开始软键盘动画时先发 Prepare）
//! 2. 布局
//! 3. 平台软键盘动画 Start
//! 4. 绘制前回调
//! 5. 平台软键盘动画 Progress / End
//! 6. 偏移提交
//! 7. 兜底驱动器推进一帧
//! ```
//!
//! 平台动画在绘制前回调之前开始，所以有平台动画时总是平台赢得竞争。

use std::time::Duration;

use editor_runtime::{
    AnimationCallback, CallbackId, Editor, EditorAnimator, Host, PlatformAnimationEvent,
    PlatformPhase,
};
use tracing::{debug, trace};

use crate::config::HostConfig;
use crate::headless::HeadlessHost;
use crate::journal::Journal;

/// 模拟中的平台软键盘动画
#[derive(Debug, Clone)]
struct PlatformAnimation {
    duration: Duration,
    elapsed: Duration,
    started: bool,
    /// 第一帧之后修正为的软键盘高度
    correction: Option<f32>,
}

impl PlatformAnimation {
    fn fraction(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// 无界面帧循环
#[derive(Debug)]
pub struct HeadlessRunner {
    config: HostConfig,
    animator: EditorAnimator<HeadlessHost>,
    journal: Journal,
    platform: Option<PlatformAnimation>,
    frames: u64,
}

impl HeadlessRunner {
    /// 创建运行器：构造容器、关联引擎并注册通知记录
    pub fn new(config: HostConfig) -> Self {
        let mut animator = EditorAnimator::new(config.engine.clone());
        animator.attach(HeadlessHost::new(&config));
        let journal = Journal::new();
        animator.add_animation_callback(journal.callback());
        Self {
            config,
            animator,
            journal,
            platform: None,
            frames: 0,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn animator(&self) -> &EditorAnimator<HeadlessHost> {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut EditorAnimator<HeadlessHost> {
        &mut self.animator
    }

    /// 容器（引擎已解除关联时为 `None`）
    pub fn host(&self) -> Option<&HeadlessHost> {
        self.animator.host()
    }

    /// 通知记录
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// 已运行的帧数
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// 已提交的偏移
    pub fn offset(&self) -> f32 {
        self.host().map_or(0.0, HeadlessHost::offset)
    }

    /// 当前面板名称
    pub fn current_editor(&self) -> Option<&str> {
        self.host()
            .and_then(|host| host.current_editor())
            .map(Editor::name)
    }

    pub fn add_callback(&mut self, callback: impl AnimationCallback + 'static) -> CallbackId {
        self.animator.add_animation_callback(callback)
    }

    // ========== 请求 ==========

    /// 请求显示面板（名称为软键盘名称时显示软键盘）
    pub fn request_show(&mut self, name: &str) -> bool {
        self.animator.request_show(Editor::new(name))
    }

    pub fn request_hide(&mut self) -> bool {
        self.animator.request_hide()
    }

    // ========== 帧循环 ==========

    /// 运行一帧
    pub fn step(&mut self) {
        self.frames += 1;
        let frame = self.config.frame_interval();
        trace!(frame = self.frames, "开始一帧");

        let ime_request = self
            .animator
            .host_mut()
            .and_then(HeadlessHost::take_ime_request);
        if let Some(visible) = ime_request {
            self.apply_ime_request(visible);
        }

        let layout = self
            .animator
            .host_mut()
            .is_some_and(HeadlessHost::take_layout_request);
        if layout {
            self.animator.on_layout();
        }

        self.start_platform_animation();

        let actions = self
            .animator
            .host_mut()
            .map(HeadlessHost::take_actions)
            .unwrap_or_default();
        for handle in actions {
            self.animator.on_before_frame(handle);
        }

        self.advance_platform_animation(frame);
        self.animator.on_host_offset_applied();
        self.animator.on_animation_frame(frame);
    }

    /// 运行 `count` 帧
    pub fn run_frames(&mut self, count: usize) {
        for _ in 0..count {
            self.step();
        }
    }

    /// 运行到没有进行中的过渡与待处理的事件为止
    ///
    /// # 返回
    /// 本次运行的帧数（最多 `max_frames`）
    pub fn run_until_idle(&mut self, max_frames: usize) -> usize {
        let mut count = 0;
        while count < max_frames && !self.is_idle() {
            self.step();
            count += 1;
        }
        count
    }

    /// 引擎与模拟平台都没有剩余工作
    pub fn is_idle(&self) -> bool {
        !self.animator.is_running()
            && !self.animator.has_pending_change()
            && self.platform.is_none()
            && !self.host().is_some_and(HeadlessHost::has_queued_work)
    }

    // ========== 平台软键盘模拟 ==========

    fn apply_ime_request(&mut self, visible: bool) {
        let sim = &self.config.platform;
        let target = if visible { self.config.ime_height } else { 0.0 };
        let Some(host) = self.animator.host_mut() else {
            return;
        };

        if host.is_ime_visible() == visible {
            self.animator.on_ime_visibility_changed(visible);
            return;
        }
        host.set_ime_visible(visible);

        let listener = host.platform_listener();
        let mut prepared = false;
        match listener {
            Some(timing) if sim.delivers_callbacks => {
                let reported = match sim.first_report {
                    Some(first) if visible => first,
                    _ => target,
                };
                host.set_ime_extent(reported);
                let duration_millis = timing.duration_millis.unwrap_or(sim.duration_millis);
                debug!(visible, reported, duration_millis, "平台开始软键盘动画");
                self.platform = Some(PlatformAnimation {
                    duration: Duration::from_millis(duration_millis),
                    elapsed: Duration::ZERO,
                    started: false,
                    correction: (reported != target).then_some(target),
                });
                prepared = true;
            }
            _ => {
                debug!(visible, "软键盘高度直接生效");
                host.set_ime_extent(target);
                self.platform = None;
            }
        }

        if prepared {
            self.animator
                .on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Prepare));
        }
        self.animator.on_ime_visibility_changed(visible);
    }

    fn start_platform_animation(&mut self) {
        let Some(platform) = self.platform.as_mut() else {
            return;
        };
        if platform.started {
            return;
        }
        platform.started = true;
        let duration_millis = platform.duration.as_millis() as u64;
        self.animator
            .on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Start {
                duration_millis,
            }));
    }

    fn advance_platform_animation(&mut self, frame: Duration) {
        let Some(platform) = self.platform.as_mut() else {
            return;
        };
        if !platform.started {
            return;
        }
        platform.elapsed = (platform.elapsed + frame).min(platform.duration);
        let fraction = platform.fraction();
        let correction = platform.correction.take();

        self.animator
            .on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::Progress {
                fraction,
            }));
        if let (Some(extent), Some(host)) = (correction, self.animator.host_mut()) {
            debug!(extent, "平台修正软键盘高度");
            host.set_ime_extent(extent);
        }
        if fraction >= 1.0 {
            self.platform = None;
            self.animator
                .on_platform_animation(PlatformAnimationEvent::ime(PlatformPhase::End));
        }
    }
}

//! # Host 模块
//!
//! 引擎对宿主（面板容器）的最小依赖。
//!
//! ## 通信方式
//!
//! 引擎持有 Host，通过 [`Host`] trait 读取状态、发出请求；
//! Host 侧发生的事件（布局、绘制前回调、平台动画、偏移提交）
//! 由 Host 所在的 UI 循环调用 [`EditorAnimator`](crate::EditorAnimator) 的入口方法送回：
//!
//! ```text
//! UI 循环                              EditorAnimator
//!   │                                       │
//!   │──── on_layout() ─────────────────────►│ consume pending → realize_change
//!   │──── on_before_frame(handle) ─────────►│ 兜底驱动器竞争
//!   │──── on_platform_animation(event) ────►│ 平台驱动器
//!   │──── on_host_offset_applied() ────────►│ 中途修正
//!   │──── on_animation_frame(dt) ──────────►│ 兜底驱动器逐帧
//! ```

use crate::animation::Interpolator;
use crate::editor::Editor;

/// 面板视图句柄
///
/// 由 Host 分配，引擎只用来比较与回传。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

/// 绘制前回调句柄
///
/// Host 在下一帧绘制前调用 `EditorAnimator::on_before_frame(handle)`，
/// 已取消的句柄不应再回调；即使回调了，引擎也会当作过期句柄忽略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameActionHandle(pub u64);

/// 平台动画时长/插值提示
///
/// 注册平台动画监听时一并传给 Host，Host 可以尽力而为地使用。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformTiming {
    /// 期望时长（毫秒）
    pub duration_millis: Option<u64>,
    /// 期望插值曲线
    pub interpolator: Option<Interpolator>,
}

/// 平台动画所属的 inset 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsetsKind {
    /// 软键盘
    Ime,
    /// 状态栏/导航栏
    SystemBars,
    /// 其它
    Other,
}

/// 平台动画生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformPhase {
    /// 平台准备动画
    Prepare,
    /// 平台开始动画
    Start {
        /// 平台动画时长（毫秒）
        duration_millis: u64,
    },
    /// 平台动画进度
    Progress {
        /// 原始进度（0.0 - 1.0）
        fraction: f32,
    },
    /// 平台动画结束
    End,
}

/// 平台动画事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformAnimationEvent {
    /// inset 类型，引擎只处理 [`InsetsKind::Ime`]
    pub kind: InsetsKind,
    /// 阶段
    pub phase: PlatformPhase,
}

impl PlatformAnimationEvent {
    /// 创建软键盘动画事件
    pub fn ime(phase: PlatformPhase) -> Self {
        Self {
            kind: InsetsKind::Ime,
            phase,
        }
    }
}

/// 宿主契约
///
/// 由具体的面板容器实现一次。所有方法都在 UI 线程上同步调用。
pub trait Host {
    /// 软键盘对应的面板标识
    fn ime(&self) -> &Editor;

    /// 当前面板（`None` 表示没有面板）
    ///
    /// 请求切换时它就是过渡的上一个面板。
    fn current_editor(&self) -> Option<&Editor>;

    /// 面板当前挂载的视图
    fn view_of(&self, editor: &Editor) -> Option<ViewId>;

    /// 当前已应用的偏移
    fn current_offset(&self) -> f32;

    /// 导航栏占据的偏移
    fn navigation_bar_offset(&self) -> f32;

    /// 平台报告的软键盘高度（包含导航栏部分）
    fn ime_extent(&self) -> f32;

    /// 面板测量后的高度
    fn editor_extent(&self, editor: &Editor) -> f32;

    /// 应用偏移
    fn update_editor_offset(&mut self, offset: f32);

    /// 移除视图
    fn remove_view(&mut self, view: ViewId);

    /// 完成视图切换
    ///
    /// 创建/挂载 `current` 的视图；`previous` 的视图保持挂载，
    /// 由引擎在过渡结束时通过 [`Host::remove_view`] 移除。
    fn realize_change(&mut self, previous: Option<&Editor>, current: Option<&Editor>);

    /// 请求一次布局
    fn request_layout(&mut self);

    /// 请求平台显示或隐藏软键盘
    ///
    /// 平台确认后，Host 调用 `EditorAnimator::on_ime_visibility_changed`。
    fn request_ime_visibility(&mut self, visible: bool);

    /// 注册下一帧绘制前的一次性回调
    fn add_before_frame_action(&mut self) -> FrameActionHandle;

    /// 取消绘制前回调
    fn cancel_before_frame_action(&mut self, handle: FrameActionHandle);

    /// 开启/关闭"偏移已提交"通知
    fn set_offset_applied_listener(&mut self, enabled: bool);

    /// 开启/关闭平台动画生命周期通知
    fn set_platform_animation_listener(&mut self, timing: Option<PlatformTiming>);

    /// Host 侧是否还有未完成的变更
    fn has_pending_change(&self) -> bool {
        false
    }

    /// 面板的目标偏移
    ///
    /// 软键盘取平台报告的高度（扣除导航栏），其它面板取测量高度，`None` 为 0。
    fn target_offset(&self, editor: Option<&Editor>) -> f32 {
        match editor {
            None => 0.0,
            Some(editor) if editor == self.ime() => {
                (self.ime_extent() - self.navigation_bar_offset()).max(0.0)
            }
            Some(editor) => self.editor_extent(editor).max(0.0),
        }
    }
}

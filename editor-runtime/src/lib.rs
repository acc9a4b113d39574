//! # Editor Runtime
//!
//! 底部面板（软键盘、语音、表情等互斥面板）切换动画引擎。
//!
//! ## 架构概述
//!
//! `editor-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它通过 [`Host`] trait 与面板容器通信，所有工作都在 UI 线程上同步完成：
//!
//! ```text
//! Host (UI 循环)                    EditorAnimator
//!   │                                    │
//!   │──── request_show / request_hide ──►│ PendingChangeBuffer
//!   │──── on_layout ────────────────────►│ 创建 AnimationRecord
//!   │──── on_before_frame / platform ───►│ 驱动器竞争
//!   │──── on_animation_frame ───────────►│ 逐帧更新
//!   │◄─── update_editor_offset ──────────│
//! ```
//!
//! ## 核心类型
//!
//! - [`EditorAnimator`]：引擎与通知分发
//! - [`PendingChangeBuffer`]：单槽合并缓冲
//! - [`AnimationRecord`]：单次过渡的状态机
//! - [`AnimationCallback`] / [`AnimationState`]：回调契约
//! - [`AnimationInterceptor`]：拦截策略
//!
//! ## 模块结构
//!
//! - [`animation`]：偏移/进度、插值、时间轴、记录
//! - [`host`]：宿主契约
//! - [`pending`]：待处理变更缓冲
//! - [`callback`]：回调与回调上下文
//! - [`interceptor`]：拦截器
//! - [`capability`]：平台动画覆盖能力
//! - [`dispatcher`]：引擎
//! - [`config`] / [`error`]：配置与错误

pub mod animation;
pub mod callback;
pub mod capability;
pub mod config;
pub mod dispatcher;
pub mod editor;
pub mod error;
pub mod host;
pub mod interceptor;
pub mod pending;

// 重导出核心类型
pub use animation::{
    AnimationRecord, AnimationState, Driver, FallbackTimeline, Fraction, Interpolator, RecordId,
    RecordPhase, TransitionOffsets,
};
pub use callback::{AnimationCallback, CallbackContext, CallbackId};
pub use capability::{TimingOverride, TimingOverrideProbe};
pub use config::EngineConfig;
pub use dispatcher::EditorAnimator;
pub use editor::Editor;
pub use error::{ConfigError, ConfigResult};
pub use host::{
    FrameActionHandle, Host, InsetsKind, PlatformAnimationEvent, PlatformPhase, PlatformTiming,
    ViewId,
};
pub use interceptor::{AnimationInterceptor, AnimationInterceptorExt, CombinedInterceptor};
pub use pending::{PendingChange, PendingChangeBuffer, TransitionIntent};

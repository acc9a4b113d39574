//! # Editor Host
//!
//! `editor-runtime` 的无界面宿主：实现一次 [`Host`](editor_runtime::Host) 契约，
//! 并用一个帧循环扮演 UI 线程。
//!
//! ## 模块结构
//!
//! - [`config`]：宿主配置（面板高度、软键盘、平台动画模拟）
//! - [`headless`]：面板容器 [`HeadlessHost`]
//! - [`runner`]：帧循环 [`HeadlessRunner`]
//! - [`journal`]：通知记录
//! - [`logging`]：日志初始化

pub mod config;
pub mod headless;
pub mod journal;
pub mod logging;
pub mod runner;

pub use config::{HostConfig, PanelConfig, PlatformSimConfig};
pub use headless::HeadlessHost;
pub use journal::{Journal, JournalCallback, JournalEntry};
pub use logging::{Level, init_logging, parse_level};
pub use runner::HeadlessRunner;

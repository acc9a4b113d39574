//! # Pending 模块
//!
//! 单槽的待处理变更缓冲。
//!
//! 面板切换请求可能比布局更频繁（例如同一个调用栈里连续两次切换），
//! 缓冲把 A→B→C 合并为一次 A→C，避免中间面板的视图被创建后立刻丢弃。
//! 布局时消费一次，消费后清空。

use tracing::{debug, trace};

use crate::editor::{Editor, display_editor};

/// 待处理的切换意图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionIntent {
    /// 合并前最初的面板
    pub previous: Option<Editor>,
    /// 最终目标面板
    pub current: Option<Editor>,
    /// 是否在等待平台确认软键盘可见性
    pub waiting_on_ime_visibility_confirmation: bool,
}

/// 消费得到的变更
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub previous: Option<Editor>,
    pub current: Option<Editor>,
}

impl PendingChange {
    /// 合并后首尾相同，不需要切换视图
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

/// 待处理变更缓冲
#[derive(Debug, Default)]
pub struct PendingChangeBuffer {
    intent: Option<TransitionIntent>,
}

impl PendingChangeBuffer {
    /// 创建空缓冲
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否有未消费的意图
    pub fn is_pending(&self) -> bool {
        self.intent.is_some()
    }

    /// 是否在等待软键盘可见性确认
    pub fn is_waiting(&self) -> bool {
        self.intent
            .as_ref()
            .is_some_and(|intent| intent.waiting_on_ime_visibility_confirmation)
    }

    /// 当前未消费的意图
    pub fn intent(&self) -> Option<&TransitionIntent> {
        self.intent.as_ref()
    }

    /// 记录一次切换意图
    ///
    /// - 没有未消费意图：新建，`previous` 为软键盘时需要等待确认
    /// - 已有未消费意图：保留原 `previous`，替换 `current`，
    ///   是否等待由新的 `current` 是否为软键盘决定
    pub fn request_change(&mut self, previous: Option<Editor>, current: Option<Editor>, ime: &Editor) {
        match self.intent.as_mut() {
            None => {
                let waiting = previous.as_ref() == Some(ime);
                debug!(
                    previous = display_editor(previous.as_ref()),
                    current = display_editor(current.as_ref()),
                    waiting,
                    "记录切换意图"
                );
                self.intent = Some(TransitionIntent {
                    previous,
                    current,
                    waiting_on_ime_visibility_confirmation: waiting,
                });
            }
            Some(intent) => {
                intent.waiting_on_ime_visibility_confirmation = current.as_ref() == Some(ime);
                intent.current = current;
                debug!(
                    previous = display_editor(intent.previous.as_ref()),
                    current = display_editor(intent.current.as_ref()),
                    waiting = intent.waiting_on_ime_visibility_confirmation,
                    "合并切换意图"
                );
            }
        }
    }

    /// 平台确认软键盘可见性
    ///
    /// 目标为软键盘时等待"显示"，否则等待"隐藏"。
    ///
    /// # 返回
    /// 是否解除了等待
    pub fn confirm_ime_visibility(&mut self, shown: bool, ime: &Editor) -> bool {
        let Some(intent) = self.intent.as_mut() else {
            return false;
        };
        if !intent.waiting_on_ime_visibility_confirmation {
            return false;
        }
        let expected = intent.current.as_ref() == Some(ime);
        if shown != expected {
            trace!(shown, expected, "软键盘可见性与目标不符，继续等待");
            return false;
        }
        intent.waiting_on_ime_visibility_confirmation = false;
        debug!(shown, "软键盘可见性已确认");
        true
    }

    /// 布局时消费意图
    ///
    /// 没有意图或仍在等待确认时返回 `None`，槽位保持不变。
    pub fn consume(&mut self) -> Option<PendingChange> {
        if self.intent.as_ref()?.waiting_on_ime_visibility_confirmation {
            trace!("等待软键盘可见性确认，跳过消费");
            return None;
        }
        let intent = self.intent.take()?;
        Some(PendingChange {
            previous: intent.previous,
            current: intent.current,
        })
    }

    /// 丢弃未消费的意图
    pub fn clear(&mut self) {
        self.intent = None;
    }
}

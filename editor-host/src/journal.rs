//! # Journal 模块
//!
//! 记录引擎通知的回调，用于测试与调试输出。

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use editor_runtime::{AnimationCallback, AnimationState, CallbackContext, Editor};

/// 一条通知
#[derive(Debug, Clone, PartialEq)]
pub enum JournalEntry {
    Prepare {
        previous: Option<Editor>,
        current: Option<Editor>,
    },
    Start {
        start: f32,
        end: f32,
        duration_millis: u64,
    },
    Update {
        offset: f32,
        fraction: f32,
    },
    End {
        offset: f32,
        fraction: f32,
    },
}

impl JournalEntry {
    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update { .. })
    }
}

fn name(editor: &Option<Editor>) -> &str {
    editor.as_ref().map_or("none", Editor::name)
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prepare { previous, current } => {
                write!(f, "prepare {} -> {}", name(previous), name(current))
            }
            Self::Start {
                start,
                end,
                duration_millis,
            } => write!(f, "start {start:.0} -> {end:.0} ({duration_millis}ms)"),
            Self::Update { offset, .. } => write!(f, "update {offset:.0}"),
            Self::End { offset, .. } => write!(f, "end {offset:.0}"),
        }
    }
}

type Entries = Rc<RefCell<Vec<JournalEntry>>>;

/// 通知记录
///
/// 可以克隆，克隆共享同一份记录。
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Entries,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入这份记录的回调
    pub fn callback(&self) -> JournalCallback {
        JournalCallback {
            entries: self.entries.clone(),
        }
    }

    /// 当前全部记录
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.borrow().clone()
    }

    /// 取出并清空
    pub fn take(&self) -> Vec<JournalEntry> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// 逐行输出（可选略过 update）
    pub fn render(&self, include_updates: bool) -> String {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| include_updates || !entry.is_update())
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 把通知写入 [`Journal`] 的回调
#[derive(Debug)]
pub struct JournalCallback {
    entries: Entries,
}

impl JournalCallback {
    fn push(&self, entry: JournalEntry) {
        self.entries.borrow_mut().push(entry);
    }
}

impl AnimationCallback for JournalCallback {
    fn on_prepare(
        &mut self,
        previous: Option<&Editor>,
        current: Option<&Editor>,
        _cx: &mut CallbackContext<'_>,
    ) {
        self.push(JournalEntry::Prepare {
            previous: previous.cloned(),
            current: current.cloned(),
        });
    }

    fn on_start(&mut self, state: &AnimationState, _cx: &mut CallbackContext<'_>) {
        self.push(JournalEntry::Start {
            start: state.start_offset(),
            end: state.end_offset(),
            duration_millis: state.duration_millis(),
        });
    }

    fn on_update(&mut self, state: &AnimationState, _cx: &mut CallbackContext<'_>) {
        self.push(JournalEntry::Update {
            offset: state.current_offset(),
            fraction: state.animated_fraction(),
        });
    }

    fn on_end(&mut self, state: &AnimationState, _cx: &mut CallbackContext<'_>) {
        self.push(JournalEntry::End {
            offset: state.current_offset(),
            fraction: state.animated_fraction(),
        });
    }
}

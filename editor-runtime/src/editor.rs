//! # Editor 模块
//!
//! 面板标识。引擎只比较标识是否相同，不管理面板的生命周期。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 面板标识
///
/// 由应用定义，例如 `Editor::new("voice")`、`Editor::new("emoji")`。
/// 软键盘（IME）也是一个 `Editor`，具体是哪一个由 [`Host::ime`](crate::Host::ime) 决定。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Editor(String);

impl Editor {
    /// 创建面板标识
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// 面板名称
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Editor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// 格式化可空的面板（`None` 表示没有面板）
pub(crate) fn display_editor(editor: Option<&Editor>) -> &str {
    editor.map_or("none", Editor::name)
}

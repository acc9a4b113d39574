//! # Callback 模块
//!
//! 动画回调与回调注册表。
//!
//! ## 通知顺序
//!
//! 后注册的回调先收到通知，装饰型回调可以包裹先注册的回调，不需要优先级。
//!
//! ## 重入
//!
//! 回调不能直接拿到引擎，而是通过 [`CallbackContext`] 发出请求
//! （显示/隐藏面板、增删回调），这些请求在回调返回后、同一次引擎调用内执行。
//! 通知前先对回调 ID 做快照，通知期间增删回调不会打乱本轮通知。

use std::fmt;

use crate::animation::AnimationState;
use crate::editor::Editor;

/// 动画回调
///
/// 所有方法默认为空实现。
pub trait AnimationCallback {
    /// 过渡准备：布局提交之前，此时仍可修改影响布局的状态
    fn on_prepare(
        &mut self,
        _previous: Option<&Editor>,
        _current: Option<&Editor>,
        _cx: &mut CallbackContext<'_>,
    ) {
    }

    /// 过渡开始：在第一次 `on_update` 之前
    fn on_start(&mut self, _state: &AnimationState, _cx: &mut CallbackContext<'_>) {}

    /// 逐帧更新
    fn on_update(&mut self, _state: &AnimationState, _cx: &mut CallbackContext<'_>) {}

    /// 过渡结束：每条记录恰好一次
    fn on_end(&mut self, _state: &AnimationState, _cx: &mut CallbackContext<'_>) {}
}

/// 回调 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub u64);

/// 回调内发出的请求
pub(crate) enum ContextRequest {
    Show(Editor),
    Hide,
    AddCallback(CallbackId, Box<dyn AnimationCallback>),
    RemoveCallback(CallbackId),
}

impl fmt::Debug for ContextRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show(editor) => f.debug_tuple("Show").field(editor).finish(),
            Self::Hide => f.write_str("Hide"),
            Self::AddCallback(id, _) => f.debug_tuple("AddCallback").field(id).finish(),
            Self::RemoveCallback(id) => f.debug_tuple("RemoveCallback").field(id).finish(),
        }
    }
}

/// 回调上下文
///
/// 回调通过它向引擎发出请求。
#[derive(Debug)]
pub struct CallbackContext<'a> {
    next_id: &'a mut u64,
    requests: Vec<ContextRequest>,
}

impl<'a> CallbackContext<'a> {
    pub(crate) fn new(next_id: &'a mut u64) -> Self {
        Self {
            next_id,
            requests: Vec::new(),
        }
    }

    /// 请求显示面板
    pub fn request_show(&mut self, editor: Editor) {
        self.requests.push(ContextRequest::Show(editor));
    }

    /// 请求隐藏当前面板
    pub fn request_hide(&mut self) {
        self.requests.push(ContextRequest::Hide);
    }

    /// 注册回调，不会收到本轮正在进行的通知
    pub fn add_callback(&mut self, callback: impl AnimationCallback + 'static) -> CallbackId {
        let id = CallbackId(*self.next_id);
        *self.next_id += 1;
        self.requests
            .push(ContextRequest::AddCallback(id, Box::new(callback)));
        id
    }

    /// 注销回调（可以注销自己）
    pub fn remove_callback(&mut self, id: CallbackId) {
        self.requests.push(ContextRequest::RemoveCallback(id));
    }

    pub(crate) fn into_requests(self) -> Vec<ContextRequest> {
        self.requests
    }
}

/// 回调槽位：通知期间回调被取出，槽位为空
struct Slot {
    id: CallbackId,
    callback: Option<Box<dyn AnimationCallback>>,
    removed: bool,
}

/// 回调注册表
pub(crate) struct CallbackRegistry {
    slots: Vec<Slot>,
    next_id: u64,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 1,
        }
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &self.len())
            .finish()
    }
}

impl CallbackRegistry {
    pub(crate) fn add(&mut self, callback: Box<dyn AnimationCallback>) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.insert(id, callback);
        id
    }

    pub(crate) fn insert(&mut self, id: CallbackId, callback: Box<dyn AnimationCallback>) {
        self.slots.push(Slot {
            id,
            callback: Some(callback),
            removed: false,
        });
    }

    /// 注销回调；正在通知中的回调在放回时丢弃
    pub(crate) fn remove(&mut self, id: CallbackId) -> bool {
        let Some(index) = self.slots.iter().position(|slot| slot.id == id && !slot.removed) else {
            return false;
        };
        if self.slots[index].callback.is_some() {
            self.slots.remove(index);
        } else {
            self.slots[index].removed = true;
        }
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.removed).count()
    }

    /// 本轮通知的对象：后注册的在前
    pub(crate) fn snapshot(&self) -> Vec<CallbackId> {
        self.slots
            .iter()
            .rev()
            .filter(|slot| !slot.removed)
            .map(|slot| slot.id)
            .collect()
    }

    /// 取出回调进行通知
    pub(crate) fn take(&mut self, id: CallbackId) -> Option<Box<dyn AnimationCallback>> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id && !slot.removed)
            .and_then(|slot| slot.callback.take())
    }

    /// 通知结束后放回；通知期间被注销的直接丢弃
    pub(crate) fn restore(&mut self, id: CallbackId, callback: Box<dyn AnimationCallback>) {
        let Some(index) = self.slots.iter().position(|slot| slot.id == id) else {
            return;
        };
        if self.slots[index].removed {
            self.slots.remove(index);
        } else {
            self.slots[index].callback = Some(callback);
        }
    }

    /// 给回调用的 ID 计数器
    pub(crate) fn id_counter(&mut self) -> &mut u64 {
        &mut self.next_id
    }
}

//! # Capability 模块
//!
//! 平台动画时长/插值覆盖能力。
//!
//! 能否修改平台软键盘动画取决于具体平台版本，只影响视觉效果，
//! 不影响引擎的正确性：失败时返回 `false`，不会报错。

use std::cell::{OnceCell, RefCell};
use std::fmt;

use tracing::debug;

use crate::animation::Interpolator;

/// 平台动画时长/插值覆盖
pub trait TimingOverride {
    /// 尝试覆盖当前平台动画的时长与插值
    ///
    /// # 返回
    /// - `true`: 覆盖成功
    /// - `false`: 平台不支持或本次覆盖失败
    fn try_override_timing(&mut self, duration_millis: u64, interpolator: Interpolator) -> bool;
}

/// 探测结果
enum ProbeOutcome {
    Supported(RefCell<Box<dyn TimingOverride>>),
    Unsupported,
}

type ProbeFn = Box<dyn Fn() -> Option<Box<dyn TimingOverride>>>;

/// 惰性探测的覆盖能力
///
/// 第一次使用时执行探测函数，结果（包括"不支持"）只计算一次。
/// 进程内创建一个，通过 `Rc` 注入到各个 `EditorAnimator`。
pub struct TimingOverrideProbe {
    probe: ProbeFn,
    outcome: OnceCell<ProbeOutcome>,
}

impl TimingOverrideProbe {
    /// 用探测函数创建
    pub fn new(probe: impl Fn() -> Option<Box<dyn TimingOverride>> + 'static) -> Self {
        Self {
            probe: Box::new(probe),
            outcome: OnceCell::new(),
        }
    }

    /// 已知不支持的探测对象
    pub fn unsupported() -> Self {
        let outcome = OnceCell::new();
        let _ = outcome.set(ProbeOutcome::Unsupported);
        Self {
            probe: Box::new(|| None),
            outcome,
        }
    }

    fn outcome(&self) -> &ProbeOutcome {
        self.outcome.get_or_init(|| match (self.probe)() {
            Some(capability) => ProbeOutcome::Supported(RefCell::new(capability)),
            None => {
                debug!("平台动画覆盖能力不可用");
                ProbeOutcome::Unsupported
            }
        })
    }

    /// 平台是否支持覆盖（会触发探测）
    pub fn is_supported(&self) -> bool {
        matches!(self.outcome(), ProbeOutcome::Supported(_))
    }

    /// 尝试覆盖平台动画
    pub fn try_override_timing(&self, duration_millis: u64, interpolator: Interpolator) -> bool {
        match self.outcome() {
            ProbeOutcome::Supported(capability) => capability
                .try_borrow_mut()
                .map(|mut capability| capability.try_override_timing(duration_millis, interpolator))
                .unwrap_or(false),
            ProbeOutcome::Unsupported => false,
        }
    }
}

impl fmt::Debug for TimingOverrideProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.outcome.get() {
            None => "unprobed",
            Some(ProbeOutcome::Supported(_)) => "supported",
            Some(ProbeOutcome::Unsupported) => "unsupported",
        };
        f.debug_struct("TimingOverrideProbe")
            .field("state", &state)
            .finish()
    }
}

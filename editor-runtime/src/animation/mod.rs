//! # Animation 模块
//!
//! 过渡动画的值类型与状态机。
//!
//! ## 核心概念
//!
//! - `TransitionOffsets` / `Fraction`: 偏移与进度
//! - `Interpolator`: 插值曲线
//! - `FallbackTimeline`: 兜底驱动器的时间轴
//! - `AnimationRecord`: 单次过渡的状态机
//! - `AnimationState`: 回调看到的只读快照

mod interpolator;
mod offset;
mod record;
mod state;
mod timeline;

pub use interpolator::Interpolator;
pub use offset::{Fraction, OFFSET_EPSILON, TransitionOffsets, offsets_equal};
pub use record::{AnimationRecord, Driver, RecordId, RecordPhase};
pub use state::AnimationState;
pub use timeline::FallbackTimeline;

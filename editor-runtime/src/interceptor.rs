//! # Interceptor 模块
//!
//! 可插拔的拦截策略：
//! - 请求写入缓冲之前，决定是否拒绝这次切换
//! - 每条记录创建时，覆盖时长与插值曲线
//!
//! 两个拦截器可以用 [`AnimationInterceptorExt::combine`] 组合：
//! 拒绝取逻辑或，时长/插值按顺序依次覆盖。

use crate::animation::Interpolator;
use crate::editor::Editor;

/// 动画拦截器
pub trait AnimationInterceptor {
    /// 是否拒绝从 `previous` 切换到 `current`
    fn on_intercept_change(&self, _previous: Option<&Editor>, _current: Option<&Editor>) -> bool {
        false
    }

    /// 覆盖动画时长（毫秒）
    fn duration_millis(
        &self,
        _previous: Option<&Editor>,
        _current: Option<&Editor>,
        duration_millis: u64,
    ) -> u64 {
        duration_millis
    }

    /// 覆盖插值曲线
    fn interpolator(
        &self,
        _previous: Option<&Editor>,
        _current: Option<&Editor>,
        interpolator: Interpolator,
    ) -> Interpolator {
        interpolator
    }
}

impl<T: AnimationInterceptor + ?Sized> AnimationInterceptor for Box<T> {
    fn on_intercept_change(&self, previous: Option<&Editor>, current: Option<&Editor>) -> bool {
        (**self).on_intercept_change(previous, current)
    }

    fn duration_millis(
        &self,
        previous: Option<&Editor>,
        current: Option<&Editor>,
        duration_millis: u64,
    ) -> u64 {
        (**self).duration_millis(previous, current, duration_millis)
    }

    fn interpolator(
        &self,
        previous: Option<&Editor>,
        current: Option<&Editor>,
        interpolator: Interpolator,
    ) -> Interpolator {
        (**self).interpolator(previous, current, interpolator)
    }
}

/// 两个拦截器的组合
#[derive(Debug, Clone)]
pub struct CombinedInterceptor<A, B> {
    first: A,
    second: B,
}

impl<A: AnimationInterceptor, B: AnimationInterceptor> AnimationInterceptor
    for CombinedInterceptor<A, B>
{
    fn on_intercept_change(&self, previous: Option<&Editor>, current: Option<&Editor>) -> bool {
        self.first.on_intercept_change(previous, current)
            || self.second.on_intercept_change(previous, current)
    }

    fn duration_millis(
        &self,
        previous: Option<&Editor>,
        current: Option<&Editor>,
        duration_millis: u64,
    ) -> u64 {
        let duration_millis = self.first.duration_millis(previous, current, duration_millis);
        self.second.duration_millis(previous, current, duration_millis)
    }

    fn interpolator(
        &self,
        previous: Option<&Editor>,
        current: Option<&Editor>,
        interpolator: Interpolator,
    ) -> Interpolator {
        let interpolator = self.first.interpolator(previous, current, interpolator);
        self.second.interpolator(previous, current, interpolator)
    }
}

/// 组合操作
pub trait AnimationInterceptorExt: AnimationInterceptor + Sized {
    /// 组合两个拦截器，`self` 先执行
    fn combine<B: AnimationInterceptor>(self, other: B) -> CombinedInterceptor<Self, B> {
        CombinedInterceptor {
            first: self,
            second: other,
        }
    }
}

impl<T: AnimationInterceptor> AnimationInterceptorExt for T {}

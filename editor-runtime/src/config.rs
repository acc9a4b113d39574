//! # Config 模块
//!
//! 引擎配置。可以直接构造，也可以从 JSON 加载：
//!
//! ```json
//! {
//!   "animation_enabled": true,
//!   "duration_millis": 250,
//!   "interpolator": "fast_out_slow_in"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::Interpolator;
use crate::error::{ConfigError, ConfigResult};
use crate::host::PlatformTiming;

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 是否启用动画；关闭后所有过渡立即完成
    #[serde(default = "default_animation_enabled")]
    pub animation_enabled: bool,

    /// 兜底驱动器的时长（毫秒）
    #[serde(default = "default_duration_millis")]
    pub duration_millis: u64,

    /// 默认插值曲线
    #[serde(default)]
    pub interpolator: Interpolator,

    /// 注册平台动画监听时给出的时长提示
    #[serde(default)]
    pub platform_duration_hint_millis: Option<u64>,

    /// 注册平台动画监听时给出的插值提示
    #[serde(default)]
    pub platform_interpolator_hint: Option<Interpolator>,
}

fn default_animation_enabled() -> bool {
    true
}

fn default_duration_millis() -> u64 {
    250
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            animation_enabled: default_animation_enabled(),
            duration_millis: default_duration_millis(),
            interpolator: Interpolator::default(),
            platform_duration_hint_millis: None,
            platform_interpolator_hint: None,
        }
    }
}

impl EngineConfig {
    /// 从 JSON 字符串解析并校验
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 校验配置有效性
    pub fn validate(&self) -> ConfigResult<()> {
        if self.animation_enabled && self.duration_millis == 0 {
            return Err(ConfigError::invalid(
                "启用动画时 duration_millis 必须大于 0",
            ));
        }
        if self.platform_duration_hint_millis == Some(0) {
            return Err(ConfigError::invalid(
                "platform_duration_hint_millis 必须大于 0",
            ));
        }
        Ok(())
    }

    /// 注册平台动画监听时使用的提示
    pub fn platform_timing(&self) -> PlatformTiming {
        PlatformTiming {
            duration_millis: self.platform_duration_hint_millis,
            interpolator: self.platform_interpolator_hint,
        }
    }
}

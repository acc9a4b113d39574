//! # Config 模块
//!
//! 无界面宿主的配置。
//!
//! ## 配置来源
//!
//! 1. 配置文件 (`editor-host.json`)
//! 2. 默认值
//!
//! 面板高度、软键盘高度与平台动画模拟都在这里描述，引擎配置嵌在 `engine` 字段中。

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use editor_runtime::{ConfigError, ConfigResult, EngineConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 单个面板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// 面板名称
    pub name: String,

    /// 面板高度
    #[serde(default)]
    pub height: f32,
}

impl PanelConfig {
    pub fn new(name: impl Into<String>, height: f32) -> Self {
        Self {
            name: name.into(),
            height,
        }
    }
}

/// 平台软键盘动画模拟
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSimConfig {
    /// 平台是否发出软键盘动画生命周期回调
    ///
    /// 关闭时软键盘高度瞬间生效，由兜底驱动器完成动画。
    #[serde(default = "default_delivers_callbacks")]
    pub delivers_callbacks: bool,

    /// 平台动画时长（毫秒），引擎给出时长提示时以提示为准
    #[serde(default = "default_platform_duration_millis")]
    pub duration_millis: u64,

    /// 首次报告的软键盘高度
    ///
    /// 设置后平台先报告这个高度，第一帧之后再修正为 `ime_height`。
    #[serde(default)]
    pub first_report: Option<f32>,
}

/// 宿主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// 可切换的面板（不含软键盘）
    #[serde(default = "default_panels")]
    pub panels: Vec<PanelConfig>,

    /// 软键盘面板的名称
    #[serde(default = "default_ime_name")]
    pub ime_name: String,

    /// 软键盘高度（含导航栏）
    #[serde(default = "default_ime_height")]
    pub ime_height: f32,

    /// 导航栏高度
    #[serde(default = "default_navigation_bar_height")]
    pub navigation_bar_height: f32,

    /// 帧间隔（毫秒）
    #[serde(default = "default_frame_interval_millis")]
    pub frame_interval_millis: u64,

    /// 平台动画模拟
    #[serde(default)]
    pub platform: PlatformSimConfig,

    /// 引擎配置
    #[serde(default)]
    pub engine: EngineConfig,
}

// 默认值函数
fn default_delivers_callbacks() -> bool {
    true
}

fn default_platform_duration_millis() -> u64 {
    200
}

fn default_panels() -> Vec<PanelConfig> {
    vec![
        PanelConfig::new("voice", 300.0),
        PanelConfig::new("emoji", 400.0),
    ]
}

fn default_ime_name() -> String {
    "ime".to_string()
}

fn default_ime_height() -> f32 {
    348.0
}

fn default_navigation_bar_height() -> f32 {
    48.0
}

fn default_frame_interval_millis() -> u64 {
    16
}

impl Default for PlatformSimConfig {
    fn default() -> Self {
        Self {
            delivers_callbacks: default_delivers_callbacks(),
            duration_millis: default_platform_duration_millis(),
            first_report: None,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            panels: default_panels(),
            ime_name: default_ime_name(),
            ime_height: default_ime_height(),
            navigation_bar_height: default_navigation_bar_height(),
            frame_interval_millis: default_frame_interval_millis(),
            platform: PlatformSimConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl HostConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在、解析失败或校验失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match Self::from_json_str(&content) {
                Ok(config) => {
                    debug!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "配置文件无效，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 从 JSON 字符串解析并校验
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 严格读取配置文件
    pub fn read(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 帧间隔
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.frame_interval_millis)
    }

    /// 面板高度
    pub fn panel_height(&self, name: &str) -> Option<f32> {
        self.panels
            .iter()
            .find(|panel| panel.name == name)
            .map(|panel| panel.height)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> ConfigResult<()> {
        if self.ime_name.is_empty() {
            return Err(ConfigError::invalid("ime_name 不能为空"));
        }

        let mut names = HashSet::new();
        for panel in &self.panels {
            if panel.name.is_empty() {
                return Err(ConfigError::invalid("面板名称不能为空"));
            }
            if panel.name == self.ime_name {
                return Err(ConfigError::invalid(format!(
                    "面板名称与软键盘重名: {}",
                    panel.name
                )));
            }
            if !names.insert(panel.name.as_str()) {
                return Err(ConfigError::invalid(format!(
                    "面板名称重复: {}",
                    panel.name
                )));
            }
            check_height(&panel.name, panel.height)?;
        }

        check_height("ime_height", self.ime_height)?;
        check_height("navigation_bar_height", self.navigation_bar_height)?;
        if let Some(first_report) = self.platform.first_report {
            check_height("platform.first_report", first_report)?;
        }

        if self.frame_interval_millis == 0 {
            return Err(ConfigError::invalid("frame_interval_millis 必须大于 0"));
        }
        if self.platform.duration_millis == 0 {
            return Err(ConfigError::invalid("platform.duration_millis 必须大于 0"));
        }

        self.engine.validate()
    }
}

fn check_height(name: &str, height: f32) -> ConfigResult<()> {
    if !height.is_finite() || height < 0.0 {
        return Err(ConfigError::invalid(format!(
            "{name} 必须是非负数，实际为 {height}"
        )));
    }
    Ok(())
}

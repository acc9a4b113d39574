//! # Error 模块
//!
//! 引擎本身没有错误通道：入口方法在条件不满足时什么都不做。
//! 这里只定义配置加载与校验的错误。

use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取失败
    #[error("配置读取失败: {0}")]
    Io(#[from] std::io::Error),

    /// 解析失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 校验失败
    #[error("配置校验失败: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    /// 创建校验错误
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

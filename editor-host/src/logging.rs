//! 日志初始化

pub use tracing::Level;

/// 安装全局 fmt 日志订阅者（输出到 stderr）
///
/// 已有全局订阅者时什么都不做。
///
/// # 返回
/// 本次是否安装成功
pub fn init_logging(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(true)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

/// 解析日志级别（`trace` / `debug` / `info` / `warn` / `error`）
pub fn parse_level(value: &str) -> Option<Level> {
    value.trim().parse().ok()
}

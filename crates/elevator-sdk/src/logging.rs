//! 日志初始化

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// 初始化全局 `tracing` 订阅者
///
/// 默认级别 `info`，`RUST_LOG` 可覆盖。重复调用无副作用；
/// 已有其他订阅者时保持不变。
pub fn init_logger() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

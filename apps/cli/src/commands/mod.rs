//! 命令定义和实现

pub mod config;
pub mod sim;

pub use config::ConfigCommand;
pub use sim::SimCommand;

use anyhow::{Context, Result};
use elevator_core::ElevatorConfig;
use std::path::Path;

/// 加载配置文件；未指定时使用内置默认值
pub fn load_config(path: Option<&Path>) -> Result<ElevatorConfig> {
    match path {
        Some(path) => ElevatorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ElevatorConfig::default()),
    }
}

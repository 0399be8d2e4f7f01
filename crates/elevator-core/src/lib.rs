//! # Elevator Core
//!
//! 升降机控制栈的基础层：强类型单位、常量表、得分高度与可调参数配置。
//!
//! **依赖原则**: 不依赖任何硬件或控制层 crate。
//!
//! ## 包含模块
//!
//! - `units` - 强类型单位（`Meters`, `MetersPerSecond`, `Volts` …）
//! - `constants` - 常量表（配置默认值）
//! - `level` - 得分高度枚举
//! - `config` - TOML 配置加载与校验

pub mod config;
pub mod constants;
pub mod level;
pub mod units;

// 重新导出常用类型
pub use config::{ConfigError, ElevatorConfig, Gains, Limits, LoopSettings, ManualConfig, MechanismConfig};
pub use level::{Level, ParseLevelError};
pub use units::{Meters, MetersPerSecond, MetersPerSecondSquared, Volts};

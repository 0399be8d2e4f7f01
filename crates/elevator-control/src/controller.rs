//! Controller trait - 控制器通用接口
//!
//! # 设计理念
//!
//! - **Tick 模式**: 调度器驱动节拍，控制器只负责计算
//! - **时间感知**: 显式传入 `dt`，便于单元测试
//! - **类型安全**: 输入 `Meters`，输出 `Volts`
//!
//! # 时间跳变处理
//!
//! 当节拍间隔异常（线程调度延迟、系统卡顿）时，调度器先调用
//! `on_time_jump()`，再以钳位后的 `dt` 调用 `tick()`。
//!
//! - ✅ **必须重置**: 微分项，防止 `(e - e_prev) / dt` 失真
//! - ❌ **不要清零**: 积分项，否则升降机会瞬间失去抗重力输出而下坠

use elevator_core::{Meters, Volts};
use std::time::Duration;

/// 控制器通用接口
///
/// `Controller` 本身不要求 `Send` 或 `Sync`，整个控制栈运行在单一调度线程上。
pub trait Controller {
    /// 控制器错误类型
    type Error: std::error::Error + Send + 'static;

    /// 计算一步控制输出
    ///
    /// - `measured`: 当前测得的伸出量
    /// - `dt`: 自上次 `tick` 以来的时间（可能已被钳位）
    fn tick(&mut self, measured: Meters, dt: Duration) -> Result<Volts, Self::Error>;

    /// 处理时间跳变，`dt` 为钳位前的实际间隔
    ///
    /// 默认什么都不做。
    fn on_time_jump(&mut self, _dt: Duration) -> Result<(), Self::Error> {
        Ok(())
    }

    /// 重置控制器到初始状态
    fn reset(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

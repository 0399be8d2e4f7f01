//! 控制器模块
//!
//! 提供单自由度升降机的控制算法，每个控制节拍调用一次：
//!
//! - `Controller` trait - 控制器通用接口
//! - `PidController` - PID 反馈控制器
//! - `TrapezoidProfile` - 梯形速度规划
//! - `ProfiledPidController` - 跟踪梯形规划设定点的 PID
//! - `ElevatorFeedforward` - 重力/静摩擦/反电动势前馈
//! - `ManualInputShaper` - 手动摇杆输入整形

use thiserror::Error;

pub mod controller;
pub mod feedforward;
pub mod input;
pub mod pid;
pub mod profile;
pub mod profiled_pid;

// 重新导出常用类型
pub use controller::Controller;
pub use feedforward::ElevatorFeedforward;
pub use input::{ManualInputShaper, SlewRateLimiter, apply_deadband};
pub use pid::PidController;
pub use profile::{Constraints, State, TrapezoidProfile};
pub use profiled_pid::ProfiledPidController;

/// 控制层错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    /// 测量值为 NaN 或无穷（传感器故障）
    #[error("Non-finite measurement: {0}")]
    NonFiniteMeasurement(f64),

    /// 运动约束无效
    #[error("Invalid constraints: {0}")]
    InvalidConstraints(String),
}

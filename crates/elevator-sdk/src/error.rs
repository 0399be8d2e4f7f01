//! 错误类型

use elevator_control::ControlError;
use elevator_core::ConfigError;
use elevator_hal::HalError;
use thiserror::Error;

/// 控制循环错误
///
/// 除 [`ElevatorError::InvalidParameter`] 外都只影响当前节拍：
/// 出错的节拍已下发 0 V，下一个节拍正常重试。
#[derive(Error, Debug)]
pub enum ElevatorError {
    /// 硬件读写失败
    #[error("Hardware error: {0}")]
    Hal(#[from] HalError),

    /// 控制计算失败（非有限测量值等）
    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    /// 配置无效
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 运行参数无效
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ElevatorError {
    /// 是否为不可恢复错误
    pub fn is_fatal(&self) -> bool {
        match self {
            ElevatorError::Hal(e) => e.is_fatal(),
            ElevatorError::Control(_) => false,
            ElevatorError::Config(_) | ElevatorError::InvalidParameter(_) => true,
        }
    }
}

//! 空桩后端：机构缺席时使用

use crate::{ActuatorIo, HalError};
use elevator_core::{Meters, MetersPerSecond, Volts};

/// 读数恒为零、丢弃所有指令的执行器
#[derive(Debug, Clone, Copy, Default)]
pub struct NoElevator;

impl ActuatorIo for NoElevator {
    fn set_voltage(&mut self, _volts: Volts) -> Result<(), HalError> {
        Ok(())
    }

    fn position(&self) -> Result<Meters, HalError> {
        Ok(Meters::ZERO)
    }

    fn velocity(&self) -> Result<MetersPerSecond, HalError> {
        Ok(MetersPerSecond::ZERO)
    }

    fn reset_position(&mut self) -> Result<(), HalError> {
        Ok(())
    }
}

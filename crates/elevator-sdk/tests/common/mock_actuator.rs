//! Mock 执行器
//!
//! 记录每一次下发的电压（包括失败的尝试），读数与故障由测试通过共享状态控制。

#![allow(dead_code)]

use elevator_core::{Meters, MetersPerSecond, Volts};
use elevator_hal::{ActuatorIo, DeviceError, DeviceErrorKind, HalError};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MockActuatorState {
    pub position: f64,
    pub velocity: f64,
    /// 所有 `set_voltage` 调用的参数，按顺序
    pub voltages: Vec<f64>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub resets: usize,
}

impl MockActuatorState {
    /// 最后一次下发的电压
    pub fn last_voltage(&self) -> Option<f64> {
        self.voltages.last().copied()
    }

    /// 从 `from` 开始的零电压指令数
    pub fn zeros_since(&self, from: usize) -> usize {
        self.voltages[from..].iter().filter(|v| **v == 0.0).count()
    }
}

pub struct MockActuator {
    state: Arc<Mutex<MockActuatorState>>,
}

impl MockActuator {
    pub fn new() -> (Self, Arc<Mutex<MockActuatorState>>) {
        let state = Arc::new(Mutex::new(MockActuatorState::default()));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }

    pub fn at(position: f64) -> (Self, Arc<Mutex<MockActuatorState>>) {
        let (actuator, state) = Self::new();
        state.lock().unwrap().position = position;
        (actuator, state)
    }

    fn read_error() -> HalError {
        DeviceError::new(DeviceErrorKind::Backend, "status frame missing").into()
    }
}

impl ActuatorIo for MockActuator {
    fn set_voltage(&mut self, volts: Volts) -> Result<(), HalError> {
        let mut state = self.state.lock().unwrap();
        state.voltages.push(volts.0);
        if state.fail_writes {
            return Err(HalError::Timeout { id: 11 });
        }
        Ok(())
    }

    fn position(&self) -> Result<Meters, HalError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(Self::read_error());
        }
        Ok(Meters(state.position))
    }

    fn velocity(&self) -> Result<MetersPerSecond, HalError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(Self::read_error());
        }
        Ok(MetersPerSecond(state.velocity))
    }

    fn reset_position(&mut self) -> Result<(), HalError> {
        let mut state = self.state.lock().unwrap();
        state.position = 0.0;
        state.resets += 1;
        Ok(())
    }
}

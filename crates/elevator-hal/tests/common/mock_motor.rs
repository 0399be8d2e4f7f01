//! Mock 电机驱动器
//!
//! 记录所有下发的配置与指令，状态通过 `Arc<Mutex<_>>` 与测试共享。

#![allow(dead_code)]

use elevator_hal::{DeviceError, DeviceErrorKind, HalError, MotorConfig, MotorDevice};
use std::sync::{Arc, Mutex};

/// 模拟驱动器状态
#[derive(Debug, Clone, Default)]
pub struct MockMotorState {
    pub config: Option<MotorConfig>,
    pub following: Option<(u32, bool)>,
    pub voltages: Vec<f64>,
    pub rotor_position: f64,
    pub rotor_velocity: f64,
    /// 为真时所有读写都返回断线错误
    pub disconnected: bool,
}

/// 模拟电机驱动器
pub struct MockMotor {
    id: u32,
    state: Arc<Mutex<MockMotorState>>,
}

impl MockMotor {
    /// 创建驱动器，同时返回共享状态句柄
    pub fn new(id: u32) -> (Self, Arc<Mutex<MockMotorState>>) {
        let state = Arc::new(Mutex::new(MockMotorState::default()));
        (
            Self {
                id,
                state: Arc::clone(&state),
            },
            state,
        )
    }

    fn check(&self) -> Result<(), HalError> {
        if self.state.lock().unwrap().disconnected {
            Err(DeviceError::new(DeviceErrorKind::Disconnected, format!("motor {} offline", self.id)).into())
        } else {
            Ok(())
        }
    }
}

impl MotorDevice for MockMotor {
    fn id(&self) -> u32 {
        self.id
    }

    fn apply_config(&mut self, config: &MotorConfig) -> Result<(), HalError> {
        self.check()?;
        self.state.lock().unwrap().config = Some(*config);
        Ok(())
    }

    fn follow(&mut self, leader_id: u32, oppose_leader: bool) -> Result<(), HalError> {
        self.check()?;
        self.state.lock().unwrap().following = Some((leader_id, oppose_leader));
        Ok(())
    }

    fn set_voltage(&mut self, volts: f64) -> Result<(), HalError> {
        self.check()?;
        self.state.lock().unwrap().voltages.push(volts);
        Ok(())
    }

    fn rotor_position(&self) -> Result<f64, HalError> {
        self.check()?;
        Ok(self.state.lock().unwrap().rotor_position)
    }

    fn rotor_velocity(&self) -> Result<f64, HalError> {
        self.check()?;
        Ok(self.state.lock().unwrap().rotor_velocity)
    }

    fn set_rotor_position(&mut self, rotations: f64) -> Result<(), HalError> {
        self.check()?;
        self.state.lock().unwrap().rotor_position = rotations;
        Ok(())
    }
}

//! 仿真后端
//!
//! 每次 `set_voltage` 都把物理模型推进一个固定节拍，
//! 位置被钳位到机构行程内，撞到限位时速度清零。

mod dc_motor;
mod plant;

pub use dc_motor::DcMotor;
pub use plant::{ElevatorPlant, GRAVITY};

use crate::{ActuatorIo, HalError};
use elevator_core::{ElevatorConfig, Meters, MetersPerSecond, Volts};
use std::time::Duration;

/// 仿真升降机
#[derive(Debug, Clone)]
pub struct SimElevator {
    plant: ElevatorPlant,
    period: Duration,
    min_extension: f64,
    max_extension: f64,
    /// 电池电压，输入被钳位到 ±此值
    supply_voltage: f64,
    position: f64,
    velocity: f64,
    input: f64,
}

impl SimElevator {
    /// 按配置构造，初始静止于最低点
    pub fn new(config: &ElevatorConfig) -> Self {
        let m = &config.mechanism;
        let motor = DcMotor::kraken_x60(m.motor_count);
        let plant = ElevatorPlant::new(motor, m.carriage_mass, m.drum_radius().0, m.gearing);

        tracing::debug!(
            "Simulated elevator plant: A = {:.2} 1/s, B = {:.2} m/s²/V, hold {:.3} V",
            plant.a(),
            plant.b(),
            plant.gravity_voltage()
        );

        Self::with_plant(plant, config)
    }

    /// 使用自定义物理模型构造
    pub fn with_plant(plant: ElevatorPlant, config: &ElevatorConfig) -> Self {
        let min_extension = config.limits.min_extension.0;
        Self {
            plant,
            period: config.control_loop.period(),
            min_extension,
            max_extension: config.limits.max_extension.0,
            supply_voltage: config.mechanism.nominal_voltage.0,
            position: min_extension,
            velocity: 0.0,
            input: 0.0,
        }
    }

    pub fn plant(&self) -> &ElevatorPlant {
        &self.plant
    }

    /// 直接注入状态
    ///
    /// 位置钳位到行程内，非有限值分别回落到最低点 / 静止。
    pub fn set_state(&mut self, position: Meters, velocity: MetersPerSecond) {
        let position = if position.0.is_nan() {
            self.min_extension
        } else {
            position.0.clamp(self.min_extension, self.max_extension)
        };
        let velocity = if velocity.0.is_finite() {
            velocity.0
        } else {
            0.0
        };

        // 停在限位上时不允许继续朝限位外运动
        let velocity = if (position <= self.min_extension && velocity < 0.0)
            || (position >= self.max_extension && velocity > 0.0)
        {
            0.0
        } else {
            velocity
        };

        self.position = position;
        self.velocity = velocity;
    }

    /// 最近一次下发（钳位后）的电压
    pub fn input_voltage(&self) -> Volts {
        Volts(self.input)
    }

    /// 当前电机电流（A）
    pub fn current_draw(&self) -> f64 {
        self.plant.current_draw(self.velocity, self.input)
    }

    /// 以当前输入推进一个节拍
    fn update(&mut self) {
        let (x, v) = self.plant.step(self.position, self.velocity, self.input, self.period);

        if x <= self.min_extension {
            self.position = self.min_extension;
            self.velocity = 0.0;
        } else if x >= self.max_extension {
            self.position = self.max_extension;
            self.velocity = 0.0;
        } else {
            self.position = x;
            self.velocity = v;
        }
    }
}

impl ActuatorIo for SimElevator {
    fn set_voltage(&mut self, volts: Volts) -> Result<(), HalError> {
        self.input = if volts.is_finite() {
            volts.0.clamp(-self.supply_voltage, self.supply_voltage)
        } else {
            tracing::warn!("Simulated elevator received non-finite voltage {}, using 0 V", volts.0);
            0.0
        };
        self.update();
        Ok(())
    }

    fn position(&self) -> Result<Meters, HalError> {
        Ok(Meters(self.position))
    }

    fn velocity(&self) -> Result<MetersPerSecond, HalError> {
        Ok(MetersPerSecond(self.velocity))
    }

    fn reset_position(&mut self) -> Result<(), HalError> {
        self.set_state(Meters(0.0), MetersPerSecond(0.0));
        Ok(())
    }
}

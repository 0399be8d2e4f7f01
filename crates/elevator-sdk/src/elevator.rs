//! 升降机子系统
//!
//! 一个节拍：
//!
//! ```text
//! 钳位目标 → 读取位置/速度 → 推进规划 + PID → 加前馈 → 钳位到 ±额定电压 → 下发
//! ```
//!
//! 任何一步失败都会在本节拍下发 0 V，再把错误交给调用者。

use crate::error::ElevatorError;
use crate::telemetry::ElevatorTelemetry;
use elevator_control::{
    Constraints, ControlError, Controller, ElevatorFeedforward, PidController,
    ProfiledPidController, State,
};
use elevator_core::{ElevatorConfig, Limits, Meters, MetersPerSecond, MetersPerSecondSquared, Volts};
use elevator_hal::ActuatorIo;
use std::time::Duration;

/// 单自由度升降机
pub struct Elevator<A: ActuatorIo> {
    actuator: A,
    controller: ProfiledPidController,
    feedforward: ElevatorFeedforward,
    limits: Limits,
    /// 输出电压上限（额定电压）
    max_voltage: Volts,
    last_position: Meters,
    last_velocity: MetersPerSecond,
    last_voltage: Volts,
}

impl<A: ActuatorIo> Elevator<A> {
    /// 校验配置并以执行器当前状态初始化规划
    pub fn new(actuator: A, config: &ElevatorConfig) -> Result<Self, ElevatorError> {
        config.validate()?;

        let limits = config.limits;
        let constraints = Constraints::from_limits(&limits)?;
        let pid = PidController::from_gains(limits.min_extension, &config.gains);
        let controller = ProfiledPidController::new(pid, constraints)
            .with_position_range(limits.min_extension, limits.max_extension)
            .with_tolerance(limits.position_tolerance, limits.velocity_tolerance);
        let feedforward = ElevatorFeedforward::from_gains(&config.gains);
        let max_voltage = config.mechanism.nominal_voltage;

        let reachable =
            feedforward.max_achievable_velocity(max_voltage, MetersPerSecondSquared::ZERO);
        if reachable < limits.max_velocity {
            tracing::warn!(
                "Max velocity {} is not achievable at {} (feedforward limit {})",
                limits.max_velocity,
                max_voltage,
                reachable
            );
        }

        let mut elevator = Self {
            actuator,
            controller,
            feedforward,
            limits,
            max_voltage,
            last_position: limits.min_extension,
            last_velocity: MetersPerSecond::ZERO,
            last_voltage: Volts::ZERO,
        };
        elevator.reset_profile();
        Ok(elevator)
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn goal(&self) -> Meters {
        self.controller.goal()
    }

    pub fn setpoint(&self) -> State {
        self.controller.setpoint()
    }

    /// 最近一次下发的电压
    pub fn last_voltage(&self) -> Volts {
        self.last_voltage
    }

    pub fn controller(&self) -> &ProfiledPidController {
        &self.controller
    }

    /// 钳位目标：越界值收敛到行程内，NaN 回零
    pub fn clamp_goal(&self, goal: Meters) -> Meters {
        let clamped = self.limits.clamp_goal(goal);
        if goal.0.is_nan() {
            tracing::warn!("NaN elevator goal, retracting to {}", clamped);
        } else if clamped != goal {
            tracing::warn!("Elevator goal {} outside travel, clamped to {}", goal, clamped);
        }
        clamped
    }

    /// 朝 `goal` 运行一个节拍，返回下发的电压
    ///
    /// 失败时本节拍已下发 0 V。
    pub fn update(&mut self, goal: Meters, dt: Duration) -> Result<Volts, ElevatorError> {
        match self.try_update(goal, dt) {
            Ok(volts) => Ok(volts),
            Err(e) => {
                tracing::error!("Elevator tick failed: {}, commanding 0 V", e);
                self.release();
                Err(e)
            },
        }
    }

    fn try_update(&mut self, goal: Meters, dt: Duration) -> Result<Volts, ElevatorError> {
        let goal = self.clamp_goal(goal);
        let measured = self.measure()?;

        let previous = self.controller.setpoint();
        let feedback = self.controller.calculate(measured.position, goal, dt)?;
        let next = self.controller.setpoint();
        let feedforward =
            self.feedforward.calculate_with_velocities(previous.velocity, next.velocity, dt);

        let volts = (feedback + feedforward).clamp(-self.max_voltage, self.max_voltage);
        self.actuator.set_voltage(volts)?;
        self.last_voltage = volts;
        Ok(volts)
    }

    /// 下发 0 V（失败只记录日志）
    pub fn release(&mut self) {
        if let Err(e) = self.actuator.set_voltage(Volts::ZERO) {
            tracing::error!("Failed to release elevator output: {}", e);
        }
        self.last_voltage = Volts::ZERO;
    }

    /// 把规划锚定到当前测量状态，目标同时设为当前位置
    ///
    /// 读取失败时使用最近一次成功的读数。
    pub fn reset_profile(&mut self) {
        let measured = match self.measure() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Failed to read elevator state for profile reset: {}", e);
                State::new(self.last_position, self.last_velocity)
            },
        };
        self.controller.reset_to(measured);
        let anchor = self.controller.setpoint().position;
        self.controller.set_goal(anchor);
    }

    /// 把当前位置记为零点
    pub fn reset_position(&mut self) -> Result<(), ElevatorError> {
        self.actuator.reset_position()?;
        self.reset_profile();
        Ok(())
    }

    /// 测量状态是否到达目标（读取失败视为未到达）
    pub fn at_goal(&self) -> bool {
        match (self.actuator.position(), self.actuator.velocity()) {
            (Ok(position), Ok(velocity)) => self.controller.at_goal(State::new(position, velocity)),
            _ => false,
        }
    }

    pub fn on_time_jump(&mut self, dt: Duration) -> Result<(), ElevatorError> {
        self.controller.on_time_jump(dt)?;
        Ok(())
    }

    /// 遥测快照，读取失败时使用最近一次成功的读数
    pub fn telemetry(&self) -> ElevatorTelemetry {
        let position = self.actuator.position().unwrap_or(self.last_position);
        let velocity = self.actuator.velocity().unwrap_or(self.last_velocity);
        let setpoint = self.controller.setpoint();

        ElevatorTelemetry {
            activity: None,
            position,
            velocity,
            goal: self.controller.goal(),
            setpoint_position: setpoint.position,
            setpoint_velocity: setpoint.velocity,
            voltage: self.last_voltage,
            at_goal: self.controller.at_goal(State::new(position, velocity)),
        }
    }

    fn measure(&mut self) -> Result<State, ElevatorError> {
        let position = self.actuator.position()?;
        let velocity = self.actuator.velocity()?;
        if !position.is_finite() {
            return Err(ControlError::NonFiniteMeasurement(position.0).into());
        }
        if !velocity.is_finite() {
            return Err(ControlError::NonFiniteMeasurement(velocity.0).into());
        }

        self.last_position = position;
        self.last_velocity = velocity;
        Ok(State::new(position, velocity))
    }
}

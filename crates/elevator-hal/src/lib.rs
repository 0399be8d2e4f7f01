//! # Elevator HAL
//!
//! 执行器硬件抽象层，提供统一的 [`ActuatorIo`] 接口。
//!
//! 三种后端在启动时由 [`create_actuator`] 按运行环境选择：
//!
//! - **真实硬件** ([`RealElevator`]): 一主多从电机组，制动模式、限流、换算到米
//! - **物理仿真** ([`SimElevator`]): 二阶线性升降机模型，每次下发电压前进一个节拍
//! - **空桩** ([`NoElevator`]): 机构缺席时使用，读数恒为零，丢弃指令

use elevator_core::{ElevatorConfig, Meters, MetersPerSecond, Volts};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod real;
pub mod sim;
pub mod stub;

pub use real::{Follower, MotorConfig, MotorDevice, MotorGroup, NeutralMode, RealElevator};
pub use sim::{DcMotor, ElevatorPlant, SimElevator};
pub use stub::NoElevator;

/// HAL 统一错误类型
#[derive(Error, Debug)]
pub enum HalError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
    #[error("Device {id} timed out")]
    Timeout { id: u32 },
    #[error("Non-finite reading from device {id}: {value}")]
    InvalidReading { id: u32, value: f64 },
    #[error("Real backend requested without a motor group")]
    MissingMotors,
}

impl HalError {
    /// 是否为不可恢复错误（设备丢失、配置被拒）
    pub fn is_fatal(&self) -> bool {
        match self {
            HalError::Device(e) => e.is_fatal(),
            HalError::MissingMotors => true,
            HalError::Timeout { .. } | HalError::InvalidReading { .. } => false,
        }
    }
}

/// 设备错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    Unknown,
    NotFound,
    Disconnected,
    ConfigRejected,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct DeviceError {
    pub kind: DeviceErrorKind,
    pub message: String,
}

impl DeviceError {
    pub fn new(kind: DeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            DeviceErrorKind::NotFound | DeviceErrorKind::Disconnected | DeviceErrorKind::ConfigRejected
        )
    }
}

impl From<String> for DeviceError {
    fn from(message: String) -> Self {
        Self::new(DeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for DeviceError {
    fn from(message: &str) -> Self {
        Self::new(DeviceErrorKind::Unknown, message)
    }
}

/// 执行器接口
///
/// `set_voltage` 是唯一有物理效果的操作；其余为只读或幂等重置。
/// 所有调用都是同步的，必须在一个控制节拍内完成。
pub trait ActuatorIo {
    /// 下发驱动电压
    fn set_voltage(&mut self, volts: Volts) -> Result<(), HalError>;

    /// 当前伸出量
    fn position(&self) -> Result<Meters, HalError>;

    /// 当前速度
    fn velocity(&self) -> Result<MetersPerSecond, HalError>;

    /// 把当前位置记为零点
    fn reset_position(&mut self) -> Result<(), HalError>;
}

impl<T: ActuatorIo + ?Sized> ActuatorIo for Box<T> {
    fn set_voltage(&mut self, volts: Volts) -> Result<(), HalError> {
        (**self).set_voltage(volts)
    }

    fn position(&self) -> Result<Meters, HalError> {
        (**self).position()
    }

    fn velocity(&self) -> Result<MetersPerSecond, HalError> {
        (**self).velocity()
    }

    fn reset_position(&mut self) -> Result<(), HalError> {
        (**self).reset_position()
    }
}

/// 运行环境标志，启动时显式传入工厂函数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// 真实机器人
    Real,
    /// 仿真
    Simulation,
    /// 机构缺席
    Absent,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Real => "real",
            Environment::Simulation => "sim",
            Environment::Absent => "none",
        })
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "real" => Ok(Environment::Real),
            "sim" | "simulation" => Ok(Environment::Simulation),
            "none" | "absent" | "stub" => Ok(Environment::Absent),
            other => Err(format!("Unknown environment '{}' (expected real, sim or none)", other)),
        }
    }
}

/// 三种后端的分派枚举
pub enum Actuator {
    Real(RealElevator),
    Sim(SimElevator),
    Stub(NoElevator),
}

impl Actuator {
    pub fn environment(&self) -> Environment {
        match self {
            Actuator::Real(_) => Environment::Real,
            Actuator::Sim(_) => Environment::Simulation,
            Actuator::Stub(_) => Environment::Absent,
        }
    }

    /// 仿真后端（用于注入状态、读取电流等）
    pub fn as_sim(&self) -> Option<&SimElevator> {
        match self {
            Actuator::Sim(sim) => Some(sim),
            _ => None,
        }
    }

    pub fn as_sim_mut(&mut self) -> Option<&mut SimElevator> {
        match self {
            Actuator::Sim(sim) => Some(sim),
            _ => None,
        }
    }
}

impl fmt::Debug for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actuator({})", self.environment())
    }
}

impl ActuatorIo for Actuator {
    fn set_voltage(&mut self, volts: Volts) -> Result<(), HalError> {
        match self {
            Actuator::Real(a) => a.set_voltage(volts),
            Actuator::Sim(a) => a.set_voltage(volts),
            Actuator::Stub(a) => a.set_voltage(volts),
        }
    }

    fn position(&self) -> Result<Meters, HalError> {
        match self {
            Actuator::Real(a) => a.position(),
            Actuator::Sim(a) => a.position(),
            Actuator::Stub(a) => a.position(),
        }
    }

    fn velocity(&self) -> Result<MetersPerSecond, HalError> {
        match self {
            Actuator::Real(a) => a.velocity(),
            Actuator::Sim(a) => a.velocity(),
            Actuator::Stub(a) => a.velocity(),
        }
    }

    fn reset_position(&mut self) -> Result<(), HalError> {
        match self {
            Actuator::Real(a) => a.reset_position(),
            Actuator::Sim(a) => a.reset_position(),
            Actuator::Stub(a) => a.reset_position(),
        }
    }
}

/// 按运行环境构造执行器后端
///
/// `Environment::Real` 必须提供电机组，否则返回 [`HalError::MissingMotors`]；
/// 其余环境忽略 `motors`。
pub fn create_actuator(
    environment: Environment,
    config: &ElevatorConfig,
    motors: Option<MotorGroup>,
) -> Result<Actuator, HalError> {
    tracing::info!("Creating elevator actuator backend: {}", environment);

    match environment {
        Environment::Real => {
            let group = motors.ok_or(HalError::MissingMotors)?;
            Ok(Actuator::Real(RealElevator::new(group, &config.mechanism)?))
        },
        Environment::Simulation => Ok(Actuator::Sim(SimElevator::new(config))),
        Environment::Absent => Ok(Actuator::Stub(NoElevator)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!("real".parse::<Environment>().unwrap(), Environment::Real);
        assert_eq!("SIM".parse::<Environment>().unwrap(), Environment::Simulation);
        assert_eq!("none".parse::<Environment>().unwrap(), Environment::Absent);
        assert!("mars".parse::<Environment>().is_err());
    }

    #[test]
    fn test_create_real_without_motors_fails() {
        let config = ElevatorConfig::default();
        let err = create_actuator(Environment::Real, &config, None).unwrap_err();
        assert!(matches!(err, HalError::MissingMotors));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_create_sim_and_stub() {
        let config = ElevatorConfig::default();

        let sim = create_actuator(Environment::Simulation, &config, None).unwrap();
        assert_eq!(sim.environment(), Environment::Simulation);
        assert!(sim.as_sim().is_some());

        let stub = create_actuator(Environment::Absent, &config, None).unwrap();
        assert_eq!(stub.environment(), Environment::Absent);
        assert_eq!(stub.position().unwrap(), Meters(0.0));
    }

    #[test]
    fn test_device_error_fatality() {
        assert!(DeviceError::new(DeviceErrorKind::Disconnected, "CAN id 11").is_fatal());
        assert!(!DeviceError::new(DeviceErrorKind::Backend, "busy").is_fatal());
        assert!(!HalError::Timeout { id: 11 }.is_fatal());

        let e: DeviceError = "status frame lost".into();
        assert_eq!(e.kind, DeviceErrorKind::Unknown);
        assert_eq!(format!("{}", e), "Unknown: status frame lost");
    }
}

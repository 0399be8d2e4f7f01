//! 真实硬件后端
//!
//! 一台主电机 + 若干机械耦合的从电机。从电机在驱动器内部跟随主电机指令，
//! 方向相反的从电机设置 `oppose_leader`。
//!
//! 电机驱动器本身由 [`MotorDevice`] 抽象（具体厂商驱动在上层实现），
//! 这里只负责：
//!
//! - 下发制动模式 + 电源限流配置
//! - 设置跟随关系
//! - 把转子读数按换算比转换为米 / 米每秒

use crate::{ActuatorIo, HalError};
use elevator_core::{MechanismConfig, Meters, MetersPerSecond, Volts};

/// 空闲（零指令）时的电机行为
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeutralMode {
    /// 短接绕组，零指令时保持位置
    Brake,
    /// 自由滑行
    Coast,
}

/// 电机驱动器配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorConfig {
    pub neutral_mode: NeutralMode,
    /// 电源电流限制（A）
    pub supply_current_limit: f64,
    pub inverted: bool,
}

impl MotorConfig {
    /// 升降机电机的标准配置：制动、限流
    pub fn elevator(mechanism: &MechanismConfig) -> Self {
        Self {
            neutral_mode: NeutralMode::Brake,
            supply_current_limit: mechanism.current_limit,
            inverted: false,
        }
    }
}

/// 单个电机驱动器
///
/// 位置/速度以转子转数为单位，换算由 [`RealElevator`] 完成。
pub trait MotorDevice {
    /// 总线 ID
    fn id(&self) -> u32;

    fn apply_config(&mut self, config: &MotorConfig) -> Result<(), HalError>;

    /// 跟随 `leader_id` 的输出；`oppose_leader` 为真时方向取反
    fn follow(&mut self, leader_id: u32, oppose_leader: bool) -> Result<(), HalError>;

    fn set_voltage(&mut self, volts: f64) -> Result<(), HalError>;

    /// 转子位置（转）
    fn rotor_position(&self) -> Result<f64, HalError>;

    /// 转子速度（转/秒）
    fn rotor_velocity(&self) -> Result<f64, HalError>;

    /// 重写转子位置计数
    fn set_rotor_position(&mut self, rotations: f64) -> Result<(), HalError>;
}

/// 从电机
pub struct Follower {
    pub device: Box<dyn MotorDevice>,
    /// 与主电机方向相反
    pub oppose_leader: bool,
}

/// 电机组
pub struct MotorGroup {
    pub leader: Box<dyn MotorDevice>,
    pub followers: Vec<Follower>,
}

impl MotorGroup {
    pub fn new(leader: Box<dyn MotorDevice>) -> Self {
        Self {
            leader,
            followers: Vec::new(),
        }
    }

    pub fn with_follower(mut self, device: Box<dyn MotorDevice>, oppose_leader: bool) -> Self {
        self.followers.push(Follower {
            device,
            oppose_leader,
        });
        self
    }
}

/// 真实硬件升降机
pub struct RealElevator {
    leader: Box<dyn MotorDevice>,
    followers: Vec<Follower>,
    /// 转子每米转数
    rotations_per_meter: f64,
}

impl RealElevator {
    /// 配置电机组并把位置清零
    pub fn new(group: MotorGroup, mechanism: &MechanismConfig) -> Result<Self, HalError> {
        let MotorGroup {
            mut leader,
            mut followers,
        } = group;
        let config = MotorConfig::elevator(mechanism);

        leader.apply_config(&config)?;
        for follower in followers.iter_mut() {
            follower.device.apply_config(&config)?;
            follower.device.follow(leader.id(), follower.oppose_leader)?;
        }

        leader.set_rotor_position(0.0)?;
        for follower in followers.iter_mut() {
            follower.device.set_rotor_position(0.0)?;
        }

        let rotations_per_meter = mechanism.conversion_factor();
        tracing::info!(
            "Elevator motors configured: leader {}, {} follower(s), {:.3} rot/m, {} A limit",
            leader.id(),
            followers.len(),
            rotations_per_meter,
            config.supply_current_limit
        );

        Ok(Self {
            leader,
            followers,
            rotations_per_meter,
        })
    }

    pub fn rotations_per_meter(&self) -> f64 {
        self.rotations_per_meter
    }

    pub fn follower_count(&self) -> usize {
        self.followers.len()
    }

    fn checked(&self, value: f64) -> Result<f64, HalError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(HalError::InvalidReading {
                id: self.leader.id(),
                value,
            })
        }
    }
}

impl ActuatorIo for RealElevator {
    fn set_voltage(&mut self, volts: Volts) -> Result<(), HalError> {
        // 从电机在驱动器内跟随，只需写主电机
        self.leader.set_voltage(volts.0)
    }

    fn position(&self) -> Result<Meters, HalError> {
        let rotations = self.checked(self.leader.rotor_position()?)?;
        Ok(Meters(rotations / self.rotations_per_meter))
    }

    fn velocity(&self) -> Result<MetersPerSecond, HalError> {
        let rps = self.checked(self.leader.rotor_velocity()?)?;
        Ok(MetersPerSecond(rps / self.rotations_per_meter))
    }

    fn reset_position(&mut self) -> Result<(), HalError> {
        self.leader.set_rotor_position(0.0)
    }
}

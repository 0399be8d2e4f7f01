//! # 可调参数配置
//!
//! 启动时从 TOML 加载一次，之后在进程生命周期内只读。
//! 缺省的段落/字段取 [`crate::constants`] 中的值。
//!
//! ```toml
//! [gains]
//! kp = 3.0
//! kg = 0.2645
//!
//! [limits]
//! max_extension = 1.455
//!
//! [manual]
//! speed_multiplier = 2.0
//! ```

use crate::constants;
use crate::units::{Meters, MetersPerSecond, MetersPerSecondSquared, Volts};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读写配置文件失败
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 参数无效
    #[error("Invalid parameter '{param}': {reason}")]
    Invalid {
        /// 参数名
        param: &'static str,
        /// 原因
        reason: String,
    },
}

impl ConfigError {
    fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            param,
            reason: reason.into(),
        }
    }
}

/// 升降机完整配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevatorConfig {
    /// 反馈/前馈增益
    pub gains: Gains,
    /// 行程与运动约束
    pub limits: Limits,
    /// 机构参数
    pub mechanism: MechanismConfig,
    /// 手动驾驶输入整形
    pub manual: ManualConfig,
    /// 控制循环
    pub control_loop: LoopSettings,
}

impl ElevatorConfig {
    /// 从 TOML 文件加载并校验
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ElevatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 校验参数一致性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gains;
        for (name, value) in [
            ("gains.kp", g.kp),
            ("gains.ki", g.ki),
            ("gains.kd", g.kd),
            ("gains.ks", g.ks),
            ("gains.kg", g.kg),
            ("gains.kv", g.kv),
            ("gains.ka", g.ka),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::invalid(name, format!("must be finite, got {}", value)));
            }
        }

        let l = &self.limits;
        if !(l.min_extension.is_finite() && l.max_extension.is_finite()) {
            return Err(ConfigError::invalid("limits", "extension limits must be finite"));
        }
        if l.min_extension >= l.max_extension {
            return Err(ConfigError::invalid(
                "limits.max_extension",
                format!("must exceed min_extension ({} >= {})", l.min_extension, l.max_extension),
            ));
        }
        // 伸出量从最低点起算，复位后位置必须读为 0
        if l.min_extension != Meters::ZERO {
            return Err(ConfigError::invalid(
                "limits.min_extension",
                format!("must be 0 (extension is measured from home), got {}", l.min_extension),
            ));
        }
        if !(l.max_velocity.0 > 0.0 && l.max_velocity.is_finite()) {
            return Err(ConfigError::invalid("limits.max_velocity", "must be > 0"));
        }
        if !(l.max_accel.0 > 0.0 && l.max_accel.is_finite()) {
            return Err(ConfigError::invalid("limits.max_accel", "must be > 0"));
        }
        if !(l.position_tolerance.0 >= 0.0) || !(l.velocity_tolerance.0 >= 0.0) {
            return Err(ConfigError::invalid("limits", "tolerances must be >= 0"));
        }

        let m = &self.mechanism;
        for (name, value) in [
            ("mechanism.carriage_mass", m.carriage_mass),
            ("mechanism.gearing", m.gearing),
            ("mechanism.sprocket_radius", m.sprocket_radius.0),
            ("mechanism.rigging_ratio", m.rigging_ratio),
            ("mechanism.current_limit", m.current_limit),
            ("mechanism.nominal_voltage", m.nominal_voltage.0),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::invalid(name, format!("must be > 0, got {}", value)));
            }
        }
        if m.motor_count == 0 {
            return Err(ConfigError::invalid("mechanism.motor_count", "must be >= 1"));
        }

        if !(0.0..1.0).contains(&self.manual.deadband) {
            return Err(ConfigError::invalid(
                "manual.deadband",
                format!("must be in [0, 1), got {}", self.manual.deadband),
            ));
        }
        if !(self.manual.speed_multiplier >= 0.0 && self.manual.speed_multiplier.is_finite()) {
            return Err(ConfigError::invalid("manual.speed_multiplier", "must be >= 0"));
        }

        if self.control_loop.period_ms == 0 {
            return Err(ConfigError::invalid("control_loop.period_ms", "must be > 0"));
        }
        if !(self.control_loop.dt_clamp_multiplier > 0.0) {
            return Err(ConfigError::invalid("control_loop.dt_clamp_multiplier", "must be > 0"));
        }

        Ok(())
    }
}

/// 增益
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub ks: f64,
    pub kg: f64,
    pub kv: f64,
    pub ka: f64,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            kp: constants::KP,
            ki: constants::KI,
            kd: constants::KD,
            ks: constants::KS,
            kg: constants::KG,
            kv: constants::KV,
            ka: constants::KA,
        }
    }
}

/// 行程与运动约束
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub min_extension: Meters,
    pub max_extension: Meters,
    pub max_velocity: MetersPerSecond,
    pub max_accel: MetersPerSecondSquared,
    pub position_tolerance: Meters,
    pub velocity_tolerance: MetersPerSecond,
}

impl Limits {
    /// 把任意目标收敛到合法行程内
    ///
    /// NaN 视为回零（`min_extension`）。
    pub fn clamp_goal(&self, goal: Meters) -> Meters {
        if goal.0.is_nan() {
            self.min_extension
        } else {
            goal.clamp(self.min_extension, self.max_extension)
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_extension: Meters(constants::MIN_EXTENSION),
            max_extension: Meters(constants::MAX_EXTENSION),
            max_velocity: MetersPerSecond(constants::MAX_VELOCITY),
            max_accel: MetersPerSecondSquared(constants::MAX_ACCEL),
            position_tolerance: Meters(constants::POSITION_TOLERANCE),
            velocity_tolerance: MetersPerSecond(constants::VELOCITY_TOLERANCE),
        }
    }
}

/// 机构参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanismConfig {
    /// 滑架质量（kg）
    pub carriage_mass: f64,
    /// 减速比
    pub gearing: f64,
    pub sprocket_radius: Meters,
    /// 级联绕绳比
    pub rigging_ratio: f64,
    /// 电源电流限制（A）
    pub current_limit: f64,
    pub nominal_voltage: Volts,
    pub motor_count: u32,
}

impl MechanismConfig {
    /// 转子每米转数
    pub fn conversion_factor(&self) -> f64 {
        constants::conversion_factor(self.gearing, self.sprocket_radius.0, self.rigging_ratio)
    }

    /// 等效卷筒半径（链轮半径 × 绕绳比）
    pub fn drum_radius(&self) -> Meters {
        self.sprocket_radius * self.rigging_ratio
    }
}

impl Default for MechanismConfig {
    fn default() -> Self {
        Self {
            carriage_mass: constants::CARRIAGE_MASS,
            gearing: constants::GEARING,
            sprocket_radius: Meters::from_inches(constants::SPROCKET_RADIUS_INCHES),
            rigging_ratio: constants::RIGGING_RATIO,
            current_limit: constants::CURRENT_LIMIT,
            nominal_voltage: Volts(constants::NOMINAL_VOLTAGE),
            motor_count: constants::MOTOR_COUNT,
        }
    }
}

/// 手动驾驶输入整形参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualConfig {
    pub deadband: f64,
    /// 满杆时的速度倍率（相对于 `max_velocity`）
    pub speed_multiplier: f64,
}

impl Default for ManualConfig {
    fn default() -> Self {
        Self {
            deadband: constants::DEADBAND,
            speed_multiplier: constants::MANUAL_SPEED_MULTIPLIER,
        }
    }
}

/// 控制循环参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopSettings {
    /// 控制周期（毫秒）
    pub period_ms: u64,
    /// dt 钳位倍数：实际 dt 超过 `period * multiplier` 视为时间跳变
    pub dt_clamp_multiplier: f64,
}

impl LoopSettings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            period_ms: constants::PERIOD.as_millis() as u64,
            dt_clamp_multiplier: 2.0,
        }
    }
}

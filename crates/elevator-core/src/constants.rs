//! 升降机常量表
//!
//! 所有数值均为 SI 单位。运行时可调参数由 [`crate::config::ElevatorConfig`] 覆盖，
//! 这里的值即其默认值。

use std::time::Duration;

/// 控制周期（roboRIO 节拍，50Hz）
pub const PERIOD: Duration = Duration::from_millis(20);

// ==================== 反馈增益 ====================
pub const KP: f64 = 3.0;
pub const KI: f64 = 0.0;
pub const KD: f64 = 0.0;

// ==================== 前馈增益 ====================
/// 静摩擦（V）
pub const KS: f64 = 0.0755;
/// 重力补偿（V）
pub const KG: f64 = 0.2645;
/// 速度增益（V·s/m）
pub const KV: f64 = 3.7;
/// 加速度增益（V·s²/m）
pub const KA: f64 = 0.012;

// ==================== 容差 ====================
/// 位置容差：3.5 cm
pub const POSITION_TOLERANCE: f64 = 0.035;
/// 速度容差（m/s）
pub const VELOCITY_TOLERANCE: f64 = 0.005;

// ==================== 行程与运动约束 ====================
pub const MIN_EXTENSION: f64 = 0.0;
pub const MAX_EXTENSION: f64 = 1.455;
pub const MAX_VELOCITY: f64 = 2.0;
pub const MAX_ACCEL: f64 = 2.8;

// ==================== 机构参数 ====================
/// 仿真等效滑架质量（kg）
///
/// 与级联等效半径一起决定仿真的重力电压，取值使其与整定的 `KG` 之差
/// 在 `KP * POSITION_TOLERANCE` 以内，闭环稳态才能落在到位容差里。
pub const CARRIAGE_MASS: f64 = 6.142;
/// 减速比（输入:输出，大于 1 表示减速）
pub const GEARING: f64 = 9.375;
/// 链轮半径（英寸）
pub const SPROCKET_RADIUS_INCHES: f64 = 1.7565 / 2.0;
/// 级联绕绳比：滑架行程 / 链条行程
pub const RIGGING_RATIO: f64 = 2.0;
/// 电源电流限制（A）
pub const CURRENT_LIMIT: f64 = 65.0;
/// 名义电源电压（V），同时作为输出钳位
pub const NOMINAL_VOLTAGE: f64 = 12.0;
/// 驱动电机数量（1 主 + 1 从）
pub const MOTOR_COUNT: u32 = 2;

// ==================== 手动驾驶 ====================
/// 摇杆死区
pub const DEADBAND: f64 = 0.15;
/// 手动驾驶速度倍率
pub const MANUAL_SPEED_MULTIPLIER: f64 = 2.0;

/// 转子每米转数（传感器到机构的换算比）
///
/// `gearing / (2π · r · rigging)`，读数除以此值即得米。
pub fn conversion_factor(gearing: f64, sprocket_radius: f64, rigging_ratio: f64) -> f64 {
    gearing / (std::f64::consts::TAU * sprocket_radius * rigging_ratio)
}

//! 直流电机模型
//!
//! 由铭牌参数推导电气常数：
//!
//! ```text
//! R  = V_nominal / I_stall
//! Kv = ω_free / (V_nominal - R * I_free)
//! Kt = τ_stall / I_stall
//! ```
//!
//! N 台相同电机并联时，堵转力矩、堵转电流、空载电流按 N 倍放大，空载转速不变。

/// 直流电机（可代表 N 台并联的相同电机）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcMotor {
    /// 名义电压（V）
    pub nominal_voltage: f64,
    /// 堵转力矩（N·m）
    pub stall_torque: f64,
    /// 堵转电流（A）
    pub stall_current: f64,
    /// 空载电流（A）
    pub free_current: f64,
    /// 空载转速（rad/s）
    pub free_speed: f64,
    /// 绕组电阻（Ω）
    pub r_ohms: f64,
    /// 速度常数（rad/s/V）
    pub kv: f64,
    /// 力矩常数（N·m/A）
    pub kt: f64,
}

impl DcMotor {
    pub fn new(
        nominal_voltage: f64,
        stall_torque: f64,
        stall_current: f64,
        free_current: f64,
        free_speed: f64,
        num_motors: u32,
    ) -> Self {
        let n = f64::from(num_motors.max(1));
        let stall_torque = stall_torque * n;
        let stall_current = stall_current * n;
        let free_current = free_current * n;

        let r_ohms = nominal_voltage / stall_current;
        let kv = free_speed / (nominal_voltage - r_ohms * free_current);
        let kt = stall_torque / stall_current;

        Self {
            nominal_voltage,
            stall_torque,
            stall_current,
            free_current,
            free_speed,
            r_ohms,
            kv,
            kt,
        }
    }

    /// Kraken X60：12 V，7.09 N·m，366 A 堵转，2 A 空载，6000 rpm
    pub fn kraken_x60(num_motors: u32) -> Self {
        Self::new(12.0, 7.09, 366.0, 2.0, rpm_to_rad_per_sec(6000.0), num_motors)
    }

    /// 给定转速（rad/s）与电压下的电流（A）
    pub fn current(&self, speed: f64, voltage: f64) -> f64 {
        -1.0 / self.kv / self.r_ohms * speed + voltage / self.r_ohms
    }

    /// 给定电流下的力矩（N·m）
    pub fn torque(&self, current: f64) -> f64 {
        current * self.kt
    }
}

fn rpm_to_rad_per_sec(rpm: f64) -> f64 {
    rpm * std::f64::consts::TAU / 60.0
}

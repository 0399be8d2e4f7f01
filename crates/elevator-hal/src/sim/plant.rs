//! 升降机线性物理模型
//!
//! # 模型
//!
//! ```text
//! dx/dt = v
//! dv/dt = A * v + B * u - g
//!
//! A = -G² * Kt / (R * r² * m * Kv)
//! B =  G  * Kt / (R * r  * m)
//! ```
//!
//! 其中 `G` 为减速比，`r` 为等效卷筒半径，`m` 为滑架质量，`u` 为输入电压。
//!
//! # 离散化
//!
//! 输入在一个节拍内保持不变（零阶保持），速度方程是一阶线性 ODE，
//! 直接使用解析解推进，对任意步长都数值稳定：
//!
//! ```text
//! v_ss = -(B*u - g) / A
//! v(t) = v_ss + (v0 - v_ss) * e^{A t}
//! x(t) = x0 + v_ss * t + (v0 - v_ss) * (e^{A t} - 1) / A
//! ```

use super::DcMotor;
use std::time::Duration;

/// 重力加速度（m/s²）
pub const GRAVITY: f64 = 9.81;

/// 升降机物理模型
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevatorPlant {
    motor: DcMotor,
    gearing: f64,
    drum_radius: f64,
    mass: f64,
    a: f64,
    b: f64,
}

impl ElevatorPlant {
    pub fn new(motor: DcMotor, mass: f64, drum_radius: f64, gearing: f64) -> Self {
        let b = gearing * motor.kt / (motor.r_ohms * drum_radius * mass);
        let a = -gearing * gearing * motor.kt
            / (motor.r_ohms * drum_radius * drum_radius * mass * motor.kv);

        Self {
            motor,
            gearing,
            drum_radius,
            mass,
            a,
            b,
        }
    }

    /// 系统矩阵 A（1/s）
    pub fn a(&self) -> f64 {
        self.a
    }

    /// 输入矩阵 B（m/s²/V）
    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// 恰好抵消重力所需的电压
    pub fn gravity_voltage(&self) -> f64 {
        GRAVITY / self.b
    }

    /// 匀速运动时每单位速度所需的电压（反电动势）
    pub fn velocity_voltage(&self) -> f64 {
        -self.a / self.b
    }

    /// 在恒定电压下推进 `dt`，返回 `(位置, 速度)`
    ///
    /// 不处理行程限位，由调用者钳位。
    pub fn step(&self, position: f64, velocity: f64, voltage: f64, dt: Duration) -> (f64, f64) {
        let t = dt.as_secs_f64();
        let c = self.b * voltage - GRAVITY;

        if self.a.abs() < 1e-12 {
            // 无反电动势阻尼：匀加速
            return (position + velocity * t + 0.5 * c * t * t, velocity + c * t);
        }

        let v_ss = -c / self.a;
        let decay = (self.a * t).exp();
        let v = v_ss + (velocity - v_ss) * decay;
        let x = position + v_ss * t + (velocity - v_ss) * (decay - 1.0) / self.a;
        (x, v)
    }

    /// 给定滑架速度与电压下的电机电流（A，绝对值）
    pub fn current_draw(&self, velocity: f64, voltage: f64) -> f64 {
        let motor_speed = velocity / self.drum_radius * self.gearing;
        self.motor.current(motor_speed, voltage).abs()
    }
}

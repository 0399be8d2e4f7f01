//! PID Controller - 比例-积分-微分控制器
//!
//! # 算法
//!
//! ```text
//! output = Kp * e + Ki * ∫e dt + Kd * de/dt
//! e      = setpoint - measured
//! ```
//!
//! # 特性
//!
//! - **积分饱和保护**: 积分累积值限制在 `±integral_limit`
//! - **首个采样无微分冲击**: 没有上一次误差时微分项为 0
//! - **时间跳变处理**: 只重置微分项，保留积分项
//! - **测量值校验**: NaN / 无穷测量返回 [`ControlError::NonFiniteMeasurement`]
//!
//! # 示例
//!
//! ```rust
//! use elevator_control::{Controller, PidController};
//! use elevator_core::Meters;
//! use std::time::Duration;
//!
//! let mut pid = PidController::new(Meters(1.0))
//!     .with_gains(3.0, 0.0, 0.0)
//!     .with_output_limit(12.0);
//!
//! let output = pid.tick(Meters(0.5), Duration::from_millis(20)).unwrap();
//! assert!((output.0 - 1.5).abs() < 1e-12);
//! ```

use crate::ControlError;
use crate::controller::Controller;
use elevator_core::{Gains, Meters, Volts};
use std::time::Duration;

/// PID 控制器
#[derive(Debug, Clone)]
pub struct PidController {
    /// 设定点
    target: Meters,

    kp: f64,
    ki: f64,
    kd: f64,

    /// 积分项累积值（m·s）
    integral: f64,

    /// 上一次的误差（用于计算微分）
    last_error: Option<f64>,

    /// 积分项限制
    integral_limit: f64,

    /// 输出电压限制
    output_limit: f64,
}

impl PidController {
    /// 创建新的 PID 控制器
    ///
    /// 默认增益全为 0，积分限制 10.0，输出不限幅。
    pub fn new(target: Meters) -> Self {
        PidController {
            target,
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            integral: 0.0,
            last_error: None,
            integral_limit: 10.0,
            output_limit: f64::INFINITY,
        }
    }

    /// 按配置中的反馈增益构造
    pub fn from_gains(target: Meters, gains: &Gains) -> Self {
        Self::new(target).with_gains(gains.kp, gains.ki, gains.kd)
    }

    /// 设置 PID 增益
    pub fn with_gains(mut self, kp: f64, ki: f64, kd: f64) -> Self {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self
    }

    /// 设置积分项限制
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = limit;
        self
    }

    /// 设置输出电压限制（V）
    pub fn with_output_limit(mut self, limit: f64) -> Self {
        self.output_limit = limit;
        self
    }

    pub fn set_target(&mut self, target: Meters) {
        self.target = target;
    }

    pub fn target(&self) -> Meters {
        self.target
    }

    /// 当前积分项（调试/监控）
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// 上一次的误差
    pub fn last_error(&self) -> Option<f64> {
        self.last_error
    }

    /// 清除积分与微分状态
    pub fn clear(&mut self) {
        self.integral = 0.0;
        self.last_error = None;
    }

    /// 更新设定点并计算一步输出
    pub fn calculate(
        &mut self,
        measured: Meters,
        setpoint: Meters,
        dt: Duration,
    ) -> Result<Volts, ControlError> {
        self.target = setpoint;
        self.tick(measured, dt)
    }
}

impl Controller for PidController {
    type Error = ControlError;

    fn tick(&mut self, measured: Meters, dt: Duration) -> Result<Volts, Self::Error> {
        if !measured.is_finite() {
            return Err(ControlError::NonFiniteMeasurement(measured.0));
        }

        let dt_sec = dt.as_secs_f64();

        // 防止除零
        if dt_sec <= 0.0 {
            tracing::warn!(
                "PID controller received zero dt: {:?}, returning zero output",
                dt
            );
            return Ok(Volts::ZERO);
        }

        // 1. 误差
        let error = (self.target - measured).0;

        // 2. 比例项
        let p_term = self.kp * error;

        // 3. 积分项 + 饱和保护
        self.integral =
            (self.integral + error * dt_sec).clamp(-self.integral_limit, self.integral_limit);
        let i_term = self.ki * self.integral;

        // 4. 微分项
        let d_term = match self.last_error {
            Some(last) => self.kd * (error - last) / dt_sec,
            None => 0.0,
        };
        self.last_error = Some(error);

        // 5. 钳位输出
        let output = (p_term + i_term + d_term).clamp(-self.output_limit, self.output_limit);
        Ok(Volts(output))
    }

    fn on_time_jump(&mut self, dt: Duration) -> Result<(), Self::Error> {
        tracing::warn!(
            "PID controller detected time jump: {:?}, resetting derivative term only",
            dt
        );

        // 只重置微分项，积分项维持抗重力输出
        self.last_error = None;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: Duration = Duration::from_millis(100);

    #[test]
    fn test_pid_new() {
        let pid = PidController::new(Meters(1.0));

        assert_eq!(pid.kp, 0.0);
        assert_eq!(pid.ki, 0.0);
        assert_eq!(pid.kd, 0.0);
        assert_eq!(pid.integral_limit, 10.0);
        assert!(pid.output_limit.is_infinite());
        assert_eq!(pid.last_error(), None);
    }

    #[test]
    fn test_pid_from_gains() {
        let pid = PidController::from_gains(Meters(0.3), &Gains::default());
        assert_eq!(pid.kp, 3.0);
        assert_eq!(pid.ki, 0.0);
        assert_eq!(pid.kd, 0.0);
        assert_eq!(pid.target(), Meters(0.3));
    }

    #[test]
    fn test_pid_proportional_only() {
        let mut pid = PidController::new(Meters(1.0)).with_gains(10.0, 0.0, 0.0);

        let output = pid.tick(Meters(0.5), DT).unwrap();
        assert!((output.0 - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_pid_integral_accumulation() {
        let mut pid = PidController::new(Meters(1.0)).with_gains(0.0, 1.0, 0.0);

        // 误差 0.5，积分 0.05
        let output1 = pid.tick(Meters(0.5), DT).unwrap();
        assert!((output1.0 - 0.05).abs() < 1e-10);

        let output2 = pid.tick(Meters(0.5), DT).unwrap();
        assert!((output2.0 - 0.1).abs() < 1e-10);
    }

    #[test]
    fn test_pid_integral_saturation() {
        let mut pid = PidController::new(Meters(1.0))
            .with_gains(0.0, 1.0, 0.0)
            .with_integral_limit(0.5);

        for _ in 0..10 {
            pid.tick(Meters(0.0), Duration::from_secs(1)).unwrap();
        }

        assert!((pid.integral() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_pid_no_derivative_kick_on_first_sample() {
        let mut pid = PidController::new(Meters(1.0)).with_gains(0.0, 0.0, 1.0);

        // 第一次没有上一次误差
        let output1 = pid.tick(Meters(0.5), DT).unwrap();
        assert_eq!(output1, Volts(0.0));

        // 误差从 0.5 变为 0.3，变化率 -2.0
        let output2 = pid.tick(Meters(0.7), DT).unwrap();
        assert!((output2.0 + 2.0).abs() < 1e-10);

        // 误差不变
        let output3 = pid.tick(Meters(0.7), DT).unwrap();
        assert!(output3.0.abs() < 1e-10);
    }

    #[test]
    fn test_pid_output_clamping() {
        let mut pid = PidController::new(Meters(100.0))
            .with_gains(100.0, 0.0, 0.0)
            .with_output_limit(12.0);

        let output = pid.tick(Meters(0.0), DT).unwrap();
        assert_eq!(output, Volts(12.0));

        pid.set_target(Meters(-100.0));
        let output = pid.tick(Meters(0.0), DT).unwrap();
        assert_eq!(output, Volts(-12.0));
    }

    #[test]
    fn test_pid_on_time_jump_preserves_integral() {
        let mut pid = PidController::new(Meters(1.0)).with_gains(0.0, 1.0, 1.0);

        pid.tick(Meters(0.5), Duration::from_secs(1)).unwrap();
        let integral_before = pid.integral();
        assert!(integral_before > 0.0);

        pid.on_time_jump(Duration::from_secs(10)).unwrap();

        assert_eq!(pid.integral(), integral_before);
        assert_eq!(pid.last_error(), None);
    }

    #[test]
    fn test_pid_reset() {
        let mut pid = PidController::new(Meters(1.0)).with_gains(1.0, 1.0, 1.0);

        pid.tick(Meters(0.5), Duration::from_secs(1)).unwrap();
        assert!(pid.integral() != 0.0);
        assert!(pid.last_error().is_some());

        pid.reset().unwrap();

        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.last_error(), None);
    }

    #[test]
    fn test_pid_calculate_updates_target() {
        let mut pid = PidController::new(Meters(0.0)).with_gains(2.0, 0.0, 0.0);

        let output = pid.calculate(Meters(0.25), Meters(0.75), DT).unwrap();
        assert!((output.0 - 1.0).abs() < 1e-10);
        assert_eq!(pid.target(), Meters(0.75));
    }

    #[test]
    fn test_pid_zero_dt() {
        let mut pid = PidController::new(Meters(1.0)).with_gains(10.0, 1.0, 1.0);

        let output = pid.tick(Meters(0.5), Duration::ZERO).unwrap();
        assert_eq!(output, Volts(0.0));
    }

    #[test]
    fn test_pid_rejects_non_finite_measurement() {
        let mut pid = PidController::new(Meters(1.0)).with_gains(10.0, 1.0, 1.0);

        let err = pid.tick(Meters(f64::NAN), DT).unwrap_err();
        assert!(matches!(err, ControlError::NonFiniteMeasurement(v) if v.is_nan()));

        // 错误的采样不污染内部状态
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.last_error(), None);
    }
}

//! 升降机前馈
//!
//! ```text
//! V = kS * sign(v) + kG + kV * v + kA * a
//! ```
//!
//! `kG` 恒定抵消重力，`kS` 抵消静摩擦（速度为 0 时不施加），
//! `kV` 抵消反电动势，`kA` 提供加速所需的电压。

use elevator_core::{Gains, MetersPerSecond, MetersPerSecondSquared, Volts};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevatorFeedforward {
    /// 静摩擦（V）
    pub ks: f64,
    /// 重力（V）
    pub kg: f64,
    /// 速度增益（V·s/m）
    pub kv: f64,
    /// 加速度增益（V·s²/m）
    pub ka: f64,
}

impl ElevatorFeedforward {
    pub fn new(ks: f64, kg: f64, kv: f64, ka: f64) -> Self {
        Self { ks, kg, kv, ka }
    }

    pub fn from_gains(gains: &Gains) -> Self {
        Self::new(gains.ks, gains.kg, gains.kv, gains.ka)
    }

    /// 给定期望速度与加速度的前馈电压
    pub fn calculate(
        &self,
        velocity: MetersPerSecond,
        acceleration: MetersPerSecondSquared,
    ) -> Volts {
        Volts(
            self.ks * velocity.signum() + self.kg + self.kv * velocity.0 + self.ka * acceleration.0,
        )
    }

    /// 由相邻两个设定点速度求前馈
    ///
    /// 加速度取 `(next - current) / dt`，`dt` 为 0 时视为无加速度。
    pub fn calculate_with_velocities(
        &self,
        current: MetersPerSecond,
        next: MetersPerSecond,
        dt: Duration,
    ) -> Volts {
        let acceleration = if dt.is_zero() {
            MetersPerSecondSquared::ZERO
        } else {
            (next - current) / dt
        };
        self.calculate(next, acceleration)
    }

    /// 在 `max_voltage` 与给定加速度下可维持的最大上升速度
    pub fn max_achievable_velocity(
        &self,
        max_voltage: Volts,
        acceleration: MetersPerSecondSquared,
    ) -> MetersPerSecond {
        MetersPerSecond((max_voltage.0 - self.ks - self.kg - self.ka * acceleration.0) / self.kv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuned() -> ElevatorFeedforward {
        ElevatorFeedforward::from_gains(&Gains::default())
    }

    #[test]
    fn test_holds_against_gravity_at_rest() {
        let ff = tuned();
        let v = ff.calculate(MetersPerSecond::ZERO, MetersPerSecondSquared::ZERO);
        // 速度为 0 时不加 kS
        assert!((v.0 - 0.2645).abs() < 1e-12);
    }

    #[test]
    fn test_static_friction_follows_direction() {
        let ff = tuned();

        let up = ff.calculate(MetersPerSecond(1.0), MetersPerSecondSquared::ZERO);
        assert!((up.0 - (0.0755 + 0.2645 + 3.7)).abs() < 1e-12);

        let down = ff.calculate(MetersPerSecond(-1.0), MetersPerSecondSquared::ZERO);
        assert!((down.0 - (-0.0755 + 0.2645 - 3.7)).abs() < 1e-12);
    }

    #[test]
    fn test_with_velocities() {
        let ff = tuned();
        let dt = Duration::from_millis(20);

        // 加速度 0.056 / 0.02 = 2.8
        let v = ff.calculate_with_velocities(MetersPerSecond(0.0), MetersPerSecond(0.056), dt);
        let expected = 0.0755 + 0.2645 + 3.7 * 0.056 + 0.012 * 2.8;
        assert!((v.0 - expected).abs() < 1e-12);

        // dt = 0 不产生加速度项
        let v =
            ff.calculate_with_velocities(MetersPerSecond(0.0), MetersPerSecond(0.5), Duration::ZERO);
        let expected = 0.0755 + 0.2645 + 3.7 * 0.5;
        assert!((v.0 - expected).abs() < 1e-12);
    }

    #[test]
    fn test_max_achievable_velocity() {
        let ff = tuned();
        let v = ff.max_achievable_velocity(Volts(12.0), MetersPerSecondSquared::ZERO);
        assert!((v.0 - (12.0 - 0.0755 - 0.2645) / 3.7).abs() < 1e-12);
        // 标称约束 2 m/s 在 12 V 下可达
        assert!(v.0 > 2.0);
    }
}

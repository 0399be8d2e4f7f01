//! 手动输入整形
//!
//! 摇杆轴值 → 每节拍目标增量：
//!
//! ```text
//! 钳位 [-1, 1] → 死区 → × (v_max · 倍率 · 周期) → 斜率限制 (a_max · 周期 / 节拍)
//! ```
//!
//! 斜率限制作用在每节拍增量上，使手动驾驶的目标速度变化不超过 `a_max`。

use elevator_core::{ManualConfig, Meters, MetersPerSecond, MetersPerSecondSquared};
use std::time::Duration;

/// 死区
///
/// `|value| ≤ deadband` 输出 0，其余线性缩放到 `[-1, 1]`，在死区边缘连续。
/// NaN 视为 0。
pub fn apply_deadband(value: f64, deadband: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    let value = value.clamp(-1.0, 1.0);
    if value.abs() <= deadband {
        0.0
    } else {
        value.signum() * (value.abs() - deadband) / (1.0 - deadband)
    }
}

/// 斜率限制器
///
/// 输出每秒变化量不超过 `rate`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlewRateLimiter {
    rate: f64,
    previous: f64,
}

impl SlewRateLimiter {
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.abs(),
            previous: 0.0,
        }
    }

    pub fn calculate(&mut self, input: f64, dt: Duration) -> f64 {
        let max_step = self.rate * dt.as_secs_f64();
        self.previous += (input - self.previous).clamp(-max_step, max_step);
        self.previous
    }

    pub fn last_value(&self) -> f64 {
        self.previous
    }

    pub fn reset(&mut self, value: f64) {
        self.previous = value;
    }
}

/// 手动输入整形器
///
/// 包装任意轴值迭代器，每次 `next()` 产生一个节拍的目标增量；
/// 输入耗尽时结束。
#[derive(Debug, Clone)]
pub struct ManualInputShaper<I> {
    input: I,
    deadband: f64,
    /// 满杆时每节拍的增量（m）
    full_scale: f64,
    period: Duration,
    limiter: SlewRateLimiter,
}

impl<I> ManualInputShaper<I>
where
    I: Iterator<Item = f64>,
{
    pub fn new(
        input: I,
        manual: &ManualConfig,
        max_velocity: MetersPerSecond,
        max_accel: MetersPerSecondSquared,
        period: Duration,
    ) -> Self {
        let full_scale = (max_velocity * manual.speed_multiplier * period).0;
        // 增量本身是 m/节拍，其每秒变化上限为 a_max · 周期
        let rate = (max_accel * period).0;

        Self {
            input,
            deadband: manual.deadband,
            full_scale,
            period,
            limiter: SlewRateLimiter::new(rate),
        }
    }

    /// 满杆对应的目标速度
    pub fn full_scale_velocity(&self) -> MetersPerSecond {
        Meters(self.full_scale) / self.period
    }

    /// 整形一个轴值
    pub fn shape(&mut self, axis: f64) -> Meters {
        let command = apply_deadband(axis, self.deadband) * self.full_scale;
        Meters(self.limiter.calculate(command, self.period))
    }

    /// 取下一个轴值并叠加到当前目标上
    pub fn next_goal(&mut self, current_goal: Meters) -> Option<Meters> {
        self.next().map(|delta| current_goal + delta)
    }

    /// 清除斜率限制器状态
    pub fn reset(&mut self) {
        self.limiter.reset(0.0);
    }
}

impl<I> Iterator for ManualInputShaper<I>
where
    I: Iterator<Item = f64>,
{
    type Item = Meters;

    fn next(&mut self) -> Option<Meters> {
        let axis = self.input.next()?;
        Some(self.shape(axis))
    }
}

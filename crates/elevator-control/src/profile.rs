//! Trapezoid Profile - 梯形速度规划
//!
//! 从当前状态 `(x, v)` 规划到静止于目标 `g` 的最短时间轨迹，
//! 全程满足 `|v| ≤ v_max`、`|a| ≤ a_max`。
//!
//! # 算法
//!
//! 在翻转后的坐标系中（令 `d = |g - x| ≥ 0`，`s` 为朝向目标的速度分量）
//! 按三种情况生成至多 4 段恒加速度分段：
//!
//! ```text
//! s < 0               背离目标：+a 制动到静止，再做静止到静止的梯形
//! s²/(2a) > d         来不及停下：-a 制动到静止（越过目标），再折返
//! 其他                 加速到 v_p，匀速，减速到目标
//!
//! v_p = min(v_max, sqrt(a*d + s²/2))
//! ```
//!
//! 每个节拍都从上一次的设定点重新规划，因此目标可以随时改变，
//! 设定点的速度与加速度始终连续受限。

use crate::ControlError;
use elevator_core::{Limits, Meters, MetersPerSecond, MetersPerSecondSquared};
use std::time::Duration;

/// 判定"来得及停下"时的距离容差（m）
const STOP_EPSILON: f64 = 1e-9;

/// 运动约束
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    pub max_velocity: MetersPerSecond,
    pub max_acceleration: MetersPerSecondSquared,
}

impl Constraints {
    /// 两个约束都必须是有限正数
    pub fn new(
        max_velocity: MetersPerSecond,
        max_acceleration: MetersPerSecondSquared,
    ) -> Result<Self, ControlError> {
        if !(max_velocity.0 > 0.0 && max_velocity.is_finite()) {
            return Err(ControlError::InvalidConstraints(format!(
                "max velocity must be > 0, got {}",
                max_velocity
            )));
        }
        if !(max_acceleration.0 > 0.0 && max_acceleration.is_finite()) {
            return Err(ControlError::InvalidConstraints(format!(
                "max acceleration must be > 0, got {}",
                max_acceleration
            )));
        }
        Ok(Self {
            max_velocity,
            max_acceleration,
        })
    }

    pub fn from_limits(limits: &Limits) -> Result<Self, ControlError> {
        Self::new(limits.max_velocity, limits.max_accel)
    }
}

/// 规划状态（设定点）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct State {
    pub position: Meters,
    pub velocity: MetersPerSecond,
}

impl State {
    pub fn new(position: Meters, velocity: MetersPerSecond) -> Self {
        Self { position, velocity }
    }

    /// 静止于 `position`
    pub fn at_rest(position: Meters) -> Self {
        Self::new(position, MetersPerSecond::ZERO)
    }
}

/// 恒加速度分段
#[derive(Debug, Clone, Copy, Default)]
struct Segment {
    duration: f64,
    accel: f64,
}

/// 分段序列（制动 + 加速 + 匀速 + 减速）
#[derive(Debug, Clone, Copy, Default)]
struct Plan {
    segments: [Segment; 4],
    len: usize,
}

impl Plan {
    /// 零时长的分段直接丢弃
    fn push(&mut self, duration: f64, accel: f64) {
        if duration > 0.0 {
            self.segments[self.len] = Segment { duration, accel };
            self.len += 1;
        }
    }

    fn segments(&self) -> &[Segment] {
        &self.segments[..self.len]
    }

    fn total_time(&self) -> f64 {
        self.segments().iter().map(|s| s.duration).sum()
    }
}

/// 梯形速度规划器
///
/// 无内部状态，调用者保存上一次的设定点。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidProfile {
    constraints: Constraints,
}

impl TrapezoidProfile {
    pub fn new(constraints: Constraints) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> Constraints {
        self.constraints
    }

    /// 从 `current` 出发经过 `dt` 后的设定点
    ///
    /// 规划结束后精确返回 `(goal, 0)`。
    pub fn calculate(&self, dt: Duration, current: State, goal: Meters) -> State {
        let plan = self.plan(current, goal.0);

        let mut t = dt.as_secs_f64();
        let mut x = current.position.0;
        let mut v = self.clamp_velocity(current.velocity.0);

        for segment in plan.segments() {
            if t < segment.duration {
                return State::new(
                    Meters(x + v * t + 0.5 * segment.accel * t * t),
                    MetersPerSecond(v + segment.accel * t),
                );
            }
            x += v * segment.duration + 0.5 * segment.accel * segment.duration * segment.duration;
            v += segment.accel * segment.duration;
            t -= segment.duration;
        }

        State::at_rest(goal)
    }

    /// 从 `current` 到静止于 `goal` 所需的时间
    pub fn total_time(&self, current: State, goal: Meters) -> Duration {
        Duration::from_secs_f64(self.plan(current, goal.0).total_time())
    }

    fn clamp_velocity(&self, velocity: f64) -> f64 {
        let max = self.constraints.max_velocity.0;
        velocity.clamp(-max, max)
    }

    fn plan(&self, current: State, goal: f64) -> Plan {
        let accel = self.constraints.max_acceleration.0;
        let position = current.position.0;
        let velocity = self.clamp_velocity(current.velocity.0);
        let error = goal - position;

        let mut plan = Plan::default();
        if error == 0.0 && velocity == 0.0 {
            return plan;
        }

        let dir = if error != 0.0 { error.signum() } else { velocity.signum() };
        let distance = error * dir;
        let speed = velocity * dir;
        let stopping_distance = speed * speed / (2.0 * accel);

        if speed < 0.0 {
            // 背离目标
            plan.push(-speed / accel, dir * accel);
            self.push_approach(&mut plan, distance + stopping_distance, 0.0, dir);
        } else if stopping_distance > distance + STOP_EPSILON {
            // 越过目标后折返
            plan.push(speed / accel, -dir * accel);
            self.push_approach(&mut plan, stopping_distance - distance, 0.0, -dir);
        } else {
            self.push_approach(&mut plan, distance, speed, dir);
        }

        plan
    }

    /// 以朝向目标的初速度 `speed` 走完 `distance` 并停下
    fn push_approach(&self, plan: &mut Plan, distance: f64, speed: f64, dir: f64) {
        let accel = self.constraints.max_acceleration.0;
        let peak = (accel * distance + 0.5 * speed * speed)
            .sqrt()
            .min(self.constraints.max_velocity.0)
            .max(speed);

        let accel_distance = (peak * peak - speed * speed) / (2.0 * accel);
        let decel_distance = peak * peak / (2.0 * accel);
        let cruise_distance = (distance - accel_distance - decel_distance).max(0.0);

        plan.push((peak - speed) / accel, dir * accel);
        if peak > 0.0 {
            plan.push(cruise_distance / peak, 0.0);
        }
        plan.push(peak / accel, -dir * accel);
    }
}

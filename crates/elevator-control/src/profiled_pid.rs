//! Profiled PID - 跟踪梯形规划设定点的 PID
//!
//! 每个节拍先把设定点沿 [`TrapezoidProfile`] 推进 `dt`，
//! 再对推进后的设定点位置做 PID 反馈。

use crate::ControlError;
use crate::controller::Controller;
use crate::pid::PidController;
use crate::profile::{Constraints, State, TrapezoidProfile};
use elevator_core::{Meters, MetersPerSecond, Volts};
use std::time::Duration;

/// 带运动规划的 PID 控制器
#[derive(Debug, Clone)]
pub struct ProfiledPidController {
    pid: PidController,
    profile: TrapezoidProfile,
    goal: Meters,
    setpoint: State,
    /// 设定点允许的位置范围
    position_range: Option<(Meters, Meters)>,
    position_tolerance: Meters,
    velocity_tolerance: MetersPerSecond,
}

impl ProfiledPidController {
    /// 设定点与目标初始为静止于 0
    pub fn new(pid: PidController, constraints: Constraints) -> Self {
        Self {
            pid,
            profile: TrapezoidProfile::new(constraints),
            goal: Meters::ZERO,
            setpoint: State::default(),
            position_range: None,
            position_tolerance: Meters(0.05),
            velocity_tolerance: MetersPerSecond(f64::INFINITY),
        }
    }

    /// 把设定点位置钳位在 `[min, max]`
    pub fn with_position_range(mut self, min: Meters, max: Meters) -> Self {
        self.position_range = Some((min, max));
        self
    }

    /// 到位判定容差
    pub fn with_tolerance(mut self, position: Meters, velocity: MetersPerSecond) -> Self {
        self.position_tolerance = position;
        self.velocity_tolerance = velocity;
        self
    }

    pub fn goal(&self) -> Meters {
        self.goal
    }

    pub fn set_goal(&mut self, goal: Meters) {
        self.goal = goal;
    }

    /// 当前设定点
    pub fn setpoint(&self) -> State {
        self.setpoint
    }

    pub fn constraints(&self) -> Constraints {
        self.profile.constraints()
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    /// 把设定点重新锚定到 `measured`，并清除 PID 状态
    ///
    /// 速度钳位到 `±max_velocity`；有位置范围时，朝边界的速度还要钳位到
    /// `sqrt(2 · max_acceleration · 到边界距离)`，保证以最大加速度能在边界前停下。
    pub fn reset_to(&mut self, measured: State) {
        let max = self.profile.constraints().max_velocity;
        let velocity = if measured.velocity.is_finite() {
            measured.velocity.clamp(-max, max)
        } else {
            MetersPerSecond::ZERO
        };
        let anchor = self.limit(State::new(measured.position, velocity));
        self.setpoint = State::new(anchor.position, self.stoppable_velocity(anchor));
        self.pid.clear();
    }

    /// 推进设定点并计算反馈输出
    pub fn calculate(
        &mut self,
        measured: Meters,
        goal: Meters,
        dt: Duration,
    ) -> Result<Volts, ControlError> {
        if !measured.is_finite() {
            return Err(ControlError::NonFiniteMeasurement(measured.0));
        }

        self.goal = goal;
        self.setpoint = self.limit(self.profile.calculate(dt, self.setpoint, goal));
        self.pid.calculate(measured, self.setpoint.position, dt)
    }

    /// 测量状态是否已到达目标
    pub fn at_goal(&self, measured: State) -> bool {
        (measured.position - self.goal).abs() <= self.position_tolerance
            && measured.velocity.abs() <= self.velocity_tolerance
    }

    fn limit(&self, state: State) -> State {
        let Some((min, max)) = self.position_range else {
            return state;
        };

        let position = if state.position.0.is_nan() {
            min
        } else {
            state.position.clamp(min, max)
        };

        // 停在边界上时不允许速度继续指向边界外
        let velocity = if (position <= min && state.velocity.0 < 0.0)
            || (position >= max && state.velocity.0 > 0.0)
        {
            MetersPerSecond::ZERO
        } else {
            state.velocity
        };

        State::new(position, velocity)
    }

    fn stoppable_velocity(&self, state: State) -> MetersPerSecond {
        let Some((min, max)) = self.position_range else {
            return state.velocity;
        };

        let accel = self.profile.constraints().max_acceleration.0;
        let v = state.velocity.0;
        if v > 0.0 {
            let room = (max - state.position).0.max(0.0);
            MetersPerSecond(v.min((2.0 * accel * room).sqrt()))
        } else if v < 0.0 {
            let room = (state.position - min).0.max(0.0);
            MetersPerSecond(v.max(-(2.0 * accel * room).sqrt()))
        } else {
            state.velocity
        }
    }
}

impl Controller for ProfiledPidController {
    type Error = ControlError;

    fn tick(&mut self, measured: Meters, dt: Duration) -> Result<Volts, Self::Error> {
        self.calculate(measured, self.goal, dt)
    }

    fn on_time_jump(&mut self, dt: Duration) -> Result<(), Self::Error> {
        self.pid.on_time_jump(dt)
    }

    /// 在当前设定点位置静止并以其为目标
    fn reset(&mut self) -> Result<(), Self::Error> {
        self.setpoint = State::at_rest(self.setpoint.position);
        self.goal = self.setpoint.position;
        self.pid.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elevator_core::MetersPerSecondSquared;

    const DT: Duration = Duration::from_millis(20);

    fn controller() -> ProfiledPidController {
        let constraints =
            Constraints::new(MetersPerSecond(2.0), MetersPerSecondSquared(2.8)).unwrap();
        let pid = PidController::new(Meters::ZERO).with_gains(3.0, 0.0, 0.0);
        ProfiledPidController::new(pid, constraints)
            .with_position_range(Meters(0.0), Meters(1.455))
            .with_tolerance(Meters(0.035), MetersPerSecond(0.005))
    }

    #[test]
    fn test_setpoint_advances_along_profile() {
        let mut c = controller();
        c.reset_to(State::at_rest(Meters(0.0)));

        let output = c.calculate(Meters(0.0), Meters(1.408), DT).unwrap();

        // 第一个节拍：v = a * dt，x = a * dt² / 2
        let sp = c.setpoint();
        assert!((sp.velocity.0 - 0.056).abs() < 1e-12);
        assert!((sp.position.0 - 0.00056).abs() < 1e-12);
        assert!((output.0 - 3.0 * 0.00056).abs() < 1e-12);
        assert_eq!(c.goal(), Meters(1.408));
    }

    #[test]
    fn test_setpoint_reaches_goal() {
        let mut c = controller();
        c.reset_to(State::at_rest(Meters(0.3)));

        for _ in 0..200 {
            c.calculate(Meters(0.3), Meters(0.838), DT).unwrap();
        }

        assert_eq!(c.setpoint(), State::at_rest(Meters(0.838)));
    }

    #[test]
    fn test_reset_clamps_velocity_and_position() {
        let mut c = controller();

        c.reset_to(State::new(Meters(0.7), MetersPerSecond(9.0)));
        assert_eq!(c.setpoint().velocity, MetersPerSecond(2.0));

        c.reset_to(State::new(Meters(2.0), MetersPerSecond(1.0)));
        assert_eq!(c.setpoint(), State::at_rest(Meters(1.455)));

        c.reset_to(State::new(Meters(0.5), MetersPerSecond(f64::NAN)));
        assert_eq!(c.setpoint(), State::at_rest(Meters(0.5)));
    }

    /// 以 `start` 重新锚定后跟随 `goal`，返回每个节拍的设定点（含起点）
    fn setpoints_after_reset(start: State, goal: Meters, ticks: usize) -> Vec<State> {
        let mut c = controller();
        c.reset_to(start);

        let mut setpoints = vec![c.setpoint()];
        for _ in 0..ticks {
            c.calculate(Meters(0.0), goal, DT).unwrap();
            setpoints.push(c.setpoint());
        }
        setpoints
    }

    fn assert_within_constraints(setpoints: &[State]) {
        for (i, pair) in setpoints.windows(2).enumerate() {
            let accel = (pair[1].velocity - pair[0].velocity).abs().0 / DT.as_secs_f64();
            assert!(accel <= 2.8 + 1e-9, "tick {}: accel {}", i + 1, accel);
            assert!((0.0..=1.455).contains(&pair[1].position.0), "tick {}: {:?}", i + 1, pair[1]);
        }
    }

    #[test]
    fn test_reset_near_upper_limit_keeps_acceleration_bound() {
        let setpoints =
            setpoints_after_reset(State::new(Meters(1.30), MetersPerSecond(2.0)), Meters(1.408), 150);

        // 最多能在 0.155 m 内刹停
        let v0 = setpoints[0].velocity.0;
        assert!((v0 - (2.0 * 2.8 * 0.155_f64).sqrt()).abs() < 1e-9);
        assert_within_constraints(&setpoints);
        assert_eq!(setpoints.last().copied(), Some(State::at_rest(Meters(1.408))));
    }

    #[test]
    fn test_reset_near_lower_limit_keeps_acceleration_bound() {
        let setpoints =
            setpoints_after_reset(State::new(Meters(0.1), MetersPerSecond(-2.0)), Meters(0.3), 150);

        assert!(setpoints[0].velocity.0 < 0.0);
        assert_within_constraints(&setpoints);
        assert_eq!(setpoints.last().copied(), Some(State::at_rest(Meters(0.3))));
    }

    #[test]
    fn test_reset_away_from_limit_keeps_velocity() {
        let mut c = controller();
        c.reset_to(State::new(Meters(1.30), MetersPerSecond(-2.0)));
        assert_eq!(c.setpoint().velocity, MetersPerSecond(-2.0));

        c.reset_to(State::new(Meters(1.455), MetersPerSecond(0.5)));
        assert_eq!(c.setpoint(), State::at_rest(Meters(1.455)));
    }

    #[test]
    fn test_controller_reset_stops_at_setpoint() {
        let mut c = controller();
        c.reset_to(State::at_rest(Meters(0.2)));
        for _ in 0..10 {
            c.calculate(Meters(0.2), Meters(1.0), DT).unwrap();
        }
        let position = c.setpoint().position;
        assert!(c.setpoint().velocity.0 > 0.0);

        c.reset().unwrap();
        assert_eq!(c.setpoint(), State::at_rest(position));
        assert_eq!(c.goal(), position);

        // 目标即设定点，之后设定点不再移动
        c.tick(position, DT).unwrap();
        assert_eq!(c.setpoint(), State::at_rest(position));
    }

    #[test]
    fn test_at_goal_tolerances() {
        let mut c = controller();
        c.set_goal(Meters(1.0));

        assert!(c.at_goal(State::new(Meters(1.03), MetersPerSecond(0.004))));
        assert!(!c.at_goal(State::new(Meters(1.04), MetersPerSecond(0.0))));
        assert!(!c.at_goal(State::new(Meters(1.0), MetersPerSecond(0.01))));
        assert!(!c.at_goal(State::new(Meters(1.0), MetersPerSecond(-0.01))));
    }

    #[test]
    fn test_non_finite_measurement_leaves_setpoint() {
        let mut c = controller();
        c.reset_to(State::at_rest(Meters(0.2)));

        let err = c.calculate(Meters(f64::INFINITY), Meters(1.0), DT).unwrap_err();
        assert_eq!(err, ControlError::NonFiniteMeasurement(f64::INFINITY));
        assert_eq!(c.setpoint(), State::at_rest(Meters(0.2)));
    }

    #[test]
    fn test_controller_tick_uses_stored_goal() {
        let mut c = controller();
        c.reset_to(State::at_rest(Meters(0.0)));
        c.set_goal(Meters(0.5));

        c.tick(Meters(0.0), DT).unwrap();
        assert!(c.setpoint().velocity.0 > 0.0);
    }
}

//! 单写者活动调度
//!
//! 任一时刻至多一个活动驱动执行器。新活动取代旧活动、取消、
//! 输入耗尽或调度器被丢弃时，旧活动的收尾都会先下发且只下发一次 0 V，
//! 之后新活动才会发出第一条指令。没有活动时默认运行回零。

use crate::activity::{Activity, ActivityKind};
use crate::elevator::Elevator;
use crate::error::ElevatorError;
use crate::telemetry::ElevatorTelemetry;
use elevator_core::{ElevatorConfig, Level, Meters, Volts};
use elevator_hal::ActuatorIo;
use std::time::Duration;

/// 升降机控制循环
pub struct ElevatorLoop<A: ActuatorIo> {
    elevator: Elevator<A>,
    config: ElevatorConfig,
    active: Option<Activity>,
}

impl<A: ActuatorIo> ElevatorLoop<A> {
    pub fn new(actuator: A, config: ElevatorConfig) -> Result<Self, ElevatorError> {
        let elevator = Elevator::new(actuator, &config)?;
        Ok(Self {
            elevator,
            config,
            active: None,
        })
    }

    pub fn config(&self) -> &ElevatorConfig {
        &self.config
    }

    pub fn elevator(&self) -> &Elevator<A> {
        &self.elevator
    }

    pub fn elevator_mut(&mut self) -> &mut Elevator<A> {
        &mut self.elevator
    }

    /// 标称节拍周期
    pub fn period(&self) -> Duration {
        self.config.control_loop.period()
    }

    /// 当前活动
    pub fn active(&self) -> Option<ActivityKind> {
        self.active.as_ref().map(Activity::kind)
    }

    /// 启动活动，取代当前活动
    pub fn schedule(&mut self, activity: Activity) {
        self.finish_active("superseded");
        tracing::debug!("Elevator activity started: {}", activity);
        self.elevator.reset_profile();
        self.active = Some(activity);
    }

    pub fn go_to_level(&mut self, level: Level) {
        self.schedule(Activity::go_to_level(level));
    }

    /// 前往任意高度（越界值在每个节拍被钳位）
    pub fn go_to(&mut self, height: Meters) {
        self.schedule(Activity::go_to(height));
    }

    pub fn retract(&mut self) {
        self.schedule(Activity::retract());
    }

    pub fn drive_manual<I>(&mut self, input: I)
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: Send + 'static,
    {
        let activity = Activity::manual(input, &self.config);
        self.schedule(activity);
    }

    /// 取消当前活动（下发一次 0 V）
    pub fn cancel(&mut self) {
        self.finish_active("cancelled");
    }

    /// 运行一个节拍
    ///
    /// 没有活动时先启动默认的回零活动。手动输入耗尽时本节拍执行收尾并返回 0 V。
    pub fn tick(&mut self, dt: Duration) -> Result<Volts, ElevatorError> {
        if self.active.is_none() {
            self.schedule(Activity::retract());
        }

        let current_goal = self.elevator.goal();
        let limits = *self.elevator.limits();
        let next_goal = self
            .active
            .as_mut()
            .and_then(|activity| activity.next_goal(current_goal, &limits));

        match next_goal {
            Some(goal) => self.elevator.update(goal, dt),
            None => {
                self.finish_active("input exhausted");
                Ok(Volts::ZERO)
            },
        }
    }

    pub fn at_goal(&self) -> bool {
        self.elevator.at_goal()
    }

    pub fn reset_position(&mut self) -> Result<(), ElevatorError> {
        self.elevator.reset_position()
    }

    pub fn on_time_jump(&mut self, dt: Duration) -> Result<(), ElevatorError> {
        self.elevator.on_time_jump(dt)
    }

    pub fn telemetry(&self) -> ElevatorTelemetry {
        ElevatorTelemetry {
            activity: self.active(),
            ..self.elevator.telemetry()
        }
    }

    /// 结束当前活动并下发 0 V
    fn finish_active(&mut self, reason: &str) {
        if let Some(activity) = self.active.take() {
            tracing::debug!("Elevator activity {}: {}", reason, activity);
            self.elevator.release();
        }
    }
}

impl<A: ActuatorIo> Drop for ElevatorLoop<A> {
    fn drop(&mut self) {
        if self.active.is_some() {
            self.finish_active("dropped");
        } else {
            self.elevator.release();
        }
    }
}

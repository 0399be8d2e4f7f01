//! 遥测快照
//!
//! 只读、按需拉取，没有副作用。

use crate::activity::ActivityKind;
use elevator_core::{Meters, MetersPerSecond, Volts};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElevatorTelemetry {
    /// 当前活动（无活动时为 `None`）
    pub activity: Option<ActivityKind>,
    pub position: Meters,
    pub velocity: MetersPerSecond,
    pub goal: Meters,
    pub setpoint_position: Meters,
    pub setpoint_velocity: MetersPerSecond,
    /// 最近一次下发的电压
    pub voltage: Volts,
    pub at_goal: bool,
}

impl fmt::Display for ElevatorTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let activity = match &self.activity {
            Some(kind) => kind.to_string(),
            None => "idle".to_string(),
        };
        write!(
            f,
            "[{}] pos {} vel {} goal {} sp {} / {} out {}{}",
            activity,
            self.position,
            self.velocity,
            self.goal,
            self.setpoint_position,
            self.setpoint_velocity,
            self.voltage,
            if self.at_goal { " (at goal)" } else { "" }
        )
    }
}

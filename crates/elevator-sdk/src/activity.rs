//! 驱动活动
//!
//! 每个活动在每个节拍给出一个目标伸出量；由 [`crate::ElevatorLoop`]
//! 负责调度、取代与结束时的零输出收尾。

use elevator_control::ManualInputShaper;
use elevator_core::{ElevatorConfig, Level, Limits, Meters};
use serde::Serialize;
use std::fmt;

/// 手动轴值输入源
pub type AxisInput = Box<dyn Iterator<Item = f64> + Send>;

/// 活动种类（用于遥测与日志）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityKind {
    /// 前往固定高度
    GoTo { goal: Meters, level: Option<Level> },
    /// 回零（默认活动）
    Retract,
    /// 手动驾驶
    Manual,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::GoTo { level: Some(level), .. } => write!(f, "goto {}", level),
            ActivityKind::GoTo { goal, level: None } => write!(f, "goto {}", goal),
            ActivityKind::Retract => f.write_str("retract"),
            ActivityKind::Manual => f.write_str("manual"),
        }
    }
}

/// 一个可被取代的驱动活动
pub enum Activity {
    GoTo { goal: Meters, level: Option<Level> },
    Retract,
    Manual(Box<ManualInputShaper<AxisInput>>),
}

impl Activity {
    pub fn go_to_level(level: Level) -> Self {
        Activity::GoTo {
            goal: level.extension(),
            level: Some(level),
        }
    }

    pub fn go_to(goal: Meters) -> Self {
        Activity::GoTo { goal, level: None }
    }

    pub fn retract() -> Self {
        Activity::Retract
    }

    /// 手动驾驶，`input` 每个节拍消耗一个轴值，耗尽时活动结束
    pub fn manual<I>(input: I, config: &ElevatorConfig) -> Self
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: Send + 'static,
    {
        let input: AxisInput = Box::new(input.into_iter());
        Activity::Manual(Box::new(ManualInputShaper::new(
            input,
            &config.manual,
            config.limits.max_velocity,
            config.limits.max_accel,
            config.control_loop.period(),
        )))
    }

    pub fn kind(&self) -> ActivityKind {
        match self {
            Activity::GoTo { goal, level } => ActivityKind::GoTo {
                goal: *goal,
                level: *level,
            },
            Activity::Retract => ActivityKind::Retract,
            Activity::Manual(_) => ActivityKind::Manual,
        }
    }

    /// 本节拍的目标；`None` 表示活动已自然结束
    ///
    /// 手动驾驶的目标在叠加增量后钳位到行程内，不会在限位处累积。
    pub fn next_goal(&mut self, current_goal: Meters, limits: &Limits) -> Option<Meters> {
        match self {
            Activity::GoTo { goal, .. } => Some(*goal),
            Activity::Retract => Some(limits.min_extension),
            Activity::Manual(shaper) => shaper
                .next_goal(current_goal)
                .map(|goal| limits.clamp_goal(goal)),
        }
    }
}

impl fmt::Debug for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Activity({})", self.kind())
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_goals() {
        let limits = Limits::default();

        let mut l4 = Activity::go_to_level(Level::L4);
        assert_eq!(l4.next_goal(Meters(0.0), &limits), Some(Meters(1.408)));

        let mut home = Activity::retract();
        assert_eq!(home.next_goal(Meters(1.0), &limits), Some(Meters(0.0)));
    }

    #[test]
    fn test_manual_goal_is_clamped_and_ends() {
        let config = ElevatorConfig::default();
        let limits = config.limits;
        let mut manual = Activity::manual(vec![1.0; 3], &config);

        let goal = manual.next_goal(Meters(1.455), &limits).unwrap();
        assert_eq!(goal, Meters(1.455));

        let goal = manual.next_goal(Meters(0.5), &limits).unwrap();
        assert!(goal > Meters(0.5));

        manual.next_goal(goal, &limits).unwrap();
        assert_eq!(manual.next_goal(goal, &limits), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Activity::go_to_level(Level::L2Algae).to_string(), "goto L2_ALGAE");
        assert_eq!(Activity::go_to(Meters(0.5)).to_string(), "goto 0.5000 m");
        assert_eq!(Activity::retract().to_string(), "retract");
        let manual = Activity::manual(vec![], &ElevatorConfig::default());
        assert_eq!(format!("{:?}", manual), "Activity(manual)");
    }

    #[test]
    fn test_kind_serializes_with_tag() {
        let json = serde_json::to_string(&Activity::go_to_level(Level::L3).kind()).unwrap();
        assert_eq!(json, r#"{"kind":"go_to","goal":0.838,"level":"L3"}"#);
    }
}

//! # Elevator SDK
//!
//! 单自由度升降机的闭环位置控制。
//!
//! ## 分层
//!
//! ```text
//! elevator-sdk      ← 子系统 / 活动调度 / 控制循环（本 crate）
//! elevator-control  ← 梯形规划 + PID + 前馈 + 手动输入整形
//! elevator-hal      ← 执行器接口：真实硬件 / 仿真 / 空桩
//! elevator-core     ← 单位、常量、得分高度、配置
//! ```
//!
//! ## 快速开始
//!
//! ```rust
//! use elevator_core::{ElevatorConfig, Level};
//! use elevator_hal::{Environment, create_actuator};
//! use elevator_sdk::ElevatorLoop;
//!
//! let config = ElevatorConfig::default();
//! let actuator = create_actuator(Environment::Simulation, &config, None).unwrap();
//! let mut elevator = ElevatorLoop::new(actuator, config.clone()).unwrap();
//!
//! elevator.go_to_level(Level::L2);
//! for _ in 0..250 {
//!     elevator.tick(config.control_loop.period()).unwrap();
//! }
//! assert!(elevator.at_goal());
//! ```

pub mod activity;
pub mod elevator;
pub mod error;
pub mod logging;
pub mod loop_runner;
pub mod scheduler;
pub mod telemetry;

pub use activity::{Activity, ActivityKind, AxisInput};
pub use elevator::Elevator;
pub use error::ElevatorError;
pub use logging::init_logger;
pub use loop_runner::{LoopConfig, LoopStats, Pacing, run_loop};
pub use scheduler::ElevatorLoop;
pub use telemetry::ElevatorTelemetry;

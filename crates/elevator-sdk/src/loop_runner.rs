//! Loop Runner - 控制循环驱动
//!
//! 以固定周期调用 [`ElevatorLoop::tick`]，处理定时、dt 钳位与时间跳变。
//!
//! # 核心功能
//!
//! - **三种节奏**: 不限速（仿真快进）、`thread::sleep`、`spin_sleep` 低抖动
//! - **dt 钳位**: 实际间隔超过 `period × dt_clamp_multiplier` 时先调用
//!   `on_time_jump()`，再以钳位后的 dt 运行节拍
//! - **故障容忍**: 可恢复的节拍故障只记录并计数，下一节拍重试；
//!   不可恢复的故障（设备丢失等）立即结束循环
//!
//! ```rust,no_run
//! use elevator_core::{ElevatorConfig, Level};
//! use elevator_hal::SimElevator;
//! use elevator_sdk::{ElevatorLoop, LoopConfig, Pacing, run_loop};
//! use std::sync::atomic::AtomicBool;
//!
//! let config = ElevatorConfig::default();
//! let mut elevator = ElevatorLoop::new(SimElevator::new(&config), config.clone()).unwrap();
//! elevator.go_to_level(Level::L4);
//!
//! let loop_config = LoopConfig {
//!     max_iterations: Some(250),
//!     pacing: Pacing::Unpaced,
//!     ..LoopConfig::from_settings(&config.control_loop)
//! };
//! let stop = AtomicBool::new(false);
//! let stats = run_loop(&mut elevator, &loop_config, &stop, |_, _| {}).unwrap();
//! assert_eq!(stats.iterations, 250);
//! ```

use crate::error::ElevatorError;
use crate::scheduler::ElevatorLoop;
use elevator_core::LoopSettings;
use elevator_hal::ActuatorIo;
use spin_sleep::SpinSleeper;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// 节拍之间的等待方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// 不等待，dt 固定为标称周期（仿真快进、测试）
    Unpaced,
    /// `std::thread::sleep`
    Sleep,
    /// `spin_sleep`，抖动更低但占用更多 CPU
    Spin,
}

/// 控制循环配置
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// 标称周期
    pub period: Duration,

    /// dt 钳位倍数
    ///
    /// 例如：2.0 表示 dt 最大为 2 × period
    pub dt_clamp_multiplier: f64,

    /// 最大迭代次数（None 表示运行到 stop 标志被置位）
    pub max_iterations: Option<usize>,

    pub pacing: Pacing,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            period: Duration::from_millis(20),
            dt_clamp_multiplier: 2.0,
            max_iterations: None,
            pacing: Pacing::Sleep,
        }
    }
}

impl LoopConfig {
    pub fn from_settings(settings: &LoopSettings) -> Self {
        LoopConfig {
            period: settings.period(),
            dt_clamp_multiplier: settings.dt_clamp_multiplier,
            ..LoopConfig::default()
        }
    }

    fn validate(&self) -> Result<(), ElevatorError> {
        if self.period.is_zero() {
            return Err(ElevatorError::InvalidParameter(
                "loop period must be > 0".to_string(),
            ));
        }
        if !(self.dt_clamp_multiplier > 0.0 && self.dt_clamp_multiplier.is_finite()) {
            return Err(ElevatorError::InvalidParameter(format!(
                "dt_clamp_multiplier must be > 0, got {}",
                self.dt_clamp_multiplier
            )));
        }
        Ok(())
    }
}

/// 运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// 完成的节拍数
    pub iterations: usize,
    /// 失败的节拍数
    pub faults: usize,
    /// 检测到的时间跳变次数
    pub time_jumps: usize,
}

/// 运行控制循环，直到达到 `max_iterations` 或 `stop` 被置位
///
/// 每个节拍结束后调用 `on_tick(iteration, &elevator)`。
/// 配置无效或节拍出现不可恢复故障（[`ElevatorError::is_fatal`]）时返回错误；
/// 其余节拍故障已由调度器下发 0 V，这里只计数。返回时不会取消当前活动。
pub fn run_loop<A, F>(
    elevator: &mut ElevatorLoop<A>,
    config: &LoopConfig,
    stop: &AtomicBool,
    mut on_tick: F,
) -> Result<LoopStats, ElevatorError>
where
    A: ActuatorIo,
    F: FnMut(usize, &ElevatorLoop<A>),
{
    config.validate()?;

    let period = config.period;
    let max_dt = period.mul_f64(config.dt_clamp_multiplier);
    let sleeper = SpinSleeper::default();

    let mut stats = LoopStats::default();
    let mut last_time: Option<Instant> = None;

    loop {
        if let Some(max_iter) = config.max_iterations
            && stats.iterations >= max_iter
        {
            break;
        }
        if stop.load(Ordering::Relaxed) {
            tracing::info!("Elevator loop stop requested after {} ticks", stats.iterations);
            break;
        }

        let started = Instant::now();

        // 1. 计算 dt（首个节拍与不限速模式使用标称周期）
        let dt = match (config.pacing, last_time) {
            (Pacing::Unpaced, _) | (_, None) => period,
            (_, Some(last)) => {
                let real_dt = started - last;
                if real_dt > max_dt {
                    stats.time_jumps += 1;
                    elevator.on_time_jump(real_dt)?;
                    max_dt
                } else {
                    real_dt
                }
            },
        };
        last_time = Some(started);

        // 2. 运行节拍
        if let Err(e) = elevator.tick(dt) {
            stats.faults += 1;
            if e.is_fatal() {
                tracing::error!(
                    "Elevator tick {} failed fatally, stopping loop: {}",
                    stats.iterations,
                    e
                );
                return Err(e);
            }
            tracing::warn!("Elevator tick {} failed: {}", stats.iterations, e);
        }

        on_tick(stats.iterations, elevator);
        stats.iterations += 1;

        // 3. 等待到下一个周期
        let remaining = period.saturating_sub(started.elapsed());
        match config.pacing {
            Pacing::Unpaced => {},
            Pacing::Sleep => std::thread::sleep(remaining),
            Pacing::Spin => sleeper.sleep(remaining),
        }
    }

    Ok(stats)
}

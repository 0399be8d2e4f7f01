//! 仿真命令
//!
//! 在仿真或空桩后端上运行控制循环，按固定间隔打印遥测。
//! Ctrl-C 会让循环在当前节拍结束后退出，之后执行器被置零。

use super::load_config;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use elevator_core::{ElevatorConfig, Level, Meters, MetersPerSecond};
use elevator_hal::{Actuator, Environment, create_actuator};
use elevator_sdk::{ElevatorLoop, LoopConfig, LoopStats, Pacing, run_loop};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 运行参数（所有仿真子命令共享）
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// 配置文件（缺省为内置默认值）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 后端：sim 或 none
    #[arg(short, long, default_value = "sim")]
    pub backend: String,

    /// 运行时长（秒）
    #[arg(short, long, default_value_t = 5.0)]
    pub seconds: f64,

    /// 按真实时间节奏运行（默认快进）
    #[arg(long)]
    pub realtime: bool,

    /// 以 JSON 行输出遥测
    #[arg(long)]
    pub json: bool,

    /// 每隔多少个节拍打印一次遥测
    #[arg(long, default_value_t = 10)]
    pub print_every: usize,

    /// 初始高度（米，仅仿真后端）
    #[arg(long)]
    pub from: Option<f64>,
}

/// 仿真命令
#[derive(Subcommand, Debug)]
pub enum SimCommand {
    /// 移动到档位（L1..L4, L2_ALGAE, L3_ALGAE）或任意高度（米）
    Goto {
        /// 目标档位或高度
        target: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// 回到最低点
    Retract {
        #[command(flatten)]
        run: RunArgs,
    },

    /// 以恒定摇杆输入手动驾驶，结束后松杆
    Manual {
        /// 摇杆轴值（-1..1）
        #[arg(short, long, allow_hyphen_values = true)]
        axis: f64,

        /// 推杆持续时长（秒）；之后输入耗尽，执行器置零
        #[arg(long, default_value_t = 1.0)]
        hold: f64,

        #[command(flatten)]
        run: RunArgs,
    },
}

/// 目标：档位或任意高度
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Level(Level),
    Height(Meters),
}

impl FromStr for Target {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(level) = s.parse::<Level>() {
            return Ok(Target::Level(level));
        }

        let height: f64 = s
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("'{}' is neither a level nor a height in meters", s))?;
        if !height.is_finite() {
            anyhow::bail!("Height must be finite, got {}", height);
        }
        Ok(Target::Height(Meters(height)))
    }
}

impl SimCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            SimCommand::Goto { target, run } => {
                let target: Target = target.parse()?;
                run_activity(&run, |elevator| match target {
                    Target::Level(level) => elevator.go_to_level(level),
                    Target::Height(height) => elevator.go_to(height),
                })
            },

            SimCommand::Retract { run } => run_activity(&run, |elevator| elevator.retract()),

            SimCommand::Manual { axis, hold, run } => {
                if !axis.is_finite() {
                    anyhow::bail!("Axis value must be finite, got {}", axis);
                }
                let ticks = ticks_for(hold, &load_config(run.config.as_deref())?)?;
                run_activity(&run, move |elevator| {
                    elevator.drive_manual(std::iter::repeat_n(axis, ticks));
                })
            },
        }
    }
}

/// 时长换算为节拍数
fn ticks_for(seconds: f64, config: &ElevatorConfig) -> Result<usize> {
    if !(seconds >= 0.0 && seconds.is_finite()) {
        anyhow::bail!("Duration must be >= 0 seconds, got {}", seconds);
    }
    let period = config.control_loop.period().as_secs_f64();
    Ok((seconds / period).round() as usize)
}

/// 构造后端、调度活动、运行循环并打印结果
fn run_activity<F>(args: &RunArgs, start: F) -> Result<()>
where
    F: FnOnce(&mut ElevatorLoop<Actuator>),
{
    let config = load_config(args.config.as_deref())?;
    let environment: Environment = args
        .backend
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    if environment == Environment::Real {
        anyhow::bail!("The CLI has no motor drivers; use --backend sim or --backend none");
    }

    let mut actuator = create_actuator(environment, &config, None)?;
    if let Some(from) = args.from {
        let sim = actuator
            .as_sim_mut()
            .context("--from is only supported by the sim backend")?;
        sim.set_state(Meters(from), MetersPerSecond(0.0));
    }

    let loop_config = LoopConfig {
        max_iterations: Some(ticks_for(args.seconds, &config)?),
        pacing: if args.realtime {
            Pacing::Spin
        } else {
            Pacing::Unpaced
        },
        ..LoopConfig::from_settings(&config.control_loop)
    };

    let mut elevator = ElevatorLoop::new(actuator, config)?;
    start(&mut elevator);
    tracing::info!(
        "Running {} ticks on {} backend",
        loop_config.max_iterations.unwrap_or(0),
        environment
    );

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        handler_stop.store(true, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl-C handler")?;

    let print_every = args.print_every.max(1);
    let json = args.json;
    let stats = run_loop(&mut elevator, &loop_config, &stop, |i, elevator| {
        if i % print_every == 0 {
            print_telemetry(elevator, json);
        }
    })?;

    // 返回时 elevator 析构，执行器随之置零
    print_summary(&elevator, &stats, json)
}

fn print_telemetry(elevator: &ElevatorLoop<Actuator>, json: bool) {
    let telemetry = elevator.telemetry();
    if json {
        match serde_json::to_string(&telemetry) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("Failed to serialize telemetry: {}", e),
        }
    } else {
        println!("{}", telemetry);
    }
}

fn print_summary(elevator: &ElevatorLoop<Actuator>, stats: &LoopStats, json: bool) -> Result<()> {
    let at_goal = elevator.at_goal();

    if json {
        let summary = serde_json::json!({
            "iterations": stats.iterations,
            "faults": stats.faults,
            "time_jumps": stats.time_jumps,
            "at_goal": at_goal,
            "final": elevator.telemetry(),
        });
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    println!();
    println!("节拍: {}，故障: {}，时间跳变: {}", stats.iterations, stats.faults, stats.time_jumps);
    println!("最终: {}", elevator.telemetry());
    if let Some(sim) = elevator.elevator().actuator().as_sim() {
        println!("电流: {:.1} A", sim.current_draw());
    }
    if at_goal {
        println!("✅ 已到达目标");
    } else {
        println!("⚠️ 未到达目标");
    }
    Ok(())
}
